use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::str::FromStr;

use itertools::Itertools;

use crate::{CpuIndex, Error, MAX_CPU_INDEX_EXCLUSIVE, Mode};

/// Backing storage grows in multiples of this many bytes, matching the granularity the kernel
/// uses for dynamically sized affinity masks.
pub(crate) const ALLOCATION_GRANULARITY: usize = size_of::<usize>();

const BITS_PER_BYTE: usize = 8;

const ALLOCATION_GRANULARITY_BITS: usize = ALLOCATION_GRANULARITY * BITS_PER_BYTE;

/// How much a [`CpuSet`] says about the CPUs it was built from.
///
/// Configuration layers need to tell "nothing was configured" apart from "something was
/// configured but it selected no CPUs", so this is tracked separately from membership.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum SetState {
    /// The set owns no storage. Nothing was ever added to it, or it was reset.
    Unset,

    /// The set owns storage but no CPU is a member, e.g. because the only configured range
    /// was inverted and therefore ignored.
    ExplicitlyEmpty,

    /// At least one CPU is a member of the set.
    Populated,
}

/// A growable set of CPU indices in the range `0..8192`.
///
/// The set starts out owning no storage and grows its byte buffer on demand as indices are
/// added. Storage is never shrunk except by [`reset()`][Self::reset], which releases it.
///
/// ```
/// use cpuset::CpuSet;
///
/// let mut set = CpuSet::new();
/// set.add(5).unwrap();
/// set.add(2).unwrap();
///
/// assert_eq!(set.to_string(), "2 5");
/// assert!(set.contains(5));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CpuSet {
    // Every byte past the end is logically zero.
    bytes: Vec<u8>,
}

impl CpuSet {
    /// Creates an empty set that owns no storage.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Creates a set containing the given indices.
    ///
    /// # Errors
    ///
    /// Fails if any index is out of range or if storage cannot be allocated.
    pub fn from_indices(indices: impl IntoIterator<Item = CpuIndex>) -> crate::Result<Self> {
        let mut set = Self::new();

        for index in indices {
            set.add(index)?;
        }

        Ok(set)
    }

    /// Adds a CPU index to the set, growing the backing storage if the index is not yet
    /// representable. Adding an index that is already present has no effect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index` is 8192 or higher and
    /// [`Error::Allocation`] if storage cannot be grown. The set is unchanged on error.
    pub fn add(&mut self, index: CpuIndex) -> crate::Result<()> {
        self.grow_to_hold(index)?;
        self.set_bit(index);

        Ok(())
    }

    /// Adds every member of `other` to this set.
    ///
    /// This is all-or-nothing: the only fallible step is growing our storage to fit the
    /// highest member of `other`, which happens before any bit is touched. If it fails, `self`
    /// is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if storage cannot be grown.
    pub fn add_all(&mut self, other: &Self) -> crate::Result<()> {
        let Some(highest) = other.last() else {
            return Ok(());
        };

        self.grow_to_hold(highest)?;

        // We now hold at least as many bytes as contain any member of `other`. Any bytes of
        // `other` beyond our length are zero and contribute nothing.
        for (ours, theirs) in self.bytes.iter_mut().zip(&other.bytes) {
            *ours |= *theirs;
        }

        Ok(())
    }

    /// Whether `index` is a member of the set.
    #[must_use]
    pub fn contains(&self, index: CpuIndex) -> bool {
        let (byte_index, mask) = locate(index);

        self.bytes
            .get(byte_index)
            .is_some_and(|byte| byte & mask != 0)
    }

    /// Iterates over the members of the set in ascending order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            bytes: &self.bytes,
            next: 0,
        }
    }

    /// The number of CPUs that are members of the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes
            .iter()
            .map(|byte| byte.count_ones() as usize)
            .sum()
    }

    /// Whether no CPU is a member of the set.
    ///
    /// This is true for both [`SetState::Unset`] and [`SetState::ExplicitlyEmpty`] sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.iter().all(|byte| *byte == 0)
    }

    /// Number of bytes of storage currently backing the set. Always a multiple of the
    /// allocation granularity (the native word size).
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the set is unset, explicitly empty or populated.
    #[must_use]
    pub fn state(&self) -> SetState {
        if self.bytes.is_empty() {
            SetState::Unset
        } else if self.is_empty() {
            SetState::ExplicitlyEmpty
        } else {
            SetState::Populated
        }
    }

    /// Releases all storage, returning the set to the [`SetState::Unset`] state.
    pub fn reset(&mut self) {
        self.bytes = Vec::new();
    }

    /// Renders the set with consecutive runs collapsed into ranges, e.g. `0-3 5`.
    ///
    /// The output is accepted by [`parse()`][crate::parse()] and yields the same members.
    #[must_use]
    pub fn to_range_string(&self) -> String {
        self.iter()
            .map(|index| (index, index))
            .coalesce(|(start, end), (next_start, next_end)| {
                if end.checked_add(1) == Some(next_start) {
                    Ok((start, next_end))
                } else {
                    Err(((start, end), (next_start, next_end)))
                }
            })
            .map(|(start, end)| {
                if start == end {
                    start.to_string()
                } else {
                    format!("{start}-{end}")
                }
            })
            .join(" ")
    }

    /// Allocates the minimum amount of storage without adding any member, moving an unset set
    /// into the [`SetState::ExplicitlyEmpty`] state.
    pub(crate) fn mark_explicit(&mut self) -> crate::Result<()> {
        self.grow_to_hold(0)
    }

    fn last(&self) -> Option<CpuIndex> {
        self.iter().last()
    }

    /// Sets the bit for `index`, which must already be representable.
    fn set_bit(&mut self, index: CpuIndex) {
        let (byte_index, mask) = locate(index);

        debug_assert!(
            byte_index < self.bytes.len(),
            "CPU {index} is not representable with {} bytes of storage",
            self.bytes.len()
        );

        if let Some(byte) = self.bytes.get_mut(byte_index) {
            *byte |= mask;
        }
    }

    fn grow_to_hold(&mut self, index: CpuIndex) -> crate::Result<()> {
        if index >= MAX_CPU_INDEX_EXCLUSIVE {
            return Err(Error::IndexOutOfRange { index });
        }

        let needed = storage_size_for(index);

        if let Some(additional) = needed
            .checked_sub(self.bytes.len())
            .filter(|additional| *additional > 0)
        {
            self.bytes.try_reserve_exact(additional)?;
            self.bytes.resize(needed, 0);
        }

        Ok(())
    }

    /// Trailing bytes that hold no members do not affect equality or hashing.
    fn significant_bytes(&self) -> &[u8] {
        let significant_len = self
            .bytes
            .iter()
            .rposition(|byte| *byte != 0)
            .map_or(0, |last| last.saturating_add(1));

        self.bytes.get(..significant_len).unwrap_or_default()
    }
}

/// The number of bytes needed to represent `index`, rounded up to the allocation granularity.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "callers reject indices at or above the ceiling, so this stays far from overflow"
)]
fn storage_size_for(index: CpuIndex) -> usize {
    let bits = index as usize + 1;

    bits.div_ceil(ALLOCATION_GRANULARITY_BITS) * ALLOCATION_GRANULARITY
}

/// Byte offset of the bit for `index` and the mask that selects it within that byte.
#[expect(
    clippy::integer_division,
    reason = "rounding down selects the byte that holds the bit"
)]
#[expect(
    clippy::arithmetic_side_effects,
    reason = "the shift amount is a remainder of 8, so it is always a valid shift for u8"
)]
fn locate(index: CpuIndex) -> (usize, u8) {
    let index = index as usize;

    (index / BITS_PER_BYTE, 1 << (index % BITS_PER_BYTE))
}

/// Iterator over the members of a [`CpuSet`] in ascending order.
///
/// Returned by [`CpuSet::iter()`].
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    bytes: &'a [u8],
    next: CpuIndex,
}

impl Iterator for Iter<'_> {
    type Item = CpuIndex;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let index = self.next;
            let (byte_index, mask) = locate(index);

            // Past the end of storage, every bit is unset.
            let byte = *self.bytes.get(byte_index)?;

            self.next = index.checked_add(1)?;

            if byte & mask != 0 {
                return Some(index);
            }
        }
    }
}

impl FusedIterator for Iter<'_> {}

/// Two sets are equal if they are in the same [`SetState`] and have the same members,
/// regardless of how much storage each has grown.
impl PartialEq for CpuSet {
    fn eq(&self, other: &Self) -> bool {
        self.state() == other.state() && self.significant_bytes() == other.significant_bytes()
    }
}

impl Eq for CpuSet {}

impl Hash for CpuSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.state().hash(state);
        self.significant_bytes().hash(state);
    }
}

/// Renders the members as ascending space-separated decimal indices, e.g. `2 5`.
/// An empty set renders as an empty string.
impl Display for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, index) in self.iter().enumerate() {
            if position > 0 {
                f.write_str(" ")?;
            }

            write!(f, "{index}")?;
        }

        Ok(())
    }
}

/// Parses a CPU set expression in strict mode.
impl FromStr for CpuSet {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        crate::parse(s, Mode::Strict)
    }
}

impl<'a> IntoIterator for &'a CpuSet {
    type Item = CpuIndex;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
