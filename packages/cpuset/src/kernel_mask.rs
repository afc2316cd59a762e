use std::num::NonZero;

use libc::c_ulong;
use new_zealand::nz;

use crate::Error;
use crate::pal::{Bindings, BindingsFacade};

/// The number of CPUs the first probe attempt sizes its mask for.
pub const PROBE_BASELINE_CPUS: NonZero<usize> = nz!(1024);

const BITS_PER_WORD: usize = c_ulong::BITS as usize;

/// A zeroed affinity mask in the layout the Linux kernel uses for `sched_getaffinity()` and
/// `sched_setaffinity()`, sized to be large enough for the running kernel.
///
/// The kernel rejects masks that are smaller than its own configured CPU count, and that count
/// is not directly exposed. [`probe()`][Self::probe] discovers a sufficient size by trying
/// masks of increasing size until the kernel accepts one.
///
/// ```
/// use cpuset::KernelMask;
///
/// let mask = KernelMask::probe().unwrap();
///
/// println!(
///     "Kernel accepts affinity masks of {} CPUs ({} bytes)",
///     mask.cpu_capacity(),
///     mask.size_in_bytes()
/// );
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KernelMask {
    words: Vec<c_ulong>,
    cpu_capacity: NonZero<usize>,
}

impl KernelMask {
    /// Allocates a mask large enough for the current kernel, starting with room for
    /// [`PROBE_BASELINE_CPUS`] and doubling until an affinity query into the mask succeeds.
    ///
    /// The content of the successful query is discarded; the returned mask is all zeroes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if a mask cannot be allocated and [`Error::HostQuery`] if
    /// the kernel rejects the query for any reason other than the mask being too small.
    pub fn probe() -> crate::Result<Self> {
        Self::probe_with(&BindingsFacade::target())
    }

    pub(crate) fn probe_with(bindings: &impl Bindings) -> crate::Result<Self> {
        let mut cpu_capacity = PROBE_BASELINE_CPUS;

        loop {
            let mut words = allocate_words(cpu_capacity)?;

            match bindings.sched_getaffinity_current(&mut words) {
                Ok(()) => {
                    words.fill(0);

                    return Ok(Self {
                        words,
                        cpu_capacity,
                    });
                }
                Err(error) if error.raw_os_error() == Some(libc::EINVAL) => {
                    tracing::debug!(
                        cpu_capacity = cpu_capacity.get(),
                        "kernel rejected affinity mask as too small, retrying with a larger one"
                    );

                    cpu_capacity = cpu_capacity
                        .checked_mul(nz!(2))
                        .ok_or(Error::HostQuery(error))?;
                }
                Err(error) => return Err(Error::HostQuery(error)),
            }
        }
    }

    /// How many CPUs the mask has room for. This is the size hint the probe discovered.
    #[must_use]
    pub fn cpu_capacity(&self) -> NonZero<usize> {
        self.cpu_capacity
    }

    /// Size of the mask in bytes, as passed to the kernel's affinity functions.
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        size_of_val(self.words.as_slice())
    }

    /// The words of the mask, in the layout the kernel expects.
    #[must_use]
    pub fn as_words(&self) -> &[c_ulong] {
        &self.words
    }
}

fn allocate_words(cpu_capacity: NonZero<usize>) -> crate::Result<Vec<c_ulong>> {
    let len = cpu_capacity.get().div_ceil(BITS_PER_WORD);

    let mut words = Vec::new();
    words.try_reserve_exact(len)?;
    words.resize(len, 0);

    Ok(words)
}
