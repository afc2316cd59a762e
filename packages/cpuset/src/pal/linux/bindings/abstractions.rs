use std::fmt::Debug;
use std::io;

use libc::c_ulong;

/// Bindings for FFI calls into the operating system.
///
/// All PAL FFI calls must go through this trait, enabling them to be mocked.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Bindings: Debug + Send + Sync + 'static {
    /// `sched_getaffinity()` for the current thread, into a mask of whatever size `mask` is.
    ///
    /// Fails with `EINVAL` if the mask is smaller than the kernel's own affinity mask.
    fn sched_getaffinity_current(&self, mask: &mut [c_ulong]) -> Result<(), io::Error>;
}
