use std::fmt::Debug;
use std::io;

use libc::{c_ulong, cpu_set_t};

use crate::pal::Bindings;

/// FFI bindings that target the real operating system that the build is targeting.
///
/// You would only use different bindings in unit tests that need to use mock bindings.
/// Even then, whenever possible, unit tests should use real bindings for maximum realism.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

// Real OS bindings are excluded from coverage measurement because error paths require
// OS-level failures that are impractical to trigger in tests.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Bindings for BuildTargetBindings {
    fn sched_getaffinity_current(&self, mask: &mut [c_ulong]) -> Result<(), io::Error> {
        // 0 means current thread.
        // SAFETY: The pointer is valid for writes of exactly the size we pass in. The kernel
        // treats the buffer as an array of unsigned longs, which is what we hand it.
        let result = unsafe {
            libc::sched_getaffinity(
                0,
                size_of_val(mask),
                mask.as_mut_ptr().cast::<cpu_set_t>(),
            )
        };

        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}
