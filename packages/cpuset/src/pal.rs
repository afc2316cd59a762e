//! Platform Abstraction Layer (PAL). All calls into the operating system go through here so
//! that they can be replaced with mocks in unit tests.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub(crate) use linux::*;
