#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Growable sets of CPU indices, the textual syntax used to configure them and sizing of kernel
//! affinity masks.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms for
//! high-performance hardware-aware programming in Rust.
//!
//! # Format
//!
//! A CPU set expression is a list of zero or more tokens separated by whitespace and/or commas,
//! where each token is either:
//!
//! * a single CPU index (e.g. `1`)
//! * an inclusive range of CPU indices (e.g. `2-4`)
//!
//! Tokens may be wrapped in single or double quotes. CPU indices must be below 8192, the highest
//! CPU count any supported kernel can be configured for.
//!
//! A set is rendered as its members in ascending order, separated by single spaces (`2 4 5 6`),
//! or with consecutive runs collapsed into ranges (`2 4-6`).
//!
//! # Example
//!
//! Basic conversion from/to strings:
//!
//! ```
//! use cpuset::{Mode, parse};
//!
//! let selected_processors = parse("0-3, 8 10-11", Mode::Strict).unwrap();
//!
//! assert_eq!(selected_processors.to_string(), "0 1 2 3 8 10 11");
//! assert_eq!(selected_processors.to_range_string(), "0-3 8 10-11");
//! ```
//!
//! Repeated configuration settings accumulate, and an empty value resets:
//!
//! ```
//! use cpuset::CpuSet;
//!
//! let mut affinity = CpuSet::new();
//!
//! affinity.extend_from_str("0-1").unwrap();
//! affinity.extend_from_str("4").unwrap();
//! assert_eq!(affinity.to_string(), "0 1 4");
//!
//! affinity.extend_from_str("").unwrap();
//! assert!(affinity.is_empty());
//! ```
//!
//! # Diagnostics
//!
//! In [`Mode::Lenient`], problems with a value are emitted as `tracing` events in addition to
//! being returned as errors. Attach a [`ConfigLocation`] to say where the value came from.

mod cpu_set;
mod diagnostics;
mod error;
mod extend;
#[cfg(target_os = "linux")]
mod kernel_mask;
mod pal;
mod parse;
mod range;
mod tokenize;

pub use cpu_set::*;
pub use diagnostics::*;
pub use error::*;
#[cfg(target_os = "linux")]
pub use kernel_mask::*;
pub use parse::*;

/// Index of a CPU in a [`CpuSet`].
pub type CpuIndex = u32;

/// CPU indices must be below this value.
///
/// As of Linux 5.1, `CONFIG_NR_CPUS` can be set as high as 8192 on some architectures.
pub const MAX_CPU_INDEX_EXCLUSIVE: CpuIndex = 8192;
