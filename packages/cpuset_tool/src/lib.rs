#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Command-line tool to normalize CPU set expressions and inspect kernel affinity mask sizing.
//!
//! This crate provides the core logic of the tool. The binary entry point is in `main.rs`.

use cpuset::{ConfigLocation, CpuSet, Mode, SetState};

/// Applies each value in order the way a repeated configuration setting would be applied:
/// values accumulate and an empty value resets everything applied before it.
///
/// Problems are reported as diagnostics attributed to `location` and returned as errors.
#[doc(hidden)]
pub fn apply<S: AsRef<str>>(
    values: &[S],
    location: &ConfigLocation,
) -> Result<CpuSet, cpuset::Error> {
    let mut set = CpuSet::new();

    for value in values {
        set.extend_from_str_with(value.as_ref(), location)?;
    }

    Ok(set)
}

/// Parses a single value in strict mode.
#[doc(hidden)]
pub fn check(value: &str) -> Result<CpuSet, cpuset::Error> {
    cpuset::parse(value, Mode::Strict)
}

/// Describes a set in the multi-line form the tool prints.
#[doc(hidden)]
#[must_use]
pub fn report(set: &CpuSet) -> String {
    let state = match set.state() {
        SetState::Unset => "unset",
        SetState::ExplicitlyEmpty => "explicitly empty",
        SetState::Populated => "populated",
        _ => "unknown",
    };

    format!(
        "state: {state}\ncount: {}\ncpus: {set}\nranges: {}\n",
        set.len(),
        set.to_range_string()
    )
}

/// Probes the kernel affinity mask size and describes the outcome.
#[cfg(target_os = "linux")]
#[doc(hidden)]
pub fn probe() -> Result<String, cpuset::Error> {
    let mask = cpuset::KernelMask::probe()?;

    Ok(format!(
        "cpu capacity: {}\nsize in bytes: {}\n",
        mask.cpu_capacity(),
        mask.size_in_bytes()
    ))
}
