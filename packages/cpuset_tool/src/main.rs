#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

//! Binary entry point for the cpuset tool.
//!
//! This module is excluded from mutation testing because testing process entry/exit behavior
//! is impractical - it requires spawning subprocesses and checking exit codes.

use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use cpuset::ConfigLocation;
use tracing_subscriber::EnvFilter;

/// Normalize CPU set expressions and inspect kernel affinity mask sizing.
#[derive(FromArgs)]
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Apply(ApplyArgs),
    Check(CheckArgs),
    Probe(ProbeArgs),
}

/// Apply values in order like a repeated setting: values accumulate, an empty value resets.
#[derive(FromArgs)]
#[argh(subcommand, name = "apply")]
struct ApplyArgs {
    /// name of the setting the values belong to, used in diagnostics
    #[argh(option)]
    setting: Option<String>,

    /// file the values were read from, used in diagnostics
    #[argh(option)]
    file: Option<PathBuf>,

    /// the values to apply
    #[argh(positional)]
    values: Vec<String>,
}

/// Parse a single value in strict mode.
#[derive(FromArgs)]
#[argh(subcommand, name = "check")]
struct CheckArgs {
    /// the value to parse
    #[argh(positional)]
    value: String,
}

/// Discover how large kernel affinity masks need to be on this system.
#[derive(FromArgs)]
#[argh(subcommand, name = "probe")]
struct ProbeArgs {}

// Binary entry point - mutations would require subprocess testing which is impractical.
#[cfg_attr(test, mutants::skip)]
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();

    let output = match args.command {
        Command::Apply(apply) => {
            let mut location = ConfigLocation::new();

            if let Some(setting) = apply.setting {
                location = location.with_setting(setting);
            }

            if let Some(file) = apply.file {
                location = location.with_file(file);
            }

            cpuset_tool::apply(&apply.values, &location).map(|set| cpuset_tool::report(&set))
        }
        Command::Check(check) => {
            cpuset_tool::check(&check.value).map(|set| cpuset_tool::report(&set))
        }
        Command::Probe(ProbeArgs {}) => probe(),
    };

    match output {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_os = "linux")]
fn probe() -> Result<String, cpuset::Error> {
    cpuset_tool::probe()
}

#[cfg(not(target_os = "linux"))]
fn probe() -> Result<String, cpuset::Error> {
    Ok("kernel affinity mask probing is only available on Linux\n".to_string())
}
