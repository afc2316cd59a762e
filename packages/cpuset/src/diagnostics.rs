use std::fmt::{self, Display};
use std::path::PathBuf;

/// Where a configuration value came from, used to give lenient-mode diagnostics enough context
/// for a user to find the offending setting.
///
/// All fields are optional. An empty location is fine for values that did not come from a
/// configuration file (e.g. command line arguments).
///
/// ```
/// use cpuset::ConfigLocation;
///
/// let location = ConfigLocation::new()
///     .with_unit("worker.service")
///     .with_file("/etc/worker/worker.conf")
///     .with_line(12)
///     .with_setting("CPUAffinity");
///
/// assert_eq!(
///     location.to_string(),
///     "/etc/worker/worker.conf:12 [worker.service] CPUAffinity"
/// );
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigLocation {
    unit: Option<String>,
    file: Option<PathBuf>,
    line: Option<u32>,
    setting: Option<String>,
}

impl ConfigLocation {
    /// Creates a location with no details filled in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name of the unit (service, job, container) the value configures.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the path of the file the value was read from.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the 1-based line number of the value within its file.
    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets the name of the setting whose value is being parsed.
    #[must_use]
    pub fn with_setting(mut self, setting: impl Into<String>) -> Self {
        self.setting = Some(setting.into());
        self
    }

    /// The unit the value configures, if known.
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// The file the value was read from, if known.
    #[must_use]
    pub fn file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }

    /// The line the value was read from, if known.
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The name of the setting, if known.
    #[must_use]
    pub fn setting(&self) -> Option<&str> {
        self.setting.as_deref()
    }
}

impl Display for ConfigLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        match (&self.file, self.line) {
            (Some(file), Some(line)) => parts.push(format!("{}:{line}", file.display())),
            (Some(file), None) => parts.push(file.display().to_string()),
            (None, Some(line)) => parts.push(format!("line {line}")),
            (None, None) => {}
        }

        if let Some(unit) = &self.unit {
            parts.push(format!("[{unit}]"));
        }

        if let Some(setting) = &self.setting {
            parts.push(setting.clone());
        }

        f.write_str(&parts.join(" "))
    }
}

fn file_name(location: &ConfigLocation) -> Option<String> {
    location.file().map(|file| file.display().to_string())
}

// Lenient-mode reporting. Every event carries the location as structured fields so that
// subscribers can render it however they like.

pub(crate) fn report_invalid_value(location: &ConfigLocation, value: &str, error: &crate::Error) {
    let file = file_name(location);

    tracing::error!(
        unit = location.unit(),
        file = file.as_deref(),
        line = location.line(),
        setting = location.setting(),
        %error,
        "Invalid value for {}: {value}",
        location.setting().unwrap_or("CPU set")
    );
}

pub(crate) fn report_unparsable_token(location: &ConfigLocation, token: &str, error: &crate::Error) {
    let file = file_name(location);

    tracing::error!(
        unit = location.unit(),
        file = file.as_deref(),
        line = location.line(),
        setting = location.setting(),
        token,
        %error,
        "Failed to parse CPU affinity '{token}'"
    );
}

pub(crate) fn report_inverted_range(
    location: &ConfigLocation,
    token: &str,
    lower: crate::CpuIndex,
    upper: crate::CpuIndex,
) {
    let file = file_name(location);

    tracing::warn!(
        unit = location.unit(),
        file = file.as_deref(),
        line = location.line(),
        setting = location.setting(),
        token,
        "Range '{token}' is invalid, {lower} > {upper}, ignoring."
    );
}

pub(crate) fn report_cannot_add(
    location: &ConfigLocation,
    token: &str,
    index: crate::CpuIndex,
    error: &crate::Error,
) {
    let file = file_name(location);

    tracing::error!(
        unit = location.unit(),
        file = file.as_deref(),
        line = location.line(),
        setting = location.setting(),
        token,
        "Cannot add CPU {index} to set: {error}"
    );
}
