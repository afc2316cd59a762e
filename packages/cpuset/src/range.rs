use crate::{CpuIndex, Error};

/// A closed interval of CPU indices parsed from a single token.
///
/// `lower` may exceed `upper`. Such an inverted range is not a syntax error; what to do with it
/// is up to the caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct TokenRange {
    pub(crate) lower: CpuIndex,
    pub(crate) upper: CpuIndex,
}

impl TokenRange {
    pub(crate) const fn is_inverted(self) -> bool {
        self.lower > self.upper
    }

    /// Indices of the range from the highest down, so that an out-of-range upper bound is hit
    /// before anything is added.
    pub(crate) fn descending(self) -> impl Iterator<Item = CpuIndex> {
        (self.lower..=self.upper).rev()
    }
}

/// Parses a token of the form `N` or `N-M` into a closed interval.
///
/// No CPU-specific ceiling is applied here; any `u32` is accepted.
pub(crate) fn parse_token(token: &str) -> crate::Result<TokenRange> {
    if let Some((lower, upper)) = token.split_once('-') {
        let lower = parse_decimal(lower).map_err(|problem| {
            Error::invalid_syntax(token, format!("range start {problem}"))
        })?;
        let upper = parse_decimal(upper)
            .map_err(|problem| Error::invalid_syntax(token, format!("range end {problem}")))?;

        Ok(TokenRange { lower, upper })
    } else {
        let single = parse_decimal(token).map_err(|problem| {
            Error::invalid_syntax(
                token,
                format!("token was not a range and its value {problem}"),
            )
        })?;

        Ok(TokenRange {
            lower: single,
            upper: single,
        })
    }
}

/// Unlike `str::parse`, this rejects a leading `+` so only plain decimal digits are accepted.
fn parse_decimal(value: &str) -> Result<CpuIndex, String> {
    if value.is_empty() {
        return Err("is missing".to_string());
    }

    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{value}' is not a decimal integer"));
    }

    value
        .parse::<CpuIndex>()
        .map_err(|inner| format!("'{value}' could not be parsed: {inner}"))
}
