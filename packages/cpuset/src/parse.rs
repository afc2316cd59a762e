use crate::diagnostics::{
    report_cannot_add, report_inverted_range, report_invalid_value, report_unparsable_token,
};
use crate::range::parse_token;
use crate::tokenize::Words;
use crate::{ConfigLocation, CpuSet};

/// How a parser reports problems in the value it is given.
///
/// The mode never changes whether a malformed value fails to parse, only whether the parser
/// itself emits a diagnostic about it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Mode {
    /// Problems are only reported to the caller via the returned error.
    #[default]
    Strict,

    /// Problems are also emitted as `tracing` events, tagged with the [`ConfigLocation`] of
    /// the value. Inverted ranges produce a warning.
    Lenient,
}

/// Parses a CPU set expression such as `0-3,8 10`.
///
/// The expression is a list of zero or more tokens separated by whitespace and/or commas. Each
/// token is a decimal index (`5`) or an inclusive range (`2-7`). Tokens may be quoted.
///
/// An empty value or one consisting only of delimiters yields an unset set. A range whose start
/// is above its end is ignored but still leaves the result in the
/// [`ExplicitlyEmpty`][crate::SetState::ExplicitlyEmpty] state (if nothing else was added), so
/// that callers can tell it apart from no value at all.
///
/// ```
/// use cpuset::{Mode, SetState, parse};
///
/// let set = parse("2,4-6", Mode::Strict).unwrap();
/// assert_eq!(set.to_string(), "2 4 5 6");
///
/// let inverted = parse("9-3", Mode::Strict).unwrap();
/// assert_eq!(inverted.to_string(), "");
/// assert_eq!(inverted.state(), SetState::ExplicitlyEmpty);
/// ```
///
/// # Errors
///
/// Fails if a token is not an integer or integer range, if quoting is unbalanced, if any index
/// is 8192 or higher or if storage cannot be allocated. No partially built set is returned.
pub fn parse(value: &str, mode: Mode) -> crate::Result<CpuSet> {
    parse_with(value, mode, &ConfigLocation::new())
}

/// Same as [`parse()`] but attaches `location` to any lenient-mode diagnostics.
///
/// # Errors
///
/// See [`parse()`].
pub fn parse_with(value: &str, mode: Mode, location: &ConfigLocation) -> crate::Result<CpuSet> {
    let lenient = mode == Mode::Lenient;

    // Only handed to the caller once every token has been applied.
    let mut set = CpuSet::new();

    for word in Words::new(value) {
        let word = word.inspect_err(|error| {
            if lenient {
                report_invalid_value(location, value, error);
            }
        })?;

        let range = parse_token(&word).inspect_err(|error| {
            if lenient {
                report_unparsable_token(location, &word, error);
            }
        })?;

        if range.is_inverted() {
            if lenient {
                report_inverted_range(location, &word, range.lower, range.upper);
            }

            set.mark_explicit()?;
            continue;
        }

        for index in range.descending() {
            set.add(index).inspect_err(|error| {
                if lenient {
                    report_cannot_add(location, &word, index, error);
                }
            })?;
        }
    }

    Ok(set)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::{Error, SetState};

    /// Collects everything a `fmt` subscriber writes so tests can inspect emitted diagnostics.
    #[derive(Clone, Default)]
    struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedOutput {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_diagnostics(f: impl FnOnce()) -> String {
        let output = CapturedOutput::default();

        let subscriber = tracing_subscriber::fmt()
            .with_writer(output.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .finish();

        tracing::subscriber::with_default(subscriber, f);

        let bytes = output.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn affinity_setting() -> ConfigLocation {
        ConfigLocation::new()
            .with_unit("test.service")
            .with_setting("CPUAffinity")
    }

    #[test]
    fn parse_smoke_test() {
        assert_eq!(parse("", Mode::Strict).unwrap().to_string(), "");
        assert_eq!(parse("555", Mode::Strict).unwrap().to_string(), "555");
        assert_eq!(parse("0,1,2,3", Mode::Strict).unwrap().to_string(), "0 1 2 3");
        assert_eq!(parse("2,3,1", Mode::Strict).unwrap().to_string(), "1 2 3");
        assert_eq!(
            parse("0-5,1-6", Mode::Strict).unwrap().to_string(),
            "0 1 2 3 4 5 6"
        );
        assert_eq!(
            parse("0-0 1-1\t3-3", Mode::Strict).unwrap().to_string(),
            "0 1 3"
        );
        assert_eq!(
            parse("2,4-6", Mode::Strict).unwrap().to_string(),
            "2 4 5 6"
        );
    }

    #[test]
    fn quoted_tokens() {
        assert_eq!(
            parse("'1' \"2-3\",4", Mode::Strict).unwrap().to_string(),
            "1 2 3 4"
        );
    }

    #[test]
    fn empty_and_delimiter_only_are_unset() {
        for value in ["", "   ", ",,,", " ,\t, "] {
            let set = parse(value, Mode::Lenient).unwrap();
            assert_eq!(set.state(), SetState::Unset, "value {value:?}");
        }
    }

    #[test]
    fn inverted_range_marks_explicit() {
        for mode in [Mode::Strict, Mode::Lenient] {
            let set = parse("9-3", mode).unwrap();

            assert_eq!(set.state(), SetState::ExplicitlyEmpty);
            assert_eq!(set.to_string(), "");
            assert!(set.allocated() > 0);
            assert_ne!(set, parse("", mode).unwrap());
        }
    }

    #[test]
    fn inverted_range_does_not_drop_other_tokens() {
        let set = parse("9-3,4", Mode::Lenient).unwrap();

        assert_eq!(set.to_string(), "4");
        assert_eq!(set.state(), SetState::Populated);
    }

    #[test]
    fn overlapping_ranges_are_idempotent() {
        let a = parse("1-4,2-3,4,1", Mode::Strict).unwrap();
        let b = parse("1-4", Mode::Strict).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn malformed_token_fails_in_both_modes() {
        for mode in [Mode::Strict, Mode::Lenient] {
            let error = parse("1,foo,3", mode).unwrap_err();

            assert!(matches!(
                error,
                Error::InvalidSyntax { ref invalid_value, .. } if invalid_value == "foo"
            ));
        }
    }

    #[test]
    fn unbalanced_quote_fails() {
        parse("1 '2", Mode::Strict).unwrap_err();
        parse("1 '2", Mode::Lenient).unwrap_err();
    }

    #[test]
    fn out_of_range_fails() {
        for mode in [Mode::Strict, Mode::Lenient] {
            let error = parse("1,8190-8192", mode).unwrap_err();
            assert!(matches!(error, Error::IndexOutOfRange { index: 8192 }));

            parse("0-4294967295", mode).unwrap_err();
        }

        parse("8191", Mode::Strict).unwrap();
    }

    #[test]
    fn location_does_not_change_result() {
        let location = ConfigLocation::new()
            .with_unit("test.service")
            .with_file("test.conf")
            .with_line(4)
            .with_setting("CPUAffinity");

        let set = parse_with("1-2 9-3", Mode::Lenient, &location).unwrap();
        assert_eq!(set.to_string(), "1 2");

        parse_with("x", Mode::Lenient, &location).unwrap_err();
    }

    #[test]
    fn lenient_inverted_range_warns() {
        let output = capture_diagnostics(|| {
            parse_with("9-3", Mode::Lenient, &affinity_setting()).unwrap();
        });

        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("Range '9-3' is invalid, 9 > 3"), "{output}");
        assert!(!output.contains("ERROR"), "{output}");
    }

    #[test]
    fn lenient_malformed_token_logs_error_with_setting() {
        let output = capture_diagnostics(|| {
            parse_with("x", Mode::Lenient, &affinity_setting()).unwrap_err();
        });

        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("Failed to parse CPU affinity 'x'"), "{output}");
        assert!(output.contains("setting="), "{output}");
        assert!(output.contains("CPUAffinity"), "{output}");
    }

    #[test]
    fn lenient_out_of_range_logs_error_with_setting() {
        let output = capture_diagnostics(|| {
            parse_with("1,8192", Mode::Lenient, &affinity_setting()).unwrap_err();
        });

        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("Cannot add CPU 8192"), "{output}");
        assert!(output.contains("setting="), "{output}");
        assert!(output.contains("CPUAffinity"), "{output}");
    }

    #[test]
    fn lenient_unbalanced_quote_logs_error() {
        let output = capture_diagnostics(|| {
            parse_with("'1", Mode::Lenient, &affinity_setting()).unwrap_err();
        });

        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("Invalid value for CPUAffinity"), "{output}");
    }

    #[test]
    fn strict_mode_is_silent() {
        let output = capture_diagnostics(|| {
            parse_with("9-3", Mode::Strict, &affinity_setting()).unwrap();

            for value in ["x", "1,8192", "'1"] {
                parse_with(value, Mode::Strict, &affinity_setting()).unwrap_err();
            }
        });

        assert_eq!(output, "");
    }

    #[test]
    fn round_trip() {
        let original = CpuSet::from_indices([0, 7, 8, 9, 63, 64, 1000, 8191]).unwrap();

        let from_list = parse(&original.to_string(), Mode::Strict).unwrap();
        let from_ranges = parse(&original.to_range_string(), Mode::Strict).unwrap();

        assert_eq!(from_list, original);
        assert_eq!(from_ranges, original);
    }
}
