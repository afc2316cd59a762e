//! Splits a configuration value into words.
//!
//! Words are separated by any run of ASCII whitespace and commas. Single or double quotes group
//! characters (delimiters included) into the current word and are themselves removed. A
//! backslash takes the next character literally.

use crate::Error;

const QUOTES: [char; 2] = ['\'', '"'];
const ESCAPE: char = '\\';

fn is_delimiter(c: char) -> bool {
    c.is_ascii_whitespace() || c == ','
}

/// Iterator over the words of a configuration value.
///
/// Yields an error and then stops if a quote is left open or the value ends in a lone
/// backslash.
#[derive(Debug)]
pub(crate) struct Words<'a> {
    remaining: &'a str,
    failed: bool,
}

impl<'a> Words<'a> {
    pub(crate) fn new(value: &'a str) -> Self {
        Self {
            remaining: value,
            failed: false,
        }
    }

    fn extract_next(&mut self) -> Option<crate::Result<String>> {
        let trimmed = self.remaining.trim_start_matches(is_delimiter);

        if trimmed.is_empty() {
            self.remaining = trimmed;
            return None;
        }

        let mut word = String::new();
        let mut open_quote: Option<char> = None;
        let mut chars = trimmed.char_indices();
        let mut consumed = trimmed.len();

        while let Some((position, c)) = chars.next() {
            if c == ESCAPE {
                let Some((_, escaped)) = chars.next() else {
                    return Some(Err(Error::invalid_syntax(
                        trimmed,
                        "value ends with an unfinished escape sequence",
                    )));
                };

                word.push(escaped);
                continue;
            }

            match open_quote {
                Some(quote) if c == quote => open_quote = None,
                Some(_) => word.push(c),
                None if QUOTES.contains(&c) => open_quote = Some(c),
                None if is_delimiter(c) => {
                    consumed = position;
                    break;
                }
                None => word.push(c),
            }
        }

        if open_quote.is_some() {
            return Some(Err(Error::invalid_syntax(trimmed, "unterminated quote")));
        }

        self.remaining = trimmed.get(consumed..).unwrap_or_default();

        Some(Ok(word))
    }
}

impl Iterator for Words<'_> {
    type Item = crate::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let next = self.extract_next();

        if matches!(next, Some(Err(_))) {
            self.failed = true;
        }

        next
    }
}
