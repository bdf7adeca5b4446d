//! Colour legend entries.
//!
//! A legend line declares one palette symbol, its colour and the value the
//! colour stands for:
//!
//! ```text
//! "o  c #FF0000 " /* "Present" */,
//! ```
//!
//! The symbol is the text right after an opening quote, followed by
//! whitespace, the colour key `c`, whitespace and a `#`-prefixed hex colour.
//! After the closing quote a C comment holds the value as a quoted string
//! running up to the last quote on the line. When a line contains several
//! quotes, the rightmost opening quote that yields a complete match wins.

use log::{debug, error};
use serde::{Deserialize, Serialize};

use super::error::XpmError;
use super::layout;

/// One palette declaration as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Pixel symbol, `nb` characters wide.
    pub symbol: String,
    /// Colour token including the leading `#` (not validated further).
    pub color: String,
    /// Free-form value text from the trailing comment.
    pub value: String,
}

/// Parse a legend line with single-character symbols.
///
/// # Examples
/// ```
/// use xpmatrix_core::parse_legend_entry;
///
/// let entry = parse_legend_entry(r#""o  c #FF0000 " /* "Present" */,"#)?;
/// assert_eq!(entry.symbol, "o");
/// assert_eq!(entry.color, "#FF0000");
/// assert_eq!(entry.value, "Present");
/// # Ok::<(), xpmatrix_core::XpmError>(())
/// ```
///
/// # Errors
/// Returns `XpmError::InvalidLegendEntry` when the line does not match.
pub fn parse_legend_entry(line: &str) -> Result<PaletteEntry, XpmError> {
    parse_legend_entry_with_width(line, 1)
}

/// Parse a legend line whose symbols are `width` characters wide.
///
/// # Errors
/// Returns `XpmError::InvalidLegendEntry` when the line does not match.
pub fn parse_legend_entry_with_width(line: &str, width: usize) -> Result<PaletteEntry, XpmError> {
    let entry = line
        .rmatch_indices(layout::QUOTE)
        .find_map(|(pos, _)| match_entry(&line[pos + 1..], width));

    match entry {
        Some(entry) => {
            debug!(
                "{}: symbol {:?} colour {} value {:?}",
                line.trim(),
                entry.symbol,
                entry.color,
                entry.value
            );
            Ok(entry)
        }
        None => {
            error!("cannot parse colour specification {line:?}");
            Err(XpmError::InvalidLegendEntry {
                text: line.to_string(),
            })
        }
    }
}

fn match_entry(rest: &str, width: usize) -> Option<PaletteEntry> {
    let mut scan = Scanner::new(rest);
    let symbol = scan.take_chars(width, is_symbol_char)?;
    scan.skip_whitespace(1)?;
    scan.expect(layout::COLOR_KEY)?;
    scan.skip_whitespace(1)?;
    let color_start = scan.rest;
    scan.expect(layout::COLOR_PREFIX)?;
    let digits = scan.take_while(|c| c.is_ascii_hexdigit());
    if digits.is_empty() {
        return None;
    }
    let color = &color_start[..1 + digits.len()];
    scan.skip_whitespace(0)?;
    scan.expect(layout::QUOTE)?;
    scan.skip_whitespace(0)?;
    scan.expect_str(layout::COMMENT_OPEN)?;
    scan.skip_whitespace(0)?;
    scan.expect(layout::QUOTE)?;
    let value = scan.until_last(layout::QUOTE)?;

    Some(PaletteEntry {
        symbol: symbol.to_string(),
        color: color.to_string(),
        value: value.to_string(),
    })
}

fn is_symbol_char(c: char) -> bool {
    c == ' ' || (c.is_ascii_graphic() && c != layout::QUOTE)
}

struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(rest: &'a str) -> Self {
        Self { rest }
    }

    fn take_chars(&mut self, count: usize, accept: impl Fn(char) -> bool) -> Option<&'a str> {
        let mut end = 0;
        let mut chars = self.rest.chars();
        for _ in 0..count {
            let c = chars.next().filter(|c| accept(*c))?;
            end += c.len_utf8();
        }
        let (taken, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(taken)
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let end = self
            .rest
            .find(|c: char| !accept(c))
            .unwrap_or(self.rest.len());
        let (taken, rest) = self.rest.split_at(end);
        self.rest = rest;
        taken
    }

    /// Skip whitespace, requiring at least `min` characters of it.
    fn skip_whitespace(&mut self, min: usize) -> Option<()> {
        let skipped = self.take_while(char::is_whitespace);
        (skipped.chars().count() >= min).then_some(())
    }

    fn expect(&mut self, c: char) -> Option<()> {
        self.rest = self.rest.strip_prefix(c)?;
        Some(())
    }

    fn expect_str(&mut self, s: &str) -> Option<()> {
        self.rest = self.rest.strip_prefix(s)?;
        Some(())
    }

    fn until_last(&mut self, c: char) -> Option<&'a str> {
        let end = self.rest.rfind(c)?;
        let taken = &self.rest[..end];
        self.rest = &self.rest[end + c.len_utf8()..];
        Some(taken)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_legend_entry, parse_legend_entry_with_width};
    use crate::format::xpm::error::XpmError;

    #[test]
    fn parse_space_symbol() {
        let entry = parse_legend_entry(r#""   c #FFFFFF " /* "None" */,"#).unwrap();
        assert_eq!(entry.symbol, " ");
        assert_eq!(entry.color, "#FFFFFF");
        assert_eq!(entry.value, "None");
    }

    #[test]
    fn parse_numeric_value_with_spaces() {
        let entry = parse_legend_entry(r#""A  c #E6E6FF " /* "0.25 nm" */,"#).unwrap();
        assert_eq!(entry.symbol, "A");
        assert_eq!(entry.value, "0.25 nm");
    }

    #[test]
    fn value_runs_to_last_quote() {
        let entry = parse_legend_entry(r#""B  c #0000ff " /* "say "hi"" */"#).unwrap();
        assert_eq!(entry.color, "#0000ff");
        assert_eq!(entry.value, r#"say "hi""#);
    }

    #[test]
    fn empty_value_is_allowed() {
        let entry = parse_legend_entry(r#""x c #000000" /* "" */,"#).unwrap();
        assert_eq!(entry.symbol, "x");
        assert_eq!(entry.value, "");
    }

    #[test]
    fn parse_wide_symbols() {
        let entry =
            parse_legend_entry_with_width(r#""Ab c #00FF00 " /* "7" */,"#, 2).unwrap();
        assert_eq!(entry.symbol, "Ab");
        assert_eq!(entry.value, "7");
    }

    #[test]
    fn reject_missing_comment() {
        let err = parse_legend_entry(r#""o  c #FF0000 ","#).unwrap_err();
        assert!(matches!(err, XpmError::InvalidLegendEntry { .. }));
        assert!(err.to_string().contains("cannot parse colour specification"));
    }

    #[test]
    fn reject_missing_colour_prefix() {
        let err = parse_legend_entry(r#""o  c FF0000 " /* "1" */,"#).unwrap_err();
        assert!(matches!(err, XpmError::InvalidLegendEntry { .. }));
    }

    #[test]
    fn reject_symbol_without_separator() {
        let err = parse_legend_entry(r#""oo c #FF0000 " /* "1" */,"#).unwrap_err();
        assert!(matches!(err, XpmError::InvalidLegendEntry { .. }));
    }

    #[test]
    fn reject_empty_line() {
        assert!(parse_legend_entry("").is_err());
    }
}
