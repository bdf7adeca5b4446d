use std::io::{self, BufRead};

use super::layout;

/// One line of input with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Line-oriented access to an XPM source.
///
/// Lines are returned without their terminator (`\n` or `\r\n`) and the
/// reader tracks the 1-based number of the last line handed out.
pub struct LineReader<R> {
    inner: R,
    line_number: usize,
    buf: String,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line_number: 0,
            buf: String::new(),
        }
    }

    /// Next line, or `None` at end of input.
    pub fn next_line(&mut self) -> io::Result<Option<Line<'_>>> {
        self.buf.clear();
        if self.inner.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        let trimmed = self.buf.trim_end_matches(['\n', '\r']).len();
        self.buf.truncate(trimmed);
        Ok(Some(Line {
            number: self.line_number,
            text: &self.buf,
        }))
    }
}

/// Text between the first and the last quote of `line`.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use xpmatrix_core::format::xpm::reader::unquote;
///
/// assert_eq!(unquote("\"4 2 2 1\","), "4 2 2 1");
/// assert_eq!(unquote("no quotes"), "no quotes");
/// ```
pub fn unquote(line: &str) -> &str {
    let start = line.find(layout::QUOTE).map_or(0, |pos| pos + 1);
    let end = line.rfind(layout::QUOTE).unwrap_or(line.len());
    line.get(start..end).unwrap_or("")
}

/// Text inside the outermost `/* ... */` of `line`, if both delimiters exist.
pub fn uncomment(line: &str) -> Option<&str> {
    let start = line.find(layout::COMMENT_OPEN)? + layout::COMMENT_OPEN.len();
    let end = line.rfind(layout::COMMENT_CLOSE)?;
    line.get(start..end)
}

pub fn is_comment(line: &str) -> bool {
    line.starts_with(layout::COMMENT_OPEN)
}

pub fn is_array_close(line: &str) -> bool {
    line.trim_start().starts_with(layout::ARRAY_CLOSE)
}
