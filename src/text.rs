//! Line helpers shared by the comment passes.
//!
//! Every line handled by the passes keeps its own terminator so that output
//! is byte-exact; patterns are matched against the line body only.

use memchr::memchr_iter;

use crate::error::{Error, Result};

/// Split `src` into lines, each keeping its `\n` (or `\r\n`) terminator.
/// A final line without terminator is returned as is.
pub fn split_lines(src: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0usize;
    for nl in memchr_iter(b'\n', src.as_bytes()) {
        lines.push(&src[start..=nl]);
        start = nl + 1;
    }
    if start < src.len() {
        lines.push(&src[start..]);
    }
    lines
}

/// The line without its terminator.
#[inline]
pub fn body(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// The terminator of `line`: `"\r\n"`, `"\n"` or `""`.
#[inline]
pub fn terminator(line: &str) -> &str {
    &line[body(line).len()..]
}

/// Newline convention of a comment block, learned from its last line.
///
/// Falls back to the closest earlier line carrying a terminator, since the
/// last line of a file commonly has none.
pub fn newline_of<S: AsRef<str>>(lines: &[S]) -> Result<&str> {
    if lines.is_empty() {
        return Err(Error::EmptyBatch);
    }
    lines
        .iter()
        .rev()
        .map(|l| terminator(l.as_ref()))
        .find(|t| !t.is_empty())
        .ok_or(Error::MissingNewline)
}

/// Number of leading whitespace characters (raw count, tabs are not expanded).
#[inline]
pub fn indent_width(s: &str) -> usize {
    s.chars().take_while(|c| c.is_whitespace()).count()
}

#[inline]
pub fn is_blank(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

/// Reattach a terminator to a rebuilt line, preferring the one the original
/// line had.
#[inline]
pub fn with_terminator(mut rebuilt: String, original: &str, newline: &str) -> String {
    let t = terminator(original);
    rebuilt.push_str(if t.is_empty() { newline } else { t });
    rebuilt
}

pub fn to_owned_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines.iter().map(|l| l.as_ref().to_string()).collect()
}
