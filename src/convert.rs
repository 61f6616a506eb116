//! Boxed → light conversion of one documentation comment block.
//!
//! ```text
//!   /*************************************************************************/
//!   /*                                                                       */
//!   /* <Section>                                                             */
//!   /*    gzip                                                               */
//!   /*                                                                       */
//!   /*************************************************************************/
//! ```
//!
//! becomes
//!
//! ```text
//!   /************************************************************************
//!    *
//!    * @Section:
//!    *   gzip
//!    *
//!    */
//! ```
//!
//! A block that cannot be converted safely (doubled opening frame, no content,
//! no markup tag) comes back exactly as it went in.

use log::debug;
use memchr::memmem;

use crate::error::Result;
use crate::format::{self, BlockFormat, LEGACY_TAG};
use crate::text;

/// Per-block state; a fresh value is made for every call to [`convert`].
#[derive(Debug)]
struct ConversionState {
    format: Option<BlockFormat>,
    ended: bool,
    /// Indentation of the opening frame.
    indent: usize,
    /// A non-blank content line has been seen.
    column_started: bool,
    inside_markup: bool,
    /// Cleared for blocks that must be emitted untouched.
    return_new: bool,
    /// Set once a commented `#define` closed the block early.
    do_not_end: bool,
    tags: usize,
    /// Content indent of the first line outside any markup section.
    baseline: Option<usize>,
}

impl ConversionState {
    fn new() -> Self {
        Self {
            format: None,
            ended: false,
            indent: 0,
            column_started: false,
            inside_markup: false,
            return_new: true,
            do_not_end: false,
            tags: 0,
            baseline: None,
        }
    }

    fn closing_line(&self, newline: &str) -> String {
        format!("{} */{newline}", " ".repeat(self.indent))
    }
}

/// Convert one comment block (opening frame to closing frame, terminators
/// kept) to the light format.
///
/// Returns either the converted lines or, when the block is not a plain
/// documentation block, a copy of the input.
pub fn convert<S: AsRef<str>>(lines: &[S]) -> Result<Vec<String>> {
    let newline = text::newline_of(lines)?;
    let mut state = ConversionState::new();
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 1);

    for raw in lines {
        let raw = raw.as_ref();
        match state.format {
            None => out.push(open_block(&mut state, raw)),
            Some(_) if state.ended || state.do_not_end => out.push(raw.to_string()),
            Some(format) => process_line(&mut state, format, raw, newline, &mut out),
        }
    }

    if state.format.is_some() && !state.ended && !state.do_not_end {
        // Abrupt end: the block ran into code without a closing frame.
        close_block(&state, newline, &mut out);
    }

    if state.tags == 0 {
        state.return_new = false;
    }
    if !state.return_new || !state.column_started {
        debug!(
            "comment block left as is (tags: {}, content: {})",
            state.tags, state.column_started
        );
        return Ok(text::to_owned_lines(lines));
    }
    Ok(out)
}

fn open_block(state: &mut ConversionState, raw: &str) -> String {
    let body = text::body(raw);
    match BlockFormat::detect(body) {
        Some(BlockFormat::Legacy) => {
            state.format = Some(BlockFormat::Legacy);
            state.indent = text::indent_width(body);
            // The opening frame must not double as a closing one.
            raw.replace("*/", "")
        }
        Some(BlockFormat::Light) => {
            state.format = Some(BlockFormat::Light);
            state.indent = text::indent_width(body);
            raw.to_string()
        }
        None => raw.to_string(),
    }
}

fn process_line(
    state: &mut ConversionState,
    format: BlockFormat,
    raw: &str,
    newline: &str,
    out: &mut Vec<String>,
) {
    let body = text::body(raw);

    if format::is_commented_define(body) {
        debug!("commented #define closes the comment block early");
        close_block(state, newline, out);
        state.do_not_end = true;
        out.push(raw.to_string());
        return;
    }

    match format {
        BlockFormat::Legacy => {
            if BlockFormat::Legacy.column(body).is_some() {
                let line = unbox(body);
                out.push(text::with_terminator(
                    content_line(state, line),
                    raw,
                    newline,
                ));
            } else if BlockFormat::Legacy.is_start(body) {
                if state.column_started {
                    // Boxed closing frame.
                    state.ended = true;
                    out.push(text::with_terminator(format::light_closing(body), raw, newline));
                } else {
                    state.return_new = false;
                    out.push(raw.to_string());
                }
            } else {
                out.push(raw.to_string());
            }
        }
        BlockFormat::Light => {
            if BlockFormat::Light.is_end(body) {
                state.ended = true;
                out.push(raw.to_string());
            } else if BlockFormat::Light.is_start(body) && !state.column_started {
                state.return_new = false;
                out.push(raw.to_string());
            } else if let Some(col) = BlockFormat::Light.column(body) {
                match retag(col.content) {
                    Some(content) => {
                        state.tags += 1;
                        state.inside_markup = true;
                        state.column_started = true;
                        let line = format!("{}{}", col.prefix, content);
                        out.push(text::with_terminator(line, raw, newline));
                    }
                    None => {
                        if !text::is_blank(col.content) {
                            state.column_started = true;
                        }
                        out.push(raw.to_string());
                    }
                }
            } else {
                out.push(raw.to_string());
            }
        }
    }
}

/// `  /* text    */` → `   * text`
///
/// The closer is searched from the right so that a literal `*/` quoted
/// inside the text survives.
fn unbox(body: &str) -> String {
    let mut line = body.replacen("/*", " *", 1);
    if let Some(pos) = memmem::rfind(line.as_bytes(), b"*/") {
        line.replace_range(pos..pos + 2, "");
    }
    line.truncate(line.trim_end().len());
    line
}

/// Retag or re-indent an unboxed legacy content line (no terminator).
fn content_line(state: &mut ConversionState, line: String) -> String {
    // `unbox` put the column asterisk in place of the opening `/*`.
    let Some(star) = line.find('*') else {
        return line;
    };
    let (head, content) = line.split_at(star + 1);

    if let Some(tagged) = retag(content) {
        state.tags += 1;
        state.inside_markup = true;
        state.column_started = true;
        return format!("{head}{tagged}");
    }
    if text::is_blank(content) {
        return line;
    }
    state.column_started = true;

    let width = text::indent_width(content);
    let target = if state.inside_markup {
        if width > 2 {
            width - 1
        } else {
            width
        }
    } else {
        // Centered headings would otherwise set a silly baseline.
        let baseline = *state
            .baseline
            .get_or_insert(if width > 12 { 2 } else { width });
        if width.abs_diff(baseline) % 2 == 1 {
            if width > baseline {
                width - 1
            } else {
                width + 1
            }
        } else {
            width
        }
    };

    if target < width {
        let mut chars = content.chars();
        chars.next();
        format!("{head}{}", chars.as_str())
    } else if target > width {
        format!("{head} {content}")
    } else {
        line
    }
}

/// `<Name>` → `@Name:`, keeping the spacing in front of the tag.
fn retag(content: &str) -> Option<String> {
    let caps = LEGACY_TAG.captures(content)?;
    Some(format!("{}@{}:", &caps[1], &caps[2]))
}

/// Emit a synthetic closing line, taking the place of a trailing blank
/// separator when there is one.
fn close_block(state: &ConversionState, newline: &str, out: &mut Vec<String>) {
    let closing = state.closing_line(newline);
    match out.last_mut() {
        Some(last) if format::is_blank_separator(text::body(last)) => *last = closing,
        _ => out.push(closing),
    }
}
