//! Markdown pass over one light comment block.
//!
//! Only tagged sections are rewritten; everything from the opening frame to
//! the first `@tag:` line, and the closing frame, passes through untouched.
//! Boxed blocks are none of this pass's business and come back as they were.

use log::debug;

use crate::error::Result;
use crate::format::{BlockFormat, Column, LIGHT_TAG};
use crate::markup::{self, FenceAction, FenceState, FieldState};
use crate::text;

#[derive(Debug, Default)]
struct MarkifyState {
    format: Option<BlockFormat>,
    ended: bool,
    inside_markup: bool,
    fields: FieldState,
    fence: FenceState,
}

impl MarkifyState {
    /// Start of a new tagged section. Code lines still held are given back
    /// as written.
    fn new_section(&mut self, out: &mut Vec<String>) {
        self.flush_open_code(out);
        self.inside_markup = true;
        self.fields.reset();
    }

    fn flush_open_code(&mut self, out: &mut Vec<String>) {
        if self.fence.in_code() {
            debug!("unterminated code block left as written");
            out.extend(self.fence.drain());
        }
    }
}

/// Render the tagged sections of one light comment block as markdown.
pub fn markify<S: AsRef<str>>(lines: &[S]) -> Result<Vec<String>> {
    let newline = text::newline_of(lines)?;
    let mut state = MarkifyState::default();
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 2);

    for raw in lines {
        let raw = raw.as_ref();
        match state.format {
            None => match BlockFormat::detect(text::body(raw)) {
                Some(BlockFormat::Legacy) => {
                    debug!("boxed comment block skipped by markdown pass");
                    return Ok(text::to_owned_lines(lines));
                }
                Some(BlockFormat::Light) => {
                    state.format = Some(BlockFormat::Light);
                    out.push(raw.to_string());
                }
                None => out.push(raw.to_string()),
            },
            Some(_) if state.ended => out.push(raw.to_string()),
            Some(format) => process_line(&mut state, format, raw, newline, &mut out),
        }
    }
    state.flush_open_code(&mut out);
    Ok(out)
}

fn process_line(
    state: &mut MarkifyState,
    format: BlockFormat,
    raw: &str,
    newline: &str,
    out: &mut Vec<String>,
) {
    let body = text::body(raw);

    if format.is_end(body) {
        state.flush_open_code(out);
        state.ended = true;
        state.inside_markup = false;
        out.push(raw.to_string());
        return;
    }

    let Some(Column { prefix, content }) = format.column(body) else {
        out.push(raw.to_string());
        return;
    };
    let content = content.trim_end();

    if LIGHT_TAG.is_match(content) {
        state.new_section(out);
    }
    if !state.inside_markup {
        out.push(raw.to_string());
        return;
    }

    let terminator = match text::terminator(raw) {
        "" => newline,
        t => t,
    };

    if state.fence.in_code() {
        emit_fenced(state, prefix, content, raw, terminator, out);
        return;
    }

    let content = markup::emphasis(content);
    let contents: Vec<String> = state
        .fields
        .apply(&content)
        .iter()
        .map(|c| markup::lowercase_tag(&markup::quotes(c)))
        .collect();

    match contents.as_slice() {
        [single] => emit_fenced(state, prefix, single, raw, terminator, out),
        many => out.extend(many.iter().map(|c| format!("{prefix}{c}{terminator}"))),
    }
}

fn emit_fenced(
    state: &mut MarkifyState,
    prefix: &str,
    content: &str,
    raw: &str,
    terminator: &str,
    out: &mut Vec<String>,
) {
    match state.fence.feed(prefix, content, raw, terminator) {
        FenceAction::Emit => out.push(format!("{prefix}{content}{terminator}")),
        FenceAction::Hold => {}
        FenceAction::Flush(lines) => out.extend(lines),
    }
}
