//! Markdown rendering of light comment content.
//!
//! Each transform takes the unboxed content of one line (the text after the
//! column asterisk, right-trimmed) and returns it rewritten; content that does
//! not match is returned unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::format::{compile, LIGHT_TAG};
use crate::text;

/* =============================== Emphasis =============================== */

// Marked words consist of letters, digits, `_` and `-`, or an apostrophe
// (but not as the first character). Group 2 is punctuation glued to the
// closing marker.
static BOLD_WORD: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^\*((?:\w|-)(?:\w|'|-)*)\*([^\w\s*_]*)$"));
static ITALIC_WORD: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^_((?:\w|-)(?:\w|'|-)*)_([^\w\s*_]*)$"));

#[derive(Clone, Copy, Debug)]
enum Emphasis {
    Bold,
    Italic,
}

impl Emphasis {
    fn word(self) -> &'static Regex {
        match self {
            Emphasis::Bold => &BOLD_WORD,
            Emphasis::Italic => &ITALIC_WORD,
        }
    }

    fn delimiter(self) -> char {
        match self {
            Emphasis::Bold => '*',
            Emphasis::Italic => '_',
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Emphasis::Bold => "**",
            Emphasis::Italic => "_",
        }
    }
}

/// `*quick* *brown* *fox*` → `**quick brown fox**`, `_a_ _b_` → `_a b_`.
pub fn emphasis(content: &str) -> String {
    let content = merge_runs(content, Emphasis::Bold);
    merge_runs(&content, Emphasis::Italic)
}

/// Merge runs of individually marked words into one span. A run is broken by
/// an unmarked word, by a double space, and after a word with punctuation
/// glued to it.
fn merge_runs(content: &str, kind: Emphasis) -> String {
    if !content.contains(kind.delimiter()) {
        return content.to_string();
    }

    let marker = kind.marker();
    let mut words: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    let flush = |run: &mut Vec<&str>, words: &mut Vec<String>, trail: &str| {
        if !run.is_empty() {
            words.push(format!("{marker}{}{marker}{trail}", run.join(" ")));
            run.clear();
        }
    };

    for word in content.split(' ') {
        match kind.word().captures(word) {
            Some(caps) => {
                let inner = caps.get(1).map_or(word, |m| m.as_str());
                let trail = caps.get(2).map_or("", |m| m.as_str());
                run.push(inner);
                if !trail.is_empty() {
                    flush(&mut run, &mut words, trail);
                }
            }
            None => {
                flush(&mut run, &mut words, "");
                words.push(word.to_string());
            }
        }
    }
    flush(&mut run, &mut words, "");
    words.join(" ")
}

/* ============================== Field table ============================= */

// `foo ::`, `foo.bar   ::`
static FIELD: LazyLock<Regex> = LazyLock::new(|| compile(r"^\s*\w(?:[\w.]*\w)?\s*::"));

/// Field tracking inside one tagged section.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldState {
    inside_field: bool,
    field_indent: usize,
}

impl FieldState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn inside_field(&self) -> bool {
        self.inside_field
    }

    /// Rewrite one content line into one or two content lines:
    ///
    /// ```text
    ///   name     :: description    →    name ::
    ///                                      description
    /// ```
    ///
    /// Lines following a field are re-indented to its description column
    /// until the section ends.
    pub fn apply(&mut self, content: &str) -> Vec<String> {
        let indent = text::indent_width(content);

        if let Some(m) = FIELD.find(content) {
            self.inside_field = true;
            self.field_indent = indent;

            let name = content[..m.end() - 2].trim_end();
            let desc = content[m.end()..].trim();
            let mut lines = vec![format!("{name} ::")];
            if !desc.is_empty() {
                lines.push(format!("{}{desc}", " ".repeat(indent + 2)));
            }
            return lines;
        }

        if self.inside_field && !text::is_blank(content) {
            return vec![format!(
                "{}{}",
                " ".repeat(self.field_indent + 2),
                content.trim()
            )];
        }
        vec![content.to_string()]
    }
}

/* ================================ Quotes ================================ */

// `word'
static OLD_QUOTE: LazyLock<Regex> = LazyLock::new(|| compile(r"`([^`']+)'"));
// `code`, already converted
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"`([^`']*)`"));
static CAMEL_CASE: LazyLock<Regex> = LazyLock::new(|| compile(r"[a-z][A-Z]"));

/// Stands in for a code backtick while plain quotes are normalized.
const CODE_MARK: char = '\u{E000}';

fn is_code_like(quoted: &str) -> bool {
    quoted.contains(['_', '.', '+', '='])
        || quoted.contains("->")
        || CAMEL_CASE.is_match(quoted)
}

/// `` `face_index' `` → `` `face_index` ``, `` `CPAL' `` → `'CPAL'`.
pub fn quotes(content: &str) -> String {
    if !content.contains('`') || content.contains(CODE_MARK) {
        return content.to_string();
    }
    let mark = |inner: &str| format!("{CODE_MARK}{inner}{CODE_MARK}");

    let protected = INLINE_CODE.replace_all(content, |caps: &Captures| mark(&caps[1]));
    let marked = OLD_QUOTE.replace_all(&protected, |caps: &Captures| {
        if is_code_like(&caps[1]) {
            mark(&caps[1])
        } else {
            caps[0].to_string()
        }
    });
    marked.replace('`', "'").replace(CODE_MARK, "`")
}

/* ============================== Tag casing ============================== */

/// `@Function:` → `@function:`
pub fn lowercase_tag(content: &str) -> String {
    LIGHT_TAG
        .replace(content, |caps: &Captures| {
            format!("{}@{}:", &caps[1], caps[2].to_lowercase())
        })
        .into_owned()
}

/* ============================== Code blocks ============================= */

static OPEN_BRACE: LazyLock<Regex> = LazyLock::new(|| compile(r"^(\s*)\{\s*$"));
static CLOSE_BRACE: LazyLock<Regex> = LazyLock::new(|| compile(r"^(\s*)\}\s*$"));

pub const FENCE: &str = "```";

/// What the block driver should do with the line it just fed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenceAction {
    /// Not code; emit the line normally.
    Emit,
    /// Held in the code buffer; emit nothing for now.
    Hold,
    /// The code block closed; emit these lines.
    Flush(Vec<String>),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum FenceMode {
    #[default]
    None,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeldLine {
    original: String,
    rendered: String,
}

/// Brace-delimited code block tracking:
///
/// ```text
///  *   {                  *   ```
///  *     x = 1;     →     *     x = 1;
///  *   }                  *   ```
/// ```
///
/// A closing brace deeper than the opening one belongs to the code.
#[derive(Debug, Default, Clone)]
pub struct FenceState {
    mode: FenceMode,
    margin: usize,
    held: Vec<HeldLine>,
}

impl FenceState {
    pub fn in_code(&self) -> bool {
        self.mode == FenceMode::Code
    }

    /// Feed one content line. `original` is the line as it appeared in the
    /// block, `newline` the terminator for rebuilt lines.
    pub fn feed(
        &mut self,
        precontent: &str,
        content: &str,
        original: &str,
        newline: &str,
    ) -> FenceAction {
        match self.mode {
            FenceMode::None => {
                let Some(caps) = OPEN_BRACE.captures(content) else {
                    return FenceAction::Emit;
                };
                self.mode = FenceMode::Code;
                self.margin = text::indent_width(&caps[1]);
                let rendered = self.delimiter(precontent, newline);
                self.hold(original, rendered);
                FenceAction::Hold
            }
            FenceMode::Code => {
                let closes = CLOSE_BRACE
                    .captures(content)
                    .is_some_and(|caps| text::indent_width(&caps[1]) <= self.margin);
                if closes {
                    let closing = self.delimiter(precontent, newline);
                    let mut lines: Vec<String> =
                        self.take().into_iter().map(|h| h.rendered).collect();
                    lines.push(closing);
                    FenceAction::Flush(lines)
                } else {
                    self.hold(original, format!("{precontent}{content}{newline}"));
                    FenceAction::Hold
                }
            }
        }
    }

    /// Give back held lines as they were written, for a code block that never
    /// closed.
    pub fn drain(&mut self) -> Vec<String> {
        self.take().into_iter().map(|h| h.original).collect()
    }

    fn delimiter(&self, precontent: &str, newline: &str) -> String {
        format!("{precontent}{}{FENCE}{newline}", " ".repeat(self.margin))
    }

    fn hold(&mut self, original: &str, rendered: String) {
        self.held.push(HeldLine {
            original: original.to_string(),
            rendered,
        });
    }

    fn take(&mut self) -> Vec<HeldLine> {
        self.mode = FenceMode::None;
        self.margin = 0;
        std::mem::take(&mut self.held)
    }
}
