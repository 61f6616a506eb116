//! Documentation comment layouts and the patterns that recognize them.
//!
//! Legacy (boxed) blocks:
//!
//! ```text
//!   /************************************/  (at least 2 asterisks)
//!   /*                                  */
//!   /* <Tag>                            */
//!   /************************************/  (at least 2 asterisks)
//! ```
//!
//! Light blocks:
//!
//! ```text
//!   /************************************   (at least 2 asterisks)
//!    *
//!    * @Tag:                                (1 asterisk)
//!    */                                     (1 or more asterisks)
//! ```
//!
//! All patterns are applied to a line body, i.e. with its terminator removed.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockFormat {
    /// Boxed on all four sides; the closing frame looks like the opening one.
    Legacy,
    /// Single leading asterisk column, closed by `*/`.
    Light,
}

struct Patterns {
    start: Regex,
    /// Group 1: the framing up to and including the column asterisk.
    /// Group 2: the unboxed content.
    column: Regex,
    end: Regex,
}

pub(crate) fn compile(re: &str) -> Regex {
    Regex::new(re).expect("invalid built-in pattern")
}

static LEGACY: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    start: compile(r"^\s*/\*{2,}/\s*$"),
    column: compile(r"^(\s*/\*)([^*].*)\*/\s*$"),
    // Not anchored at the start: used to swap the frame for ` */` while
    // keeping the indentation in front of it.
    end: compile(r"/\*{2,}/\s*$"),
});

static LIGHT: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    start: compile(r"^\s*/\*{2,}\s*$"),
    column: compile(r"^(\s*\*)((?:[^*/].*)?)$"),
    end: compile(r"^\s*\*+/"),
});

/// `<Name>` alone on its line (legacy markup tag), matched on unboxed content.
pub(crate) static LEGACY_TAG: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^(\s*)<([\w-]+)>\s*$"));

/// `@Name:` at the start of unboxed content (light markup tag).
pub(crate) static LIGHT_TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"^(\s*)@([\w-]+):"));

/// A complete `/* #define ... */` comment on one line.
static COMMENTED_DEFINE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^\s*/\*\s*#\s*define\b.*\*/\s*$"));

static BLANK_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| compile(r"^\s*\*\s*$"));

/// A documentation content line, split into framing and content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column<'a> {
    pub prefix: &'a str,
    pub content: &'a str,
}

impl BlockFormat {
    /// Start patterns are tried in this order: a degenerate line may fit
    /// both shapes, and the boxed reading wins.
    pub const PRIORITY: [BlockFormat; 2] = [BlockFormat::Legacy, BlockFormat::Light];

    fn patterns(self) -> &'static Patterns {
        match self {
            BlockFormat::Legacy => &LEGACY,
            BlockFormat::Light => &LIGHT,
        }
    }

    /// Format whose opening frame `line` is, if any.
    pub fn detect(line: &str) -> Option<BlockFormat> {
        Self::PRIORITY.into_iter().find(|f| f.is_start(line))
    }

    pub fn is_start(self, line: &str) -> bool {
        self.patterns().start.is_match(line)
    }

    pub fn column(self, line: &str) -> Option<Column<'_>> {
        let caps = self.patterns().column.captures(line)?;
        Some(Column {
            prefix: caps.get(1).map_or("", |m| m.as_str()),
            content: caps.get(2).map_or("", |m| m.as_str()),
        })
    }

    pub fn is_end(self, line: &str) -> bool {
        self.patterns().end.is_match(line)
    }

    /// Whether `line` closes a block of this format when grouping a file.
    /// A boxed block's closing frame is identical to its opening frame.
    pub fn ends_block(self, line: &str) -> bool {
        match self {
            BlockFormat::Legacy => self.is_start(line),
            BlockFormat::Light => self.is_end(line),
        }
    }
}

/// Replace the boxed closing frame of `line` with the light closing ` */`.
pub(crate) fn light_closing(line: &str) -> String {
    LEGACY.end.replace(line, " */").into_owned()
}

pub(crate) fn is_commented_define(line: &str) -> bool {
    COMMENTED_DEFINE.is_match(line)
}

/// A column line with nothing in it (` *`).
pub(crate) fn is_blank_separator(line: &str) -> bool {
    BLANK_SEPARATOR.is_match(line)
}
