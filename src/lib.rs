// src/lib.rs
//
// docreflow — FreeType documentation comment converter
//
// - Boxed ("legacy") comment blocks become light blocks: one leading asterisk column,
//   `<Tag>` lines become `@Tag:`, the closing frame becomes ` */`.
// - Blocks cut off by code get a synthesized closing line.
// - Optional markdown pass over tagged sections of light blocks: emphasis runs,
//   field tables, quote normalization, lowercase tags, fenced code.
// - Everything outside documentation blocks is copied byte for byte.

pub mod convert;
pub mod error;
pub mod format;
pub mod markify;
pub mod markup;
pub mod output;
pub mod source;
pub mod text;

pub use convert::convert;
pub use error::{Error, Result};
pub use format::BlockFormat;
pub use markify::markify;
pub use output::{Destination, ProcessedFile};
pub use source::{BlockKind, Mode, SourceBlock, SourceProcessor};
