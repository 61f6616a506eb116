//! Decomposition of a C source file into blocks.
//!
//! There are two kinds of blocks:
//!
//! - code blocks: source lines and ordinary comments, kept verbatim;
//! - documentation blocks: a comment in one of the [`BlockFormat`] layouts,
//!   which is run through the conversion passes before being stored.
//!
//! Concatenating the lines of all blocks, in order, gives the output file.

use std::fs;
use std::path::Path;

use log::debug;

use crate::convert::convert;
use crate::error::{Error, Result};
use crate::format::BlockFormat;
use crate::markify::markify;
use crate::text;

/// Which passes documentation blocks go through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Boxed → light format conversion only.
    #[default]
    Light,
    /// Format conversion, then markdown rendering of tagged sections.
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Code,
    Doc {
        format: BlockFormat,
        /// The passes changed the block.
        rewritten: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlock {
    /// 1-based line number of the block's first line in the input.
    pub lineno: usize,
    pub kind: BlockKind,
    pub lines: Vec<String>,
}

impl SourceBlock {
    pub fn is_rewritten(&self) -> bool {
        matches!(self.kind, BlockKind::Doc { rewritten: true, .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SourceProcessor {
    mode: Mode,
}

/// Lines accumulated for the block being read.
#[derive(Default)]
struct Pending {
    format: Option<BlockFormat>,
    lineno: usize,
    lines: Vec<String>,
}

impl SourceProcessor {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn parse_file(&self, path: &Path) -> Result<Vec<SourceBlock>> {
        let src = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&src)
    }

    pub fn parse_str(&self, src: &str) -> Result<Vec<SourceBlock>> {
        let mut blocks = Vec::new();
        let mut pending = Pending::default();

        for (idx, line) in text::split_lines(src).into_iter().enumerate() {
            let lineno = idx + 1;
            let body = text::body(line);
            match pending.format {
                None => self.normal_line(&mut pending, &mut blocks, line, lineno)?,
                Some(format) if format.ends_block(body) => {
                    pending.lines.push(line.to_string());
                    self.add_block(&mut pending, &mut blocks)?;
                }
                Some(format) if format.column(body).is_some() => {
                    pending.lines.push(line.to_string());
                }
                Some(_) => {
                    // The block ended without a closing frame; the line
                    // itself still needs looking at.
                    self.add_block(&mut pending, &mut blocks)?;
                    self.normal_line(&mut pending, &mut blocks, line, lineno)?;
                }
            }
        }
        self.add_block(&mut pending, &mut blocks)?;
        Ok(blocks)
    }

    /// Run a documentation block through the passes of this processor's mode.
    pub fn convert_block<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<String>> {
        let light = convert(lines)?;
        match self.mode {
            Mode::Light => Ok(light),
            Mode::Markdown => markify(&light),
        }
    }

    fn normal_line(
        &self,
        pending: &mut Pending,
        blocks: &mut Vec<SourceBlock>,
        line: &str,
        lineno: usize,
    ) -> Result<()> {
        if let Some(format) = BlockFormat::detect(text::body(line)) {
            self.add_block(pending, blocks)?;
            pending.format = Some(format);
        }
        if pending.lines.is_empty() {
            pending.lineno = lineno;
        }
        pending.lines.push(line.to_string());
        Ok(())
    }

    fn add_block(&self, pending: &mut Pending, blocks: &mut Vec<SourceBlock>) -> Result<()> {
        let Pending {
            format,
            lineno,
            lines,
        } = std::mem::take(pending);
        if lines.is_empty() {
            return Ok(());
        }

        let block = match format {
            None => SourceBlock {
                lineno,
                kind: BlockKind::Code,
                lines,
            },
            Some(format) => {
                let converted = match self.convert_block(&lines) {
                    Ok(converted) => converted,
                    // A lone unterminated frame on the last line of a file.
                    Err(Error::MissingNewline) => {
                        debug!("block at line {lineno} has no line terminator, kept as is");
                        lines.clone()
                    }
                    Err(e) => return Err(e),
                };
                let rewritten = converted != lines;
                debug!("documentation block at line {lineno} ({format:?}), rewritten: {rewritten}");
                SourceBlock {
                    lineno,
                    kind: BlockKind::Doc { format, rewritten },
                    lines: converted,
                }
            }
        };
        blocks.push(block);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "\
#ifndef FOO_H_
#define FOO_H_

  /*************************************************************************/
  /*                                                                       */
  /* <Function>                                                            */
  /*    FT_Foo                                                             */
  /*                                                                       */
  /* <Description>                                                         */
  /*    Does foo.                                                          */
  /*                                                                       */
  FT_EXPORT( FT_Error )
  FT_Foo( void );

#endif
";

    fn kinds(blocks: &[SourceBlock]) -> Vec<(usize, BlockKind)> {
        blocks.iter().map(|b| (b.lineno, b.kind)).collect()
    }

    #[test]
    fn groups_code_and_documentation() {
        let blocks = SourceProcessor::new(Mode::Light).parse_str(HEADER).unwrap();
        assert_eq!(
            kinds(&blocks),
            vec![
                (1, BlockKind::Code),
                (
                    4,
                    BlockKind::Doc {
                        format: BlockFormat::Legacy,
                        rewritten: true
                    }
                ),
                (12, BlockKind::Code),
            ]
        );
    }

    #[test]
    fn abrupt_block_is_closed_before_code() {
        let blocks = SourceProcessor::new(Mode::Light).parse_str(HEADER).unwrap();
        let out: String = blocks.iter().flat_map(|b| b.lines.iter().map(String::as_str)).collect();
        assert_eq!(
            out,
            "\
#ifndef FOO_H_
#define FOO_H_

  /************************************************************************
   *
   * @Function:
   *   FT_Foo
   *
   * @Description:
   *   Does foo.
   */
  FT_EXPORT( FT_Error )
  FT_Foo( void );

#endif
"
        );
    }

    #[test]
    fn markdown_mode_lowercases_converted_tags() {
        let blocks = SourceProcessor::new(Mode::Markdown).parse_str(HEADER).unwrap();
        assert_eq!(blocks[1].lines[2], "   * @function:\n");
        assert_eq!(blocks[1].lines[5], "   * @description:\n");
    }

    #[test]
    fn closed_light_block() {
        let src = "x;\n  /**\n   * @Note:\n   *   Text.\n   */\ny;\n";
        let blocks = SourceProcessor::default().parse_str(src).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].lineno, 2);
        assert_eq!(blocks[1].lines.len(), 4);
        assert!(!blocks[1].is_rewritten());
        assert_eq!(blocks[2].lines, vec!["y;\n".to_string()]);
    }

    #[test]
    fn block_at_end_of_file_is_converted() {
        let src = "  /*****/\n  /* <Note> */\n  /*  x    */";
        let blocks = SourceProcessor::default().parse_str(src).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].lines,
            vec!["  /****\n", "   * @Note:\n", "   *  x\n", "   */\n"]
        );
    }

    #[test]
    fn adjacent_blocks_start_new_documentation_block() {
        let src = "  /*****/\n  /* <A> */\n  /**\n   * @B:\n   */\n";
        let blocks = SourceProcessor::default().parse_str(src).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines, vec!["  /****\n", "   * @A:\n", "   */\n"]);
        assert_eq!(blocks[1].lineno, 3);
    }

    #[test]
    fn unterminated_lone_frame_is_kept() {
        let src = "x;\n  /**";
        let blocks = SourceProcessor::default().parse_str(src).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].lines, vec!["  /**"]);
        assert!(!blocks[1].is_rewritten());
    }

    #[test]
    fn empty_source() {
        assert!(SourceProcessor::default().parse_str("").unwrap().is_empty());
    }
}
