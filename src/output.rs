//! Input file lists and writing converted blocks back out.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use log::{info, warn};

use crate::error::{Error, Result};
use crate::source::SourceBlock;

/// Where converted files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    /// Under this directory, at the input path minus its first component.
    Directory(PathBuf),
    InPlace,
}

/// Block counts of one processed file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessedFile {
    pub blocks: usize,
    pub rewritten: usize,
}

impl ProcessedFile {
    pub fn from_blocks(blocks: &[SourceBlock]) -> Self {
        Self {
            blocks: blocks.len(),
            rewritten: blocks.iter().filter(|b| b.is_rewritten()).count(),
        }
    }
}

/// Expand command-line arguments into the list of files to process.
///
/// Arguments containing `*` are glob patterns; their matches are sorted.
/// Files that cannot be opened are reported and left out.
pub fn make_file_list<I, S>(args: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut files = Vec::new();
    for arg in args {
        let arg = arg.as_ref();
        if arg.contains('*') {
            let mut matches: Vec<PathBuf> = glob::glob(arg)?
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!("{e}");
                        None
                    }
                })
                .collect();
            matches.sort();
            files.extend(matches);
        } else {
            files.push(PathBuf::from(arg));
        }
    }

    files.retain(|path| {
        let ok = fs::File::open(path).is_ok_and(|f| f.metadata().is_ok_and(|m| m.is_file()));
        if !ok {
            warn!("{} couldn't be accessed", path.display());
        }
        ok
    });
    Ok(files)
}

pub fn check_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(Error::InvalidOutputDir(dir.to_path_buf()))
    }
}

/// `./include/freetype/freetype.h` → `freetype/freetype.h`.
///
/// A bare file name is kept as it is.
pub fn relative_output_path(input: &Path) -> PathBuf {
    let parts: Vec<&std::ffi::OsStr> = input
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();
    match parts.as_slice() {
        [] => PathBuf::new(),
        [only] => PathBuf::from(*only),
        [_, rest @ ..] => rest.iter().collect(),
    }
}

/// Serialize blocks, in order, exactly as stored.
pub fn write_blocks<W: Write>(blocks: &[SourceBlock], out: &mut W) -> io::Result<()> {
    for line in blocks.iter().flat_map(|b| &b.lines) {
        out.write_all(line.as_bytes())?;
    }
    Ok(())
}

/// Write the blocks of `input` to `dest`. Returns the path written, if any.
pub fn emit(blocks: &[SourceBlock], input: &Path, dest: &Destination) -> Result<Option<PathBuf>> {
    let target = match dest {
        Destination::Stdout => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write_blocks(blocks, &mut lock)
                .and_then(|()| lock.flush())
                .map_err(|source| Error::Io {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
            return Ok(None);
        }
        Destination::Directory(dir) => dir.join(relative_output_path(input)),
        Destination::InPlace => input.to_path_buf(),
    };

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            info!("created directory {}", parent.display());
        }
    }

    let mut buf = Vec::new();
    write_blocks(blocks, &mut buf).map_err(|source| Error::Io {
        path: target.clone(),
        source,
    })?;
    fs::write(&target, buf).map_err(|source| Error::Io {
        path: target.clone(),
        source,
    })?;
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::BlockKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    fn code(lines: &[&str]) -> SourceBlock {
        SourceBlock {
            lineno: 1,
            kind: BlockKind::Code,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[rstest]
    #[case("./include/freetype/freetype.h", "freetype/freetype.h")]
    #[case("include/freetype/internal/sfnt.h", "freetype/internal/sfnt.h")]
    #[case("src/gzip/ftgzip.c", "gzip/ftgzip.c")]
    #[case("ftgzip.c", "ftgzip.c")]
    fn output_paths(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(relative_output_path(Path::new(input)), PathBuf::from(expected));
    }

    #[test]
    fn file_list_expands_and_sorts_globs() {
        let dir = TempDir::new().unwrap();
        for name in ["b.h", "a.h", "c.txt"] {
            fs::write(dir.path().join(name), "x\n").unwrap();
        }
        let pattern = format!("{}/*.h", dir.path().display());
        let files = make_file_list([pattern]).unwrap();
        assert_eq!(files, vec![dir.path().join("a.h"), dir.path().join("b.h")]);
    }

    #[test]
    fn file_list_drops_missing_files() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present.h");
        fs::write(&present, "x\n").unwrap();
        let missing = dir.path().join("missing.h");
        let files = make_file_list([
            present.to_string_lossy().into_owned(),
            missing.to_string_lossy().into_owned(),
        ])
        .unwrap();
        assert_eq!(files, vec![present]);
    }

    #[test]
    fn bad_glob_is_an_error() {
        assert!(matches!(make_file_list(["[*"]), Err(Error::Pattern(_))));
    }

    #[test]
    fn output_dir_must_exist() {
        let dir = TempDir::new().unwrap();
        assert!(check_output_dir(dir.path()).is_ok());
        let missing = dir.path().join("nope");
        assert!(matches!(
            check_output_dir(&missing),
            Err(Error::InvalidOutputDir(p)) if p == missing
        ));
    }

    #[test]
    fn blocks_are_written_in_order() {
        let mut out = Vec::new();
        write_blocks(&[code(&["a\n", "b\r\n"]), code(&["c"])], &mut out).unwrap();
        assert_eq!(out, b"a\nb\r\nc");
    }

    #[test]
    fn emit_into_directory_creates_parents() {
        let dir = TempDir::new().unwrap();
        let dest = Destination::Directory(dir.path().to_path_buf());
        let written = emit(&[code(&["x;\n"])], Path::new("./include/freetype/x.h"), &dest)
            .unwrap()
            .unwrap();
        assert_eq!(written, dir.path().join("freetype/x.h"));
        assert_eq!(fs::read_to_string(written).unwrap(), "x;\n");
    }

    #[test]
    fn emit_in_place() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("x.h");
        fs::write(&file, "old\n").unwrap();
        emit(&[code(&["new\n"])], &file, &Destination::InPlace).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "new\n");
    }

    #[test]
    fn counts_rewritten_blocks() {
        let doc = SourceBlock {
            lineno: 2,
            kind: BlockKind::Doc {
                format: crate::format::BlockFormat::Legacy,
                rewritten: true,
            },
            lines: vec![],
        };
        let stats = ProcessedFile::from_blocks(&[code(&["a\n"]), doc]);
        assert_eq!(
            stats,
            ProcessedFile {
                blocks: 2,
                rewritten: 1
            }
        );
    }
}
