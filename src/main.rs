// src/main.rs
//
// docreflow — command-line front end
//
// - Every FILE is split into code and documentation blocks; documentation blocks are
//   converted to the light format (and, with --markdown, rendered as markdown).
// - Arguments containing '*' are glob patterns, expanded and sorted.
// - Output goes to stdout unless --output DIR or --in-place is given.
//
// CLI flags:
//   --markdown        : run the markdown pass after format conversion
//   -o, --output DIR  : write to DIR/<input path minus its first component>
//   -i, --in-place    : overwrite each input file
//   -v, --verbose     : more logging (-v info, -vv debug); RUST_LOG overrides
// Exit status: 0 on success, 2 when DIR is not a directory, 1 on any other error.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use docreflow::output::{self, Destination, ProcessedFile};
use docreflow::{Error, Mode, SourceProcessor};
use log::{info, LevelFilter};

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Render tagged sections as markdown after conversion
    #[arg(long, action = ArgAction::SetTrue)]
    markdown: bool,

    /// Output directory (default: standard output)
    #[arg(short, long, value_name = "DIR", conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Overwrite input files
    #[arg(short, long, action = ArgAction::SetTrue)]
    in_place: bool,

    /// Increase logging verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Input files or glob patterns
    #[arg(required = true, value_name = "FILES")]
    files: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            match e.downcast_ref::<Error>() {
                Some(Error::InvalidOutputDir(_)) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let dest = match (&cli.output, cli.in_place) {
        (Some(dir), _) => {
            output::check_output_dir(dir)?;
            Destination::Directory(dir.clone())
        }
        (None, true) => Destination::InPlace,
        (None, false) => Destination::Stdout,
    };
    let mode = if cli.markdown { Mode::Markdown } else { Mode::Light };
    let processor = SourceProcessor::new(mode);

    let files = output::make_file_list(&cli.files)?;
    for file in &files {
        let blocks = processor
            .parse_file(file)
            .with_context(|| format!("failed to convert {}", file.display()))?;
        let stats = ProcessedFile::from_blocks(&blocks);
        let written = output::emit(&blocks, file, &dest)
            .with_context(|| format!("failed to write {}", file.display()))?;
        info!(
            "{}: {} blocks, {} rewritten{}",
            file.display(),
            stats.blocks,
            stats.rewritten,
            written.map_or_else(String::new, |p| format!(" -> {}", p.display()))
        );
    }
    Ok(())
}
