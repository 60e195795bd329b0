use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

/// Literal multi-line text substitution across files.
///
/// `litrep` reads a pattern and a substitution from two files and replaces
/// every occurrence of the pattern with the substitution, either in one file
/// or in the files of a directory.
#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about = "Replace literal (multi-line) text read from files",
    long_about = "litrep - Replace every occurrence of a literal pattern with a literal substitution.

The pattern and the substitution are each read from a file, so they may span
several lines and contain any characters without escaping.

EXAMPLES:
  litrep -p old.txt -s new.txt -f src/main.c             # One file
  litrep -p old.txt -s new.txt -d docs -e .md,.txt       # Matching files in a directory
  litrep -p old.txt -s new.txt -d . -r --dry-run         # Preview a recursive run
  litrep -c job.yaml                                     # Read options from a job file"
)]
pub struct Args {
    /// File that contains the pattern text to search for.
    #[arg(short, long = "pattern-file")]
    pub pattern_file: Option<PathBuf>,

    /// File that contains the substitution text to replace with.
    #[arg(short, long = "substitution-file")]
    pub substitution_file: Option<PathBuf>,

    /// Target file to replace text in. Either a file or a directory must be specified.
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Target directory containing files to replace text in.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Extensions of files in the target directory, comma separated, e.g. `.txt,.csv`.
    #[arg(short, long = "ext", value_delimiter = ',', env = "LITREP_EXT")]
    pub extensions: Vec<String>,

    /// Process files recursively in the target directory.
    #[arg(short, long)]
    pub recursive: bool,

    /// How modified content is written back to disk.
    #[arg(long, value_enum, env = "LITREP_STRATEGY")]
    pub strategy: Option<WriteStrategy>,

    /// Report what would change without modifying any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a YAML job file providing any of the options above.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug diagnostics on stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress per-file status lines and the summary.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// How a file's new content replaces its old content.
#[derive(clap::ValueEnum, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WriteStrategy {
    /// Write to a temporary sibling file, then rename it over the original.
    #[default]
    Atomic,
    /// Back up to `<file>.~tmp`, truncate the original and write into it.
    InPlace,
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}
