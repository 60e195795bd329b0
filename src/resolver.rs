use crate::config::{ConfigLoader, RunConfig};
use crate::errors::{Error, Result};
use crate::replacer::{ProcessOptions, Replacer};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A set of dot-prefixed extensions such as `.txt`. Empty matches every file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Creates a filter from extension strings. Empty entries are ignored.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(Into::into)
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Checks a file name against the filter. Comparison is exact and case-sensitive.
    pub fn matches(&self, file_name: &OsStr) -> bool {
        if self.is_empty() {
            return true;
        }
        let name = file_name.to_string_lossy();
        let ext = dotted_extension(&name);
        self.extensions.iter().any(|e| e == ext)
    }
}

/// Returns the extension of a file name including its leading dot.
///
/// This is the suffix starting at the last `.`, so `a.tar.gz` gives `.gz`,
/// `.bashrc` gives `.bashrc` and `README` gives the empty string.
pub fn dotted_extension(file_name: &str) -> &str {
    file_name.rfind('.').map_or("", |i| &file_name[i..])
}

/// What a run operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// One file, used exactly as given.
    File(PathBuf),
    /// The files of a directory.
    Directory {
        root: PathBuf,
        filter: ExtensionFilter,
        recursive: bool,
    },
}

impl Target {
    /// Picks the target from the file and directory options. The file wins
    /// when both are present.
    pub fn from_options(
        file: Option<PathBuf>,
        dir: Option<PathBuf>,
        filter: ExtensionFilter,
        recursive: bool,
    ) -> Result<Self> {
        match (file, dir) {
            (Some(file), _) => Ok(Target::File(file)),
            (None, Some(root)) => Ok(Target::Directory {
                root,
                filter,
                recursive,
            }),
            (None, None) => Err("either target file or dir must be specified".into()),
        }
    }

    /// Computes the ordered set of files to process.
    ///
    /// Directory targets yield absolute paths sorted by file name within each
    /// directory. The whole set is collected before any file is touched.
    pub fn resolve(&self) -> Result<Vec<PathBuf>> {
        match self {
            Target::File(path) => Ok(vec![path.clone()]),
            Target::Directory {
                root,
                filter,
                recursive,
            } => {
                let root = directory_root(root)?;
                if *recursive {
                    walk_recursive(&root, filter)
                } else {
                    list_directory(&root, filter)
                }
            }
        }
    }
}

/// Absolute form of a target directory, which must exist and be a directory.
fn directory_root(dir: &Path) -> Result<PathBuf> {
    let root = std::path::absolute(dir).map_err(|e| Error::read(dir, e))?;
    let metadata = fs::metadata(&root).map_err(|e| Error::read(dir, e))?;
    if !metadata.is_dir() {
        return Err(Error::read(
            dir,
            io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }
    Ok(root)
}

fn list_directory(root: &Path, filter: &ExtensionFilter) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(root)
        .map_err(|e| Error::read(root, e))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| Error::read(root, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut files = Vec::new();
    for entry in entries {
        let file_type = entry.file_type().map_err(|e| Error::read(entry.path(), e))?;
        if !file_type.is_dir() && filter.matches(&entry.file_name()) {
            files.push(root.join(entry.file_name()));
        }
    }
    Ok(files)
}

fn walk_recursive(root: &Path, filter: &ExtensionFilter) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_dir() && filter.matches(entry.file_name()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Files handed to the replacer.
    pub files_visited: usize,
    /// Files whose content changed (or would change, in a dry run).
    pub files_changed: usize,
    /// Total pattern occurrences replaced.
    pub replacements: usize,
}

/// Options that apply to a whole run rather than a single file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub process: ProcessOptions,
    /// Suppress the per-file status lines.
    pub quiet: bool,
}

/// Resolves `target` and replaces in every file of it, in order.
///
/// Stops at the first error. Files processed before it stay modified and
/// files after it are never opened.
pub fn resolve_and_replace(
    replacer: &Replacer,
    target: &Target,
    options: RunOptions,
) -> Result<RunStats> {
    let files = target.resolve()?;
    debug!(count = files.len(), "resolved target set");

    let prefix = if options.process.dry_run { "DRY " } else { "" };
    let mut stats = RunStats::default();

    for path in &files {
        if !options.quiet {
            println!("{prefix}replacing text in file {}...", path.display());
        }

        let result = replacer.process_file(path, options.process)?;

        stats.files_visited += 1;
        stats.replacements += result.replacements;
        if result.modified {
            stats.files_changed += 1;
        }

        if !options.quiet {
            println!(
                "{prefix}successfully replaced text in file {} ({} replacements)",
                path.display(),
                result.replacements
            );
        }
    }

    Ok(stats)
}

/// The main entry point for a replacement run.
///
/// This function:
/// 1. Validates that a file or directory target was given.
/// 2. Reads the pattern file and then the substitution file.
/// 3. Resolves the target set and processes each file in turn.
pub fn run_replace(config: &RunConfig) -> Result<RunStats> {
    let target = Target::from_options(
        config.file.clone(),
        config.dir.clone(),
        ExtensionFilter::new(config.extensions.iter().cloned()),
        config.recursive,
    )?;

    let pattern = ConfigLoader::load_text(&config.pattern_file)?;
    let substitution = ConfigLoader::load_text(&config.substitution_file)?;
    debug!(
        pattern_len = pattern.len(),
        substitution_len = substitution.len(),
        strategy = ?config.strategy,
        "loaded replacement text"
    );

    let replacer = Replacer::new(&pattern, &substitution);
    let options = RunOptions {
        process: ProcessOptions {
            strategy: config.strategy,
            dry_run: config.dry_run,
        },
        quiet: config.quiet,
    };

    resolve_and_replace(&replacer, &target, options)
}
