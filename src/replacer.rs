use crate::cli::WriteStrategy;
use crate::errors::{Error, Result};
use memchr::memmem::Finder;
use std::borrow::Cow;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Suffix appended to a file's path to form its transient backup copy.
pub const BACKUP_SUFFIX: &str = ".~tmp";

/// Core engine for replacing a literal pattern in files.
///
/// Both the pattern and the substitution are raw bytes, so files that are not
/// valid UTF-8 are handled the same way as text files. An empty pattern
/// never matches.
pub struct Replacer {
    finder: Option<Finder<'static>>,
    substitution: Vec<u8>,
}

/// Options for processing a file.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessOptions {
    /// How the new content is written back.
    pub strategy: WriteStrategy,
    /// If `true`, changes are counted but nothing is written to disk.
    pub dry_run: bool,
}

/// The result of processing a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessResult {
    /// Number of pattern occurrences that were replaced.
    pub replacements: usize,
    /// `true` if the file content differs after the replacement.
    pub modified: bool,
}

impl Replacer {
    /// Creates a new `Replacer` for a literal `pattern` and `substitution`.
    pub fn new(pattern: &[u8], substitution: &[u8]) -> Self {
        let finder = if pattern.is_empty() {
            None
        } else {
            Some(Finder::new(pattern).into_owned())
        };

        Self {
            finder,
            substitution: substitution.to_vec(),
        }
    }

    /// Replaces every non-overlapping, leftmost-first occurrence of the pattern.
    ///
    /// Returns the new content and the number of occurrences replaced. The
    /// content is borrowed unchanged when nothing matched.
    pub fn replace<'a>(&self, content: &'a [u8]) -> (Cow<'a, [u8]>, usize) {
        let Some(finder) = &self.finder else {
            return (Cow::Borrowed(content), 0);
        };

        let needle_len = finder.needle().len();
        let mut output = Vec::new();
        let mut last = 0;
        let mut matches = 0;

        for start in finder.find_iter(content) {
            if matches == 0 {
                output.reserve(content.len());
            }
            output.extend_from_slice(&content[last..start]);
            output.extend_from_slice(&self.substitution);
            last = start + needle_len;
            matches += 1;
        }

        if matches == 0 {
            return (Cow::Borrowed(content), 0);
        }
        output.extend_from_slice(&content[last..]);
        (Cow::Owned(output), matches)
    }

    /// Processes a single file, replacing the pattern everywhere in it.
    ///
    /// With [`WriteStrategy::Atomic`] the new content goes to a temporary
    /// sibling that is renamed over the original, and nothing is written when
    /// the content is unchanged. With [`WriteStrategy::InPlace`] the file is
    /// first copied to `<path>.~tmp`, then truncated and rewritten, then the
    /// copy is removed.
    pub fn process_file(&self, path: &Path, options: ProcessOptions) -> Result<ProcessResult> {
        let content = fs::read(path).map_err(|e| Error::read(path, e))?;
        let (new_content, replacements) = self.replace(&content);
        let result = ProcessResult {
            replacements,
            modified: new_content.as_ref() != content.as_slice(),
        };

        if options.dry_run {
            return Ok(result);
        }

        match options.strategy {
            WriteStrategy::Atomic => {
                if result.modified {
                    atomic_write(path, &new_content)?;
                }
            }
            WriteStrategy::InPlace => overwrite_in_place(path, &content, &new_content)?,
        }

        Ok(result)
    }
}

/// Returns the backup path for `path`: the same path with [`BACKUP_SUFFIX`] appended.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Backup, truncate, rewrite, then drop the backup.
///
/// A crash between the truncate and the write leaves only the backup copy.
fn overwrite_in_place(path: &Path, original: &[u8], new_content: &[u8]) -> Result<()> {
    let backup = backup_path(path);
    fs::write(&backup, original).map_err(|e| Error::write(&backup, e))?;
    debug!(backup = %backup.display(), "created backup copy");

    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| Error::write(path, e))?;
    file.write_all(new_content)
        .map_err(|e| Error::write(path, e))?;
    file.sync_all().map_err(|e| Error::write(path, e))?;

    remove_backup(&backup);
    Ok(())
}

/// Deletes a backup copy. Failure is logged and otherwise ignored.
fn remove_backup(backup: &Path) {
    if let Err(e) = fs::remove_file(backup) {
        warn!(backup = %backup.display(), error = %e, "could not remove backup copy");
    }
}

/// Atomic write: tempfile in the same directory, fsync, rename.
///
/// Symlinks are resolved first so the rename replaces the file they point
/// to, not the link.
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let real_path = fs::canonicalize(path).map_err(|e| Error::read(path, e))?;
    let path = real_path.as_path();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| Error::write(path, e))?;
    temp.write_all(content).map_err(|e| Error::write(path, e))?;

    // Preserve file permissions
    let perms = fs::metadata(path)
        .map_err(|e| Error::read(path, e))?
        .permissions();
    fs::set_permissions(temp.path(), perms).map_err(|e| Error::write(path, e))?;

    temp.as_file().sync_all().map_err(|e| Error::write(path, e))?;
    debug!(temp = %temp.path().display(), "renaming over original");
    temp.persist(path).map_err(|e| Error::write(path, e.error))?;

    Ok(())
}
