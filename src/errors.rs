use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in `litrep`.
///
/// Every error is fatal to a run: the first one encountered stops processing
/// and is handed back to the caller unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// Neither a target file nor a target directory was given, or a required
    /// input is missing after merging the command line with a job file.
    #[error("Config error: {0}")]
    Config(String),

    /// A pattern file, substitution file, target file or directory listing
    /// could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A backup copy, an in-place overwrite or an atomic persist failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An error from the `walkdir` crate during a recursive traversal.
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// An error that occurred while parsing a YAML job file.
    #[error("Job file parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, litrep::errors::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Config(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Config(s.to_string())
    }
}
