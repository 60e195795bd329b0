//! `litrep` is a library for bulk literal text substitution.
//!
//! It provides the core logic for the `litrep` command-line tool but can also be
//! used as a standalone library. The main components are:
//!
//! - `Replacer`: replaces a literal byte pattern in a single file, writing the
//!   result back either atomically or through an in-place backup sequence.
//! - `resolver`: turns a file or directory target (with an extension filter and
//!   optional recursion) into an ordered set of files and drives the replacer
//!   over it, stopping at the first error.
//! - `config`: merges command-line options with an optional YAML job file.
//!
//! Processing is strictly sequential: each file is read, rewritten and closed
//! before the next one is opened.

pub mod cli;
pub mod config;
pub mod errors;
pub mod replacer;
pub mod resolver;

// Re-export main types for easier access by library users.
pub use errors::{Error, Result};
pub use replacer::Replacer;
pub use resolver::{RunStats, Target};

/// Installs the stderr diagnostics subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level is `debug` when `verbose`
/// is set and `warn` when it is not.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
