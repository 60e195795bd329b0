use crate::cli::{Args, WriteStrategy};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// A YAML job file describing a replacement run.
///
/// Every field is optional; values given on the command line win.
///
/// ```yaml
/// pattern_file: old.txt
/// substitution_file: new.txt
/// dir: docs
/// extensions: [".md", ".txt"]
/// recursive: true
/// strategy: in-place
/// ```
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    pub pattern_file: Option<PathBuf>,
    pub substitution_file: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub extensions: Option<Vec<String>>,
    pub recursive: Option<bool>,
    pub strategy: Option<WriteStrategy>,
}

/// Fully merged settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pattern_file: PathBuf,
    pub substitution_file: PathBuf,
    pub file: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub recursive: bool,
    pub strategy: WriteStrategy,
    pub dry_run: bool,
    pub quiet: bool,
}

impl RunConfig {
    /// Builds a `RunConfig` from parsed arguments, merging in the job file
    /// named by `--config` when there is one.
    pub fn from_args(args: Args) -> Result<Self> {
        let job = match &args.config {
            Some(path) => {
                let resolved = ConfigLoader::find_config(path)?;
                tracing::debug!(job = %resolved.display(), "loading job file");
                let job = ConfigLoader::load_job(&resolved)?;
                job.relative_to(resolved.parent().unwrap_or(Path::new("")))
            }
            None => JobFile::default(),
        };
        Self::merge(args, job)
    }

    /// Merges command-line arguments over a job file.
    pub fn merge(args: Args, job: JobFile) -> Result<Self> {
        let pattern_file = args
            .pattern_file
            .or(job.pattern_file)
            .ok_or("pattern file must be specified")?;
        let substitution_file = args
            .substitution_file
            .or(job.substitution_file)
            .ok_or("substitution file must be specified")?;

        let extensions = if args.extensions.is_empty() {
            job.extensions.unwrap_or_default()
        } else {
            args.extensions
        };

        Ok(Self {
            pattern_file,
            substitution_file,
            file: args.file.or(job.file),
            dir: args.dir.or(job.dir),
            extensions,
            recursive: args.recursive || job.recursive.unwrap_or(false),
            strategy: args.strategy.or(job.strategy).unwrap_or_default(),
            dry_run: args.dry_run,
            quiet: args.quiet,
        })
    }
}

impl JobFile {
    /// Resolves relative paths in the job against `base`, the job file's directory.
    fn relative_to(self, base: &Path) -> Self {
        let join = |p: Option<PathBuf>| p.map(|p| if p.is_absolute() { p } else { base.join(p) });
        Self {
            pattern_file: join(self.pattern_file),
            substitution_file: join(self.substitution_file),
            file: join(self.file),
            dir: join(self.dir),
            ..self
        }
    }
}

/// A utility for locating and loading run inputs.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Finds a job file.
    ///
    /// The search order is:
    /// 1. `config_path` as given (absolute, or relative to the current directory).
    /// 2. Inside `<config dir>/litrep`, e.g. `~/.config/litrep` on Linux.
    pub fn find_config(config_path: &Path) -> Result<PathBuf> {
        if config_path.exists() {
            return Ok(config_path.to_path_buf());
        }

        let mut tried_locations = vec![config_path.display().to_string()];

        if !config_path.is_absolute() {
            if let Some(config_dir) = dirs::config_dir() {
                let user_config = config_dir.join("litrep").join(config_path);
                if user_config.exists() {
                    return Ok(user_config);
                }
                tried_locations.push(user_config.display().to_string());
            }
        }

        Err(format!(
            "Job file '{}' not found. Searched in:\n  - {}",
            config_path.display(),
            tried_locations.join("\n  - ")
        )
        .into())
    }

    /// Loads a `JobFile` from YAML.
    pub fn load_job(path: &Path) -> Result<JobFile> {
        let file = File::open(path).map_err(|e| Error::read(path, e))?;
        Ok(serde_yaml::from_reader(file)?)
    }

    /// Reads the whole content of a pattern or substitution file.
    pub fn load_text(path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| Error::read(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args() -> Args {
        Args {
            pattern_file: Some("p.txt".into()),
            substitution_file: Some("s.txt".into()),
            ..Args::default()
        }
    }

    #[test]
    fn command_line_wins_over_job_file() {
        let job = JobFile {
            pattern_file: Some("job-p.txt".into()),
            dir: Some("docs".into()),
            extensions: Some(vec![".md".into()]),
            strategy: Some(WriteStrategy::InPlace),
            ..JobFile::default()
        };
        let args = Args { extensions: vec![".txt".into()], ..args() };

        let config = RunConfig::merge(args, job).unwrap();

        assert_eq!(config.pattern_file, PathBuf::from("p.txt"));
        assert_eq!(config.dir, Some(PathBuf::from("docs")));
        assert_eq!(config.extensions, vec![".txt".to_string()]);
        assert_eq!(config.strategy, WriteStrategy::InPlace);
    }

    #[test]
    fn missing_pattern_file_is_a_config_error() {
        let args = Args { pattern_file: None, ..args() };
        let err = RunConfig::merge(args, JobFile::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn defaults_to_atomic_strategy() {
        let config = RunConfig::merge(args(), JobFile::default()).unwrap();
        assert_eq!(config.strategy, WriteStrategy::Atomic);
        assert!(!config.recursive);
    }

    #[test]
    fn job_file_paths_resolve_against_its_directory() {
        let temp_dir = TempDir::new().unwrap();
        let job_path = temp_dir.path().join("job.yaml");
        fs::write(
            &job_path,
            "pattern_file: old.txt\nsubstitution_file: /abs/new.txt\ndir: docs\nextensions: [\".md\"]\nrecursive: true\nstrategy: in-place\n",
        )
        .unwrap();

        let args = Args { config: Some(job_path), ..Args::default() };
        let config = RunConfig::from_args(args).unwrap();

        assert_eq!(config.pattern_file, temp_dir.path().join("old.txt"));
        assert_eq!(config.substitution_file, PathBuf::from("/abs/new.txt"));
        assert_eq!(config.dir, Some(temp_dir.path().join("docs")));
        assert_eq!(config.extensions, vec![".md".to_string()]);
        assert!(config.recursive);
        assert_eq!(config.strategy, WriteStrategy::InPlace);
    }

    #[test]
    fn omitted_job_fields_default_to_none() {
        let temp_dir = TempDir::new().unwrap();
        let job_path = temp_dir.path().join("job.yaml");
        fs::write(&job_path, "dir: docs\n").unwrap();

        let job = ConfigLoader::load_job(&job_path).unwrap();

        assert_eq!(job.dir, Some(PathBuf::from("docs")));
        assert_eq!(job.extensions, None);
        assert_eq!(job.recursive, None);
        assert_eq!(job.strategy, None);
    }

    #[test]
    fn unknown_job_fields_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let job_path = temp_dir.path().join("job.yaml");
        fs::write(&job_path, "patern_file: typo.txt\n").unwrap();

        let err = ConfigLoader::load_job(&job_path).unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn missing_job_file_lists_searched_locations() {
        let err = ConfigLoader::find_config(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
