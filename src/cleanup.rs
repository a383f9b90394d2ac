//src/cleanup.rs

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::command::{PAIRED_SUFFIX, UNPAIRED_SUFFIX};
use crate::config::TrimmomaticConfig;
use crate::error::TrimError;

/// What a cleanup pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub unpaired_removed: Vec<PathBuf>,
    pub inputs_removed: Vec<PathBuf>,
}

/// Removes transient files once the tool has finished.
pub struct Cleanup {
    working_dir: PathBuf,
    scratch: Regex,
}

impl Cleanup {
    /// `scratch_root` is the directory name under which the engine stages
    /// inputs as `<root>/<2 chars>/<30 chars>/<file>`.
    pub fn new(working_dir: impl Into<PathBuf>, scratch_root: &str) -> Result<Self, TrimError> {
        let pattern = format!(r".*/{}/.{{2}}/.{{30}}/.*", regex::escape(scratch_root));
        let scratch = Regex::new(&pattern)
            .map_err(|e| TrimError::InvalidInput(format!("scratch pattern '{pattern}': {e}")))?;
        Ok(Self {
            working_dir: working_dir.into(),
            scratch,
        })
    }

    pub fn from_config(config: &TrimmomaticConfig) -> Result<Self, TrimError> {
        Self::new(config.working_dir.clone(), &config.scratch_root)
    }

    /// Whether `real_path` lives in a scratch area and may be deleted.
    pub fn is_scratch_path(&self, real_path: &Path) -> bool {
        self.scratch.is_match(&real_path.to_string_lossy())
    }

    fn files_with_suffix(&self, suffix: &str) -> Result<Vec<PathBuf>, TrimError> {
        let entries =
            fs::read_dir(&self.working_dir).map_err(|e| TrimError::io(&self.working_dir, e))?;
        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TrimError::io(&self.working_dir, e))?;
            if entry.file_name().to_string_lossy().ends_with(suffix) {
                found.push(entry.path());
            }
        }
        Ok(found)
    }

    /// Drop unpaired reads, then the original inputs when `clear` is set,
    /// exactly two paired outputs exist and each input resolves into scratch.
    pub fn run(&self, fastq_pair: (&Path, &Path), clear: bool) -> Result<CleanupSummary, TrimError> {
        let mut summary = CleanupSummary::default();

        for path in self.files_with_suffix(UNPAIRED_SUFFIX)? {
            fs::remove_file(&path).map_err(|e| TrimError::io(&path, e))?;
            log::debug!("Removed unpaired reads {}", path.display());
            summary.unpaired_removed.push(path);
        }

        if !clear {
            return Ok(summary);
        }

        let paired = self.files_with_suffix(PAIRED_SUFFIX)?;
        if paired.len() != 2 {
            log::debug!(
                "Keeping input fastq files: expected 2 paired outputs, found {}",
                paired.len()
            );
            return Ok(summary);
        }

        for fq in [fastq_pair.0, fastq_pair.1] {
            let real = match fs::canonicalize(fq) {
                Ok(real) => real,
                Err(e) => {
                    log::debug!("Cannot resolve {}: {e}", fq.display());
                    continue;
                }
            };
            if !self.is_scratch_path(&real) {
                log::debug!("Keeping {}: not in a scratch directory", real.display());
                continue;
            }
            log::debug!("Removing temporary fastq file path: {}", real.display());
            fs::remove_file(&real).map_err(|e| TrimError::io(&real, e))?;
            summary.inputs_removed.push(real);
        }

        Ok(summary)
    }
}
