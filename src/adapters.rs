//src/adapters.rs

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::config::TrimmomaticConfig;
use crate::error::TrimError;

/// Supplies an adapters file when the sample did not bring a usable one.
pub trait AdapterSource {
    fn merged_adapters(&self) -> Result<PathBuf, TrimError>;
}

/// Concatenates every adapter fasta bundled with the tool into one file.
///
/// The output is rewritten on every call, so two runs sharing a working
/// directory would clobber each other.
#[derive(Debug, Clone)]
pub struct DefaultAdaptersMerger {
    adapters_dir: PathBuf,
    output: PathBuf,
}

impl DefaultAdaptersMerger {
    pub fn new(adapters_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            adapters_dir: adapters_dir.into(),
            output: output.into(),
        }
    }

    pub fn from_config(config: &TrimmomaticConfig) -> Self {
        Self::new(
            config.adapters_dir.clone(),
            config.artifact(&config.merged_adapters),
        )
    }
}

impl AdapterSource for DefaultAdaptersMerger {
    fn merged_adapters(&self) -> Result<PathBuf, TrimError> {
        let entries =
            fs::read_dir(&self.adapters_dir).map_err(|e| TrimError::io(&self.adapters_dir, e))?;

        let out = File::create(&self.output).map_err(|e| TrimError::io(&self.output, e))?;
        let mut writer = BufWriter::new(out);

        // Directory order, same as the listing the tool itself would see
        for entry in entries {
            let path = entry.map_err(|e| TrimError::io(&self.adapters_dir, e))?.path();
            if !path.is_file() {
                continue;
            }
            let mut input = File::open(&path).map_err(|e| TrimError::io(&path, e))?;
            io::copy(&mut input, &mut writer).map_err(|e| TrimError::io(&self.output, e))?;
        }
        writer.flush().map_err(|e| TrimError::io(&self.output, e))?;

        log::debug!(
            "Merged default adapters from {} into {}",
            self.adapters_dir.display(),
            self.output.display()
        );
        Ok(self.output.clone())
    }
}
