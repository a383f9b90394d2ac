//src/command.rs

use std::path::{Path, PathBuf};

use crate::adapters::AdapterSource;
use crate::config::TrimmomaticConfig;
use crate::error::TrimError;
use crate::types::{SampleContext, TrimRange};

/// Suffix of the reads that kept their mate.
pub const PAIRED_SUFFIX: &str = "_trim.fastq.gz";
/// Suffix of the reads whose mate was dropped.
pub const UNPAIRED_SUFFIX: &str = "_U.fastq.gz";

/// Fixed ILLUMINACLIP settings: seed mismatches, palindrome clip threshold,
/// simple clip threshold, minimum adapter length, keep both reads.
const ILLUMINACLIP_SETTINGS: &str = "3:30:10:6:true";

/// A fully assembled invocation of an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ToolCommand {
    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

pub fn paired_output_name(sample_id: &str, index: usize) -> String {
    format!("{sample_id}_{index}{PAIRED_SUFFIX}")
}

pub fn unpaired_output_name(sample_id: &str, index: usize) -> String {
    format!("{sample_id}_{index}{UNPAIRED_SUFFIX}")
}

/// JVM heap flag value: `"4 GB"` becomes `4g`.
pub fn heap_size(memory: &str) -> String {
    let mut trimmed = memory.to_string();
    trimmed.pop();
    trimmed
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Assembles Trimmomatic command lines from a [`TrimmomaticConfig`].
pub struct CommandBuilder<'a> {
    config: &'a TrimmomaticConfig,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(config: &'a TrimmomaticConfig) -> Self {
        Self { config }
    }

    /// `-Xmx.. -jar <jar>`
    fn java_args(&self) -> Vec<String> {
        vec![
            format!("-Xmx{}", heap_size(&self.config.memory)),
            String::from("-jar"),
            self.config.jar_path.to_string_lossy().trim().to_string(),
        ]
    }

    /// Pick the sample's adapters file when it exists, else fall back to the
    /// merged bundle from `source`.
    pub fn resolve_adapters(
        &self,
        adapters_file: Option<&Path>,
        source: &dyn AdapterSource,
    ) -> Result<PathBuf, TrimError> {
        match adapters_file {
            Some(path) if path.exists() => {
                log::debug!("Using the provided adapters file '{}'", path.display());
                Ok(path.to_path_buf())
            }
            other => {
                log::debug!(
                    "Adapters file '{}' not provided or does not exist. Using default adapters",
                    other.map(|p| p.display().to_string()).unwrap_or_default()
                );
                source.merged_adapters()
            }
        }
    }

    /// Build the paired-end trimming command for `ctx` using `adapters` for
    /// ILLUMINACLIP. Identical inputs always give identical output.
    pub fn build(&self, ctx: &SampleContext, adapters: &Path) -> ToolCommand {
        let mut args = self.java_args();
        args.push(String::from("PE"));
        args.push(String::from("-threads"));
        args.push(self.config.cpus.to_string());

        if let Some(phred) = ctx.phred {
            args.push(format!("-phred{phred}"));
        }

        let (first, second) = &ctx.fastq_pair;
        args.push(first.to_string_lossy().into_owned());
        args.push(second.to_string_lossy().into_owned());

        for index in 1..=2 {
            args.push(paired_output_name(&ctx.sample_id, index));
            args.push(unpaired_output_name(&ctx.sample_id, index));
        }

        // CROP takes the length to keep, HEADCROP the bases dropped up front
        if let TrimRange::Crop { head, end } = ctx.trim_range {
            args.push(format!("CROP:{end}"));
            args.push(format!("HEADCROP:{head}"));
        }

        args.push(format!(
            "ILLUMINACLIP:{}:{ILLUMINACLIP_SETTINGS}",
            adapters.display()
        ));

        let opts = &ctx.trim_opts;
        args.push(format!("SLIDINGWINDOW:{}", opts.sliding_window));
        args.push(format!("LEADING:{}", opts.leading));
        args.push(format!("TRAILING:{}", opts.trailing));
        args.push(format!("MINLEN:{}", opts.min_length));
        args.push(String::from("TOPHRED33"));
        args.push(String::from("-trimlog"));
        args.push(TrimmomaticConfig::trim_log_name(&ctx.sample_id));

        ToolCommand {
            program: self.config.java_bin.clone(),
            args,
            cwd: self.config.working_dir.clone(),
        }
    }

    /// Resolve adapters and build the command in one go.
    pub fn assemble(
        &self,
        ctx: &SampleContext,
        source: &dyn AdapterSource,
    ) -> Result<ToolCommand, TrimError> {
        let adapters = self.resolve_adapters(ctx.adapters_file.as_deref(), source)?;
        Ok(self.build(ctx, &adapters))
    }

    /// `java -jar <jar> -version`
    pub fn version(&self) -> ToolCommand {
        ToolCommand {
            program: self.config.java_bin.clone(),
            args: vec![
                String::from("-jar"),
                self.config.jar_path.to_string_lossy().trim().to_string(),
                String::from("-version"),
            ],
            cwd: self.config.working_dir.clone(),
        }
    }
}
