//src/config.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Location of the jar inside the workflow container image.
pub const DEFAULT_TRIMMOMATIC_JAR: &str = "/NGStools/Trimmomatic-0.36/trimmomatic.jar";
/// Adapter fasta files bundled with the jar.
pub const DEFAULT_ADAPTERS_DIR: &str = "/NGStools/Trimmomatic-0.36/adapters";

/// Where the tool lives, what resources it gets and where artifacts go.
///
/// Nothing in the crate reaches for a fixed path on its own; everything is
/// read from here so tests can point it at a temporary directory.
#[derive(Debug, Clone)]
pub struct TrimmomaticConfig {
    pub java_bin: String,
    pub jar_path: PathBuf,
    pub adapters_dir: PathBuf,
    /// Directory the tool runs in and where every artifact is written.
    pub working_dir: PathBuf,
    /// Memory limit as the engine reports it, e.g. `"4 GB"`.
    pub memory: String,
    pub cpus: u32,
    /// Upper bound on the tool's wall time. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Directory name under which scratch inputs may be deleted.
    pub scratch_root: String,

    pub report_csv: String,
    pub report_json: String,
    pub status_file: String,
    pub versions_file: String,
    pub merged_adapters: String,
}

impl Default for TrimmomaticConfig {
    fn default() -> Self {
        Self {
            java_bin: String::from("java"),
            jar_path: PathBuf::from(DEFAULT_TRIMMOMATIC_JAR),
            adapters_dir: PathBuf::from(DEFAULT_ADAPTERS_DIR),
            working_dir: PathBuf::from("."),
            memory: String::from("4 GB"),
            cpus: 1,
            timeout: None,
            scratch_root: String::from("work"),
            report_csv: String::from("trimmomatic_report.csv"),
            report_json: String::from(".report.json"),
            status_file: String::from(".status"),
            versions_file: String::from(".versions"),
            merged_adapters: String::from("default_adapters.fasta"),
        }
    }
}

impl TrimmomaticConfig {
    pub fn with_java_bin(mut self, java_bin: impl Into<String>) -> Self {
        self.java_bin = java_bin.into();
        self
    }

    pub fn with_jar_path(mut self, jar_path: impl Into<PathBuf>) -> Self {
        self.jar_path = jar_path.into();
        self
    }

    pub fn with_adapters_dir(mut self, adapters_dir: impl Into<PathBuf>) -> Self {
        self.adapters_dir = adapters_dir.into();
        self
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = working_dir.into();
        self
    }

    pub fn with_memory(mut self, memory: impl Into<String>) -> Self {
        self.memory = memory.into();
        self
    }

    pub fn with_cpus(mut self, cpus: u32) -> Self {
        self.cpus = cpus;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_scratch_root(mut self, scratch_root: impl Into<String>) -> Self {
        self.scratch_root = scratch_root.into();
        self
    }

    /// Resolve an artifact name against the working directory.
    pub fn artifact(&self, name: impl AsRef<Path>) -> PathBuf {
        self.working_dir.join(name)
    }

    /// Per-sample trim log, as named on the tool's command line.
    pub fn trim_log_name(sample_id: &str) -> String {
        format!("{sample_id}_trimlog.txt")
    }
}
