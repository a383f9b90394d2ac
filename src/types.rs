//src/types.rs

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::TrimError;

/// Fixed-position cropping requested for a sample.
///
/// The workflow engine hands this over as `"15 151"` (head crop, then the
/// length to crop to) or as the literal `"None"` when no range was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimRange {
    NoCrop,
    Crop { head: u32, end: u32 },
}

impl FromStr for TrimRange {
    type Err = TrimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        match fields.as_slice() {
            [] | ["None"] => Ok(TrimRange::NoCrop),
            [head, end] => {
                let head = head.parse().map_err(|_| {
                    TrimError::InvalidInput(format!("trim range start '{head}' is not an integer"))
                })?;
                let end = end.parse().map_err(|_| {
                    TrimError::InvalidInput(format!("trim range end '{end}' is not an integer"))
                })?;
                Ok(TrimRange::Crop { head, end })
            }
            _ => Err(TrimError::InvalidInput(format!(
                "trim range must be two integers or 'None', got '{s}'"
            ))),
        }
    }
}

/// The four quality-trimming settings passed straight through to the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimOptions {
    /// Window size and required quality, e.g. `5:20`
    pub sliding_window: String,
    pub leading: u32,
    pub trailing: u32,
    pub min_length: u32,
}

impl FromStr for TrimOptions {
    type Err = TrimError;

    /// Accepts the engine's list rendering: `[5:20, 3, 3, 55]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .map(str::trim)
            .collect();

        if fields.len() != 4 {
            return Err(TrimError::InvalidInput(format!(
                "expected 4 trimming options, got {} in '{s}'",
                fields.len()
            )));
        }

        let int_field = |name: &str, value: &str| -> Result<u32, TrimError> {
            value.parse().map_err(|_| {
                TrimError::InvalidInput(format!("{name} option '{value}' is not an integer"))
            })
        };

        Ok(TrimOptions {
            sliding_window: fields[0].to_string(),
            leading: int_field("leading", fields[1])?,
            trailing: int_field("trailing", fields[2])?,
            min_length: int_field("min length", fields[3])?,
        })
    }
}

/// Reads a phred hint such as `"33"`. Anything non-numeric (the engine sends
/// `"NA"` when detection failed) yields `None` and the tool guesses itself.
pub fn parse_phred(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

/// Only the exact string `"true"` enables removal of the input files.
pub fn parse_clear_flag(value: &str) -> bool {
    value == "true"
}

/// Everything known about the sample being trimmed.
#[derive(Debug, Clone)]
pub struct SampleContext {
    pub sample_id: String,
    pub fastq_pair: (PathBuf, PathBuf),
    pub trim_range: TrimRange,
    pub trim_opts: TrimOptions,
    pub phred: Option<u32>,
    pub adapters_file: Option<PathBuf>,
    pub clear: bool,
}

impl SampleContext {
    /// Anchor relative input paths at `dir`, the directory the tool runs in,
    /// so existence checks and cleanup look at the files the tool reads.
    pub fn resolved_against(&self, dir: &Path) -> SampleContext {
        let anchor = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            }
        };
        SampleContext {
            fastq_pair: (anchor(&self.fastq_pair.0), anchor(&self.fastq_pair.1)),
            adapters_file: self.adapters_file.as_deref().map(anchor),
            ..self.clone()
        }
    }
}

/// Aggregate statistics derived from one trim log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrimStatistics {
    /// Total length after trimming
    pub clean_len: u64,
    /// Total trimmed base pairs
    pub total_trim: u64,
    /// `total_trim` as a percentage of the original length, two decimals
    pub total_trim_perc: f64,
    pub five_prime_trim: u64,
    pub three_prime_trim: u64,
    /// Reads trimmed down to nothing
    pub bad_reads: u64,
}

impl TrimStatistics {
    /// Length of all reads before trimming.
    pub fn total_len(&self) -> u64 {
        self.clean_len + self.total_trim
    }
}

/// What came back from one execution of the external tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Set when the run was stopped by the timeout or a cancellation request.
    pub timed_out: bool,
}

impl RunResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}
