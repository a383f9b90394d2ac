//src/trimlog.rs

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::TrimError;
use crate::types::TrimStatistics;

/// One trim log line reduced to the fields that matter.
///
/// Trimmomatic writes `<read name> <surviving length> <trimmed from start>
/// <last surviving base> <trimmed from end>`; the read name may contain spaces,
/// so fields are taken from the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimLogRecord {
    pub post_trim_length: u64,
    pub start_trim: u64,
    pub last_surviving_base: u64,
    pub end_trim: u64,
}

impl TrimLogRecord {
    pub fn parse(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(format!("expected at least 4 fields, found {}", fields.len()));
        }

        let mut numbers = [0u64; 4];
        for (slot, raw) in numbers.iter_mut().zip(&fields[fields.len() - 4..]) {
            *slot = raw
                .parse()
                .map_err(|_| format!("'{raw}' is not a non-negative integer"))?;
        }

        Ok(TrimLogRecord {
            post_trim_length: numbers[0],
            start_trim: numbers[1],
            last_surviving_base: numbers[2],
            end_trim: numbers[3],
        })
    }
}

/// Running totals over trim log records.
#[derive(Debug, Default)]
pub struct TrimLogAccumulator {
    stats: TrimStatistics,
}

impl TrimLogAccumulator {
    /// Fold one record in. Totals that would not fit in a `u64` (including
    /// the combined length before trimming) are rejected and leave the
    /// accumulator untouched.
    pub fn add(&mut self, record: &TrimLogRecord) -> Result<(), String> {
        let overflow = || String::from("trimmed base counts overflow");
        let five_prime = self.stats.five_prime_trim.checked_add(record.start_trim).ok_or_else(overflow)?;
        let three_prime = self.stats.three_prime_trim.checked_add(record.end_trim).ok_or_else(overflow)?;
        let total_trim = record
            .start_trim
            .checked_add(record.end_trim)
            .and_then(|t| self.stats.total_trim.checked_add(t))
            .ok_or_else(overflow)?;
        let clean_len = self.stats.clean_len.checked_add(record.post_trim_length).ok_or_else(overflow)?;
        clean_len.checked_add(total_trim).ok_or_else(overflow)?;

        if record.post_trim_length == 0 {
            self.stats.bad_reads += 1;
        }
        self.stats.five_prime_trim = five_prime;
        self.stats.three_prime_trim = three_prime;
        self.stats.total_trim = total_trim;
        self.stats.clean_len = clean_len;
        Ok(())
    }

    pub fn finish(mut self) -> TrimStatistics {
        let total_len = self.stats.total_len();
        self.stats.total_trim_perc = if total_len > 0 {
            round2(100.0 * self.stats.total_trim as f64 / total_len as f64)
        } else {
            0.0
        };
        self.stats
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fold every line of `reader` into statistics. `path` is only used for
/// error messages. Blank lines are skipped; anything else that does not end
/// in four integers is an error.
pub fn parse_trim_log_reader<R: BufRead>(reader: R, path: &Path) -> Result<TrimStatistics, TrimError> {
    let mut acc = TrimLogAccumulator::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| TrimError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let parse_error = |reason| TrimError::TrimLogParse {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
        };
        let record = TrimLogRecord::parse(&line).map_err(parse_error)?;
        acc.add(&record).map_err(parse_error)?;
    }
    Ok(acc.finish())
}

/// Parse a trim log file (plain or `.gz`) and remove it afterwards.
///
/// The log is only removed after a successful parse, so a malformed log is
/// left behind for inspection.
pub fn parse_trim_log<P: AsRef<Path>>(path: P) -> Result<TrimStatistics, TrimError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| TrimError::io(path, e))?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let stats = parse_trim_log_reader(reader, path)?;
    fs::remove_file(path).map_err(|e| TrimError::io(path, e))?;

    log::info!(
        "Parsed trim log {}: {} bp kept, {} bp trimmed ({}%), {} bad reads",
        path.display(),
        stats.clean_len,
        stats.total_trim,
        stats.total_trim_perc,
        stats.bad_reads
    );
    Ok(stats)
}
