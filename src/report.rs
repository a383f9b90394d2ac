//src/report.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::TrimmomaticConfig;
use crate::error::TrimError;
use crate::types::TrimStatistics;

/// CSV header; the order of [`csv_row`] follows it.
pub const CSV_HEADER: [&str; 7] = [
    "Sample",
    "Total length",
    "Total trimmed",
    "%",
    "5end Trim",
    "3end Trim",
    "bad_reads",
];

/// Percentages always carry a decimal point (`10.0`, `9.09`), except the
/// plain `0` written for a log with no bases at all.
fn format_percentage(stats: &TrimStatistics) -> String {
    if stats.total_len() == 0 {
        String::from("0")
    } else {
        format!("{:?}", stats.total_trim_perc)
    }
}

fn csv_row(sample: &str, stats: &TrimStatistics) -> [String; 7] {
    [
        sample.to_string(),
        stats.clean_len.to_string(),
        stats.total_trim.to_string(),
        format_percentage(stats),
        stats.five_prime_trim.to_string(),
        stats.three_prime_trim.to_string(),
        stats.bad_reads.to_string(),
    ]
}

// JSON sidecar consumed by the workflow report. Key spelling is fixed.

#[derive(Debug, Serialize)]
struct TableCell {
    header: &'static str,
    value: f64,
    table: &'static str,
    #[serde(rename = "columnBar")]
    column_bar: bool,
}

#[derive(Debug, Serialize)]
struct TableRow<'a> {
    sample: &'a str,
    data: Vec<TableCell>,
}

#[derive(Debug, Serialize)]
struct Sparkline {
    sparkline: u64,
}

#[derive(Debug, Serialize)]
struct PlotData<'a> {
    sample: &'a str,
    data: Sparkline,
}

#[derive(Debug, Serialize)]
struct SampleSummary<'a> {
    #[serde(rename = "tableRow")]
    table_row: Vec<TableRow<'a>>,
    #[serde(rename = "plotData")]
    plot_data: Vec<PlotData<'a>>,
    #[serde(rename = "badReads")]
    bad_reads: u64,
}

impl<'a> SampleSummary<'a> {
    fn new(sample: &'a str, stats: &TrimStatistics) -> Self {
        SampleSummary {
            table_row: vec![TableRow {
                sample,
                data: vec![TableCell {
                    header: "trimmed",
                    value: stats.total_trim_perc,
                    table: "qc",
                    column_bar: true,
                }],
            }],
            plot_data: vec![PlotData {
                sample,
                data: Sparkline {
                    sparkline: stats.clean_len,
                },
            }],
            bad_reads: stats.bad_reads,
        }
    }
}

/// Compact JSON summary for one sample.
pub fn sample_summary_json(sample: &str, stats: &TrimStatistics) -> Result<String, TrimError> {
    Ok(serde_json::to_string(&SampleSummary::new(sample, stats))?)
}

/// Writes the CSV table and the JSON sidecar.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    csv_path: PathBuf,
    json_path: PathBuf,
}

impl ReportWriter {
    pub fn new(csv_path: impl Into<PathBuf>, json_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            json_path: json_path.into(),
        }
    }

    pub fn from_config(config: &TrimmomaticConfig) -> Self {
        Self::new(
            config.artifact(&config.report_csv),
            config.artifact(&config.report_json),
        )
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }

    pub fn json_path(&self) -> &PathBuf {
        &self.json_path
    }

    /// One CSV row and one JSON object per sample, in key order.
    pub fn write(&self, samples: &BTreeMap<String, TrimStatistics>) -> Result<(), TrimError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&self.csv_path)?;
        writer.write_record(CSV_HEADER)?;
        for (sample, stats) in samples {
            writer.write_record(csv_row(sample, stats))?;
        }
        writer
            .flush()
            .map_err(|e| TrimError::io(&self.csv_path, e))?;

        let summaries = samples
            .iter()
            .map(|(sample, stats)| sample_summary_json(sample, stats))
            .collect::<Result<Vec<_>, _>>()?;
        fs::write(&self.json_path, summaries.join("\n"))
            .map_err(|e| TrimError::io(&self.json_path, e))?;

        log::debug!(
            "Wrote reports {} and {}",
            self.csv_path.display(),
            self.json_path.display()
        );
        Ok(())
    }
}
