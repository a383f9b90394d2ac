use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::{tempdir, TempDir};

use trimmomatic_rs::adapters::DefaultAdaptersMerger;
use trimmomatic_rs::command::ToolCommand;
use trimmomatic_rs::config::TrimmomaticConfig;
use trimmomatic_rs::error::TrimError;
use trimmomatic_rs::runner::ToolRunner;
use trimmomatic_rs::run_trimmomatic;
use trimmomatic_rs::status::Status;
use trimmomatic_rs::types::{RunResult, SampleContext, TrimOptions, TrimRange};

/// Stands in for Trimmomatic: writes whatever the test asks for into the
/// command's working directory and returns a canned exit code.
struct FakeTrimmomatic {
    exit_code: i32,
    timed_out: bool,
    trim_log: Option<&'static str>,
    outputs: Vec<&'static str>,
    seen: Mutex<Vec<ToolCommand>>,
}

impl FakeTrimmomatic {
    fn new(exit_code: i32, trim_log: Option<&'static str>) -> Self {
        Self {
            exit_code,
            timed_out: false,
            trim_log,
            outputs: vec![
                "S1_1_trim.fastq.gz",
                "S1_1_U.fastq.gz",
                "S1_2_trim.fastq.gz",
                "S1_2_U.fastq.gz",
            ],
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Killed by the timeout after writing `trim_log`.
    fn stopped(trim_log: &'static str) -> Self {
        Self {
            timed_out: true,
            ..Self::new(-1, Some(trim_log))
        }
    }

    fn trimming_command(&self) -> ToolCommand {
        self.seen
            .lock()
            .iter()
            .find(|c| c.args.iter().any(|a| a == "-trimlog"))
            .cloned()
            .expect("trimming command was run")
    }
}

impl ToolRunner for FakeTrimmomatic {
    fn run(&self, command: &ToolCommand) -> Result<RunResult, TrimError> {
        self.seen.lock().push(command.clone());

        if command.args.iter().any(|a| a == "-version") {
            return Ok(RunResult {
                stdout: String::from("0.36\n"),
                ..Default::default()
            });
        }

        let log_pos = command.args.iter().position(|a| a == "-trimlog").unwrap();
        if let Some(text) = self.trim_log {
            fs::write(command.cwd.join(&command.args[log_pos + 1]), text).unwrap();
        }
        for name in &self.outputs {
            fs::write(command.cwd.join(name), b"reads").unwrap();
        }
        Ok(RunResult {
            exit_code: self.exit_code,
            stdout: String::new(),
            stderr: String::from("TrimmomaticPE: Completed"),
            timed_out: self.timed_out,
        })
    }
}

struct Workspace {
    _root: TempDir,
    work: PathBuf,
    bundle: PathBuf,
}

fn workspace() -> Workspace {
    let root = tempdir().unwrap();
    let work = root
        .path()
        .join("work")
        .join("3f")
        .join("a9c1e2b4d5f60718293a4b5c6d7e8f");
    fs::create_dir_all(&work).unwrap();
    fs::write(work.join("S1_1.fastq.gz"), b"r1").unwrap();
    fs::write(work.join("S1_2.fastq.gz"), b"r2").unwrap();

    let bundle = root.path().join("adapters");
    fs::create_dir_all(&bundle).unwrap();
    fs::write(bundle.join("TruSeq3-PE.fa"), ">PrefixPE/1\nTACACTCTTTCCCTACACGACGCTCTTCCGATCT\n").unwrap();

    Workspace {
        _root: root,
        work,
        bundle,
    }
}

fn config(ws: &Workspace) -> TrimmomaticConfig {
    TrimmomaticConfig::default()
        .with_working_dir(&ws.work)
        .with_adapters_dir(&ws.bundle)
        .with_memory("2 GB")
        .with_cpus(2)
}

fn sample(work: &Path, clear: bool) -> SampleContext {
    SampleContext {
        sample_id: String::from("S1"),
        fastq_pair: (work.join("S1_1.fastq.gz"), work.join("S1_2.fastq.gz")),
        trim_range: TrimRange::Crop { head: 15, end: 151 },
        trim_opts: "[5:20, 3, 3, 55]".parse::<TrimOptions>().unwrap(),
        phred: Some(33),
        adapters_file: None,
        clear,
    }
}

const GOOD_LOG: &str = "read1/1 100 0 100 0\nread2/1 0 10 0 0\n";

#[test]
fn successful_run_writes_every_artifact() {
    let ws = workspace();
    let cfg = config(&ws);
    let runner = FakeTrimmomatic::new(0, Some(GOOD_LOG));
    let adapters = DefaultAdaptersMerger::from_config(&cfg);

    let outcome = run_trimmomatic(&sample(&ws.work, true), &cfg, &runner, &adapters).unwrap();

    assert_eq!(outcome.status, Status::Pass);
    assert_eq!(fs::read_to_string(ws.work.join(".status")).unwrap(), "pass");

    let stats = outcome.statistics.unwrap();
    assert_eq!(stats.clean_len, 100);
    assert_eq!(stats.total_trim_perc, 9.09);
    assert!(!ws.work.join("S1_trimlog.txt").exists());

    let csv = fs::read_to_string(ws.work.join("trimmomatic_report.csv")).unwrap();
    assert!(csv.ends_with("S1,100,10,9.09,10,0,1\n"));
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(ws.work.join(".report.json")).unwrap()).unwrap();
    assert_eq!(json["plotData"][0]["data"]["sparkline"], 100);
    assert_eq!(json["badReads"], 1);

    assert_eq!(
        fs::read_to_string(ws.work.join(".versions")).unwrap(),
        r#"[{"program":"Trimmomatic","version":"0.36"}]"#
    );

    // unpaired outputs and scratch inputs are gone, paired outputs stay
    assert!(!ws.work.join("S1_1_U.fastq.gz").exists());
    assert!(ws.work.join("S1_1_trim.fastq.gz").exists());
    assert!(!ws.work.join("S1_1.fastq.gz").exists());
    assert!(!ws.work.join("S1_2.fastq.gz").exists());
    assert_eq!(outcome.cleanup.inputs_removed.len(), 2);
}

#[test]
fn missing_adapters_fall_back_to_merged_bundle() {
    let ws = workspace();
    let cfg = config(&ws);
    let runner = FakeTrimmomatic::new(0, Some(GOOD_LOG));
    let adapters = DefaultAdaptersMerger::from_config(&cfg);
    let mut ctx = sample(&ws.work, false);
    ctx.adapters_file = Some(ws.work.join("no_such_adapters.fa"));

    run_trimmomatic(&ctx, &cfg, &runner, &adapters).unwrap();

    let merged = ws.work.join("default_adapters.fasta");
    assert!(merged.exists());
    let clip = format!("ILLUMINACLIP:{}:3:30:10:6:true", merged.display());
    assert!(runner.trimming_command().args.contains(&clip));
}

#[test]
fn failed_tool_still_reports_from_its_log() {
    let ws = workspace();
    let cfg = config(&ws);
    let runner = FakeTrimmomatic::new(2, Some(GOOD_LOG));
    let adapters = DefaultAdaptersMerger::from_config(&cfg);

    let outcome = run_trimmomatic(&sample(&ws.work, true), &cfg, &runner, &adapters).unwrap();

    assert_eq!(outcome.status, Status::Fail);
    assert_eq!(fs::read_to_string(ws.work.join(".status")).unwrap(), "fail");
    assert!(ws.work.join("trimmomatic_report.csv").exists());
    assert!(ws.work.join(".report.json").exists());
    assert_eq!(outcome.run.stderr, "TrimmomaticPE: Completed");
}

#[test]
fn failed_tool_without_log_skips_reports() {
    let ws = workspace();
    let cfg = config(&ws);
    let runner = FakeTrimmomatic::new(1, None);
    let adapters = DefaultAdaptersMerger::from_config(&cfg);

    let outcome = run_trimmomatic(&sample(&ws.work, false), &cfg, &runner, &adapters).unwrap();

    assert!(outcome.statistics.is_none());
    assert!(!ws.work.join("trimmomatic_report.csv").exists());
    assert_eq!(fs::read_to_string(ws.work.join(".status")).unwrap(), "fail");
}

#[test]
fn malformed_log_aborts_before_cleanup_and_status() {
    let ws = workspace();
    let cfg = config(&ws);
    let runner = FakeTrimmomatic::new(0, Some("read1/1 100 0 100 0\nread2/1 truncated\n"));
    let adapters = DefaultAdaptersMerger::from_config(&cfg);

    let err = run_trimmomatic(&sample(&ws.work, true), &cfg, &runner, &adapters).unwrap_err();

    assert!(matches!(err, TrimError::TrimLogParse { line: 2, .. }));
    assert!(!ws.work.join(".status").exists());
    assert!(!ws.work.join("trimmomatic_report.csv").exists());
    assert!(ws.work.join("S1_1_U.fastq.gz").exists());
    assert!(ws.work.join("S1_1.fastq.gz").exists());
}

#[test]
fn unparseable_phred_runs_without_flag() {
    let ws = workspace();
    let cfg = config(&ws);
    let runner = FakeTrimmomatic::new(0, Some(GOOD_LOG));
    let adapters = DefaultAdaptersMerger::from_config(&cfg);
    let mut ctx = sample(&ws.work, false);
    ctx.phred = trimmomatic_rs::types::parse_phred("NA");
    ctx.trim_range = TrimRange::NoCrop;

    let outcome = run_trimmomatic(&ctx, &cfg, &runner, &adapters).unwrap();

    let args = &outcome.command.args;
    assert!(!args.iter().any(|a| a.starts_with("-phred")));
    assert!(!args.iter().any(|a| a.starts_with("CROP:") || a.starts_with("HEADCROP:")));
    assert_eq!(args[0], "-Xmx2g");
    // inputs kept because clear was not requested
    assert!(ws.work.join("S1_1.fastq.gz").exists());
}

#[test]
fn stopped_run_skips_truncated_log_and_fails() {
    let ws = workspace();
    let cfg = config(&ws);
    let runner = FakeTrimmomatic::stopped("r1 100 0 100 0\nr2 10");
    let adapters = DefaultAdaptersMerger::from_config(&cfg);

    let outcome = run_trimmomatic(&sample(&ws.work, true), &cfg, &runner, &adapters).unwrap();

    assert_eq!(outcome.status, Status::Fail);
    assert!(outcome.statistics.is_none());
    assert_eq!(fs::read_to_string(ws.work.join(".status")).unwrap(), "fail");
    assert!(!ws.work.join("trimmomatic_report.csv").exists());
    assert!(!ws.work.join(".report.json").exists());
    // partial outputs never justify removing the inputs
    assert!(outcome.cleanup.inputs_removed.is_empty());
    assert!(ws.work.join("S1_1.fastq.gz").exists());
    assert!(ws.work.join("S1_2.fastq.gz").exists());
}

#[test]
fn relative_inputs_resolve_against_working_dir() {
    let ws = workspace();
    let cfg = config(&ws);
    let runner = FakeTrimmomatic::new(0, Some(GOOD_LOG));
    let adapters = DefaultAdaptersMerger::from_config(&cfg);
    fs::write(ws.work.join("custom_adapters.fa"), ">a\nACGT\n").unwrap();

    let mut ctx = sample(&ws.work, true);
    ctx.fastq_pair = (PathBuf::from("S1_1.fastq.gz"), PathBuf::from("S1_2.fastq.gz"));
    ctx.adapters_file = Some(PathBuf::from("custom_adapters.fa"));

    let outcome = run_trimmomatic(&ctx, &cfg, &runner, &adapters).unwrap();

    // the provided adapters were found, so the bundle was never merged
    assert!(!ws.work.join("default_adapters.fasta").exists());
    let clip = format!(
        "ILLUMINACLIP:{}:3:30:10:6:true",
        ws.work.join("custom_adapters.fa").display()
    );
    assert!(outcome.command.args.contains(&clip));

    assert_eq!(outcome.cleanup.inputs_removed.len(), 2);
    assert!(!ws.work.join("S1_1.fastq.gz").exists());
    assert!(!ws.work.join("S1_2.fastq.gz").exists());
}
