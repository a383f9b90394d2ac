// src/lib.rs
pub mod adapters;
pub mod cleanup;
pub mod command;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod status;
pub mod trimlog;
pub mod types;

use std::collections::BTreeMap;

use crate::adapters::{AdapterSource, DefaultAdaptersMerger};
use crate::cleanup::{Cleanup, CleanupSummary};
use crate::command::{CommandBuilder, ToolCommand};
use crate::config::TrimmomaticConfig;
use crate::error::TrimError;
use crate::report::ReportWriter;
use crate::runner::{SubprocessRunner, ToolRunner};
use crate::status::{probe_version, write_status, write_versions, Status, ToolVersion};
use crate::trimlog::parse_trim_log;
use crate::types::{RunResult, SampleContext, TrimStatistics};

/// Everything one trimming run produced, besides the files on disk.
#[derive(Debug, Clone)]
pub struct TrimmingOutcome {
    pub command: ToolCommand,
    pub run: RunResult,
    /// `None` when the tool failed before writing a trim log.
    pub statistics: Option<TrimStatistics>,
    pub cleanup: CleanupSummary,
    pub status: Status,
    pub version: ToolVersion,
}

/// Trim one paired-end sample.
///
/// Builds the command, runs it, turns the trim log into the CSV and JSON
/// reports, cleans the working directory and finally writes the status
/// sentinel. A malformed trim log aborts the run before cleanup, so no
/// sentinel is written in that case. A run stopped by the timeout or a
/// cancellation skips the reports and is recorded as a failure.
///
/// Relative input paths are taken relative to the configured working
/// directory, where the tool itself runs.
pub fn run_trimmomatic(
    ctx: &SampleContext,
    config: &TrimmomaticConfig,
    runner: &dyn ToolRunner,
    adapters: &dyn AdapterSource,
) -> Result<TrimmingOutcome, TrimError> {
    log::info!("Starting trimmomatic");
    log::debug!("SAMPLE_ID: {}", ctx.sample_id);
    log::debug!("FASTQ_PAIR: {:?}", ctx.fastq_pair);
    log::debug!("TRIM_RANGE: {:?}", ctx.trim_range);
    log::debug!("TRIM_OPTS: {:?}", ctx.trim_opts);
    log::debug!("PHRED: {:?}", ctx.phred);
    log::debug!("ADAPTERS_FILE: {:?}", ctx.adapters_file);
    log::debug!("CLEAR: {}", ctx.clear);

    let ctx = &ctx.resolved_against(&config.working_dir);

    // 1. Assemble the command
    let builder = CommandBuilder::new(config);
    let version = probe_version(runner, &builder.version());
    write_versions(config.artifact(&config.versions_file), std::slice::from_ref(&version))?;

    let command = builder.assemble(ctx, adapters)?;

    // 2. Run the tool
    let run = runner.run(&command)?;
    log::info!(
        "Finished trimmomatic subprocess with STDOUT:\n======================================\n{}",
        run.stdout
    );
    log::info!(
        "Finished trimmomatic subprocess with STDERR:\n======================================\n{}",
        run.stderr
    );
    log::info!("Finished trimmomatic with return code: {}", run.exit_code);
    if run.timed_out {
        log::warn!("Trimmomatic was stopped before it finished");
    }

    // 3. Parse the trim log and write reports
    let log_path = config.artifact(TrimmomaticConfig::trim_log_name(&ctx.sample_id));
    let statistics = if run.timed_out {
        // Killed mid-write: whatever the log holds is incomplete
        log::warn!(
            "Ignoring trim log {} of a stopped run; skipping reports",
            log_path.display()
        );
        None
    } else if !log_path.exists() && !run.success() {
        log::warn!(
            "No trim log at {} after a failed run; skipping reports",
            log_path.display()
        );
        None
    } else {
        let stats = parse_trim_log(&log_path)?;
        let mut samples = BTreeMap::new();
        samples.insert(ctx.sample_id.clone(), stats.clone());
        ReportWriter::from_config(config).write(&samples)?;
        Some(stats)
    };

    // 4. Clean up. Outputs of a stopped run may be partial, so inputs stay
    let cleanup = Cleanup::from_config(config)?.run(
        (ctx.fastq_pair.0.as_path(), ctx.fastq_pair.1.as_path()),
        ctx.clear && !run.timed_out,
    )?;

    // 5. Status sentinel
    let status = if run.timed_out {
        Status::Fail
    } else {
        Status::from_exit_code(run.exit_code)
    };
    write_status(config.artifact(&config.status_file), status)?;

    Ok(TrimmingOutcome {
        command,
        run,
        statistics,
        cleanup,
        status,
        version,
    })
}

/// [`run_trimmomatic`] with a real subprocess and the bundled adapters.
pub fn run_trimmomatic_default(
    ctx: &SampleContext,
    config: &TrimmomaticConfig,
) -> Result<TrimmingOutcome, TrimError> {
    let runner = SubprocessRunner::new().with_timeout(config.timeout);
    let adapters = DefaultAdaptersMerger::from_config(config);
    run_trimmomatic(ctx, config, &runner, &adapters)
}
