use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use trimmomatic_rs::config::{TrimmomaticConfig, DEFAULT_ADAPTERS_DIR, DEFAULT_TRIMMOMATIC_JAR};
use trimmomatic_rs::run_trimmomatic_default;
use trimmomatic_rs::types::{parse_clear_flag, parse_phred, SampleContext, TrimOptions, TrimRange};

#[derive(Parser)]
#[command(name = "trimmomatic-rs")]
#[command(about = "Run Trimmomatic on one paired-end sample and report trimming statistics", long_about = None)]
#[command(version)]
struct Cli {
    /// Sample identifier, used to name every output
    #[arg(long, value_name = "ID")]
    sample_id: String,

    /// The two paired FastQ files
    #[arg(long, value_name = "FASTQ", num_args = 2, required = true)]
    fastq_pair: Vec<PathBuf>,

    /// Crop range as "HEAD END", or "None"
    #[arg(long, value_name = "RANGE", default_value = "None")]
    trim_range: String,

    /// [SLIDINGWINDOW, LEADING, TRAILING, MINLEN]
    #[arg(long, value_name = "LIST", default_value = "[5:20, 3, 3, 55]")]
    opts: String,

    /// Phred encoding hint; anything non-numeric lets the tool guess
    #[arg(long, value_name = "PHRED", default_value = "NA")]
    phred: String,

    /// Adapters fasta. Falls back to the bundled adapters when missing
    #[arg(long, value_name = "FILE")]
    adapters: Option<PathBuf>,

    /// Remove the input files afterwards when exactly "true"
    #[arg(long, value_name = "FLAG", default_value = "false")]
    clear: String,

    #[arg(long, value_name = "JAR", env = "TRIMMOMATIC_JAR", default_value = DEFAULT_TRIMMOMATIC_JAR)]
    jar: PathBuf,

    #[arg(long, value_name = "DIR", env = "TRIMMOMATIC_ADAPTERS", default_value = DEFAULT_ADAPTERS_DIR)]
    adapters_dir: PathBuf,

    #[arg(long, value_name = "BIN", default_value = "java")]
    java: String,

    /// Memory limit, e.g. "4 GB"
    #[arg(long, value_name = "MEM", default_value = "4 GB")]
    memory: String,

    #[arg(short = 't', long, value_name = "INT", default_value = "1")]
    cpus: u32,

    /// Kill the tool after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    #[arg(long, value_name = "DIR", default_value = ".")]
    working_dir: PathBuf,

    /// Verbosity: 1=error, 2=warning, 3=info, 4=debug, 5+=trace
    #[arg(short = 'v', long, value_name = "INT", default_value = "3")]
    verbosity: u8,
}

fn spinner(colour: &str, msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let template = format!("{{spinner:.{colour}}} {{msg}}");
    if let Ok(style) = ProgressStyle::default_spinner().template(&template) {
        spinner.set_style(style.tick_strings(&[
            "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
        ]));
    }
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbosity {
        v if v <= 1 => log::LevelFilter::Error,
        2 => log::LevelFilter::Warn,
        3 => log::LevelFilter::Info,
        4 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let trim_range: TrimRange = match cli.trim_range.parse() {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    let trim_opts: TrimOptions = match cli.opts.parse() {
        Ok(o) => o,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let ctx = SampleContext {
        sample_id: cli.sample_id,
        fastq_pair: (cli.fastq_pair[0].clone(), cli.fastq_pair[1].clone()),
        trim_range,
        trim_opts,
        phred: parse_phred(&cli.phred),
        adapters_file: cli.adapters,
        clear: parse_clear_flag(&cli.clear),
    };

    let config = TrimmomaticConfig::default()
        .with_java_bin(cli.java)
        .with_jar_path(cli.jar)
        .with_adapters_dir(cli.adapters_dir)
        .with_working_dir(cli.working_dir)
        .with_memory(cli.memory)
        .with_cpus(cli.cpus)
        .with_timeout(cli.timeout.map(Duration::from_secs));

    let progress = spinner("green", "Trimming reads...");
    match run_trimmomatic_default(&ctx, &config) {
        Ok(outcome) => {
            progress.finish_with_message(format!("Trimming finished: {}", outcome.status));
            if let Some(stats) = outcome.statistics {
                log::info!(
                    "{}: {}% trimmed, {} bad reads",
                    ctx.sample_id,
                    stats.total_trim_perc,
                    stats.bad_reads
                );
            }
        }
        Err(e) => {
            progress.abandon_with_message("Trimming aborted");
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}
