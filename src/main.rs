use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use stream_etl::mockgen::generate_mock_data;
use stream_etl::{run, DestinationKind, DigestAlgorithm, PipelineConfig, RowPolicy};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Stream a CSV file through a blocklist filter into a destination.
#[derive(Parser, Debug)]
#[command(name = "stream-etl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the ingest → filter → write pipeline
    Run(RunArgs),

    /// Generate a mock input file (header id,name,status)
    Generate {
        /// Where to write the mock CSV
        #[arg(long, default_value = "data/raw_data.csv")]
        output: PathBuf,

        /// Number of data rows
        #[arg(long, default_value_t = 1_000_000)]
        rows: usize,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input CSV file (first line is the header)
    #[arg(long, env = "ETL_INPUT", default_value = "data/raw_data.csv")]
    input: PathBuf,

    /// Newline-delimited ids to drop; a missing file blocks nothing
    #[arg(long, env = "ETL_BLOCKLIST", default_value = "data/blocked_ids.txt")]
    blocklist: PathBuf,

    /// Output file for the file destination (overwritten each run)
    #[arg(long, env = "ETL_OUTPUT", default_value = "data/output.csv")]
    output: PathBuf,

    /// Keep every Nth data row
    #[arg(long, env = "ETL_STRIDE", default_value_t = 1)]
    stride: usize,

    /// Destination: file, console or cloud
    #[arg(long, env = "ETL_DESTINATION", default_value = "file")]
    destination: DestinationKind,

    /// Provider name reported by the cloud destination
    #[arg(long, env = "ETL_CLOUD_PROVIDER", default_value = "aws")]
    cloud_provider: String,

    /// Fail on rows whose field count differs from the header
    #[arg(long)]
    strict_rows: bool,

    /// Fail on rows without an id value instead of keeping them
    #[arg(long)]
    require_id: bool,

    /// Compute a checksum of the output file (sha256, sha512)
    #[arg(long)]
    digest: Option<DigestAlgorithm>,
}

impl From<RunArgs> for PipelineConfig {
    fn from(args: RunArgs) -> Self {
        PipelineConfig {
            input: args.input,
            blocklist: args.blocklist,
            output: args.output,
            stride: args.stride,
            destination: args.destination,
            cloud_provider: args.cloud_provider,
            row_policy: if args.strict_rows {
                RowPolicy::Strict
            } else {
                RowPolicy::Lenient
            },
            require_id: args.require_id,
            digest: args.digest,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so console output on stdout stays clean
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Run(args) => {
            let config = PipelineConfig::from(args);
            let report = run(&config).context("pipeline run failed")?;
            if config.destination == DestinationKind::File {
                info!("Written to {}", config.output.display());
            }
            info!(
                "{} of {} sampled rows written",
                report.rows_written, report.rows_sampled
            );
        }
        Command::Generate { output, rows } => {
            generate_mock_data(&output, rows)
                .with_context(|| format!("generating mock data in {}", output.display()))?;
        }
    }

    Ok(())
}
