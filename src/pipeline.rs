//! Orchestration: blocklist → ingest → filter → destination in a single pass

use crate::blocklist::Blocklist;
use crate::destination::{self, scoped, Destination, DestinationKind};
use crate::digest::DigestAlgorithm;
use crate::error::Result;
use crate::filter::filter;
use crate::row::Row;
use crate::source::{ingest, RowPolicy};
use crate::timing::timed;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Every knob of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub blocklist: PathBuf,
    pub output: PathBuf,
    /// Keep every `stride`-th data row (1 = all)
    pub stride: usize,
    pub destination: DestinationKind,
    /// Provider name reported by the cloud destination
    pub cloud_provider: String,
    pub row_policy: RowPolicy,
    /// Fail on rows without an `id` value instead of keeping them
    pub require_id: bool,
    /// Checksum the file destination's output
    pub digest: Option<DigestAlgorithm>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input: PathBuf::from("data/raw_data.csv"),
            blocklist: PathBuf::from("data/blocked_ids.txt"),
            output: PathBuf::from("data/output.csv"),
            stride: 1,
            destination: DestinationKind::File,
            cloud_provider: "aws".to_string(),
            row_policy: RowPolicy::Lenient,
            require_id: false,
            digest: None,
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Rows selected by the stride and inspected by the filter
    pub rows_sampled: usize,
    pub rows_blocked: usize,
    pub rows_written: usize,
    pub elapsed: Duration,
    /// Output checksum, when the destination computed one
    pub checksum: Option<String>,
}

/// Run the pipeline described by `config`
///
/// Loads the blocklist, builds the configured destination and streams the
/// input through it. Any failure aborts the run; output already written is
/// left as is.
pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    let blocklist = Blocklist::load(&config.blocklist)?;
    let mut dest = destination::build(
        config.destination,
        &config.output,
        &config.cloud_provider,
        config.digest,
    );
    run_with(config, &blocklist, dest.as_mut())
}

/// Run the pipeline against an already loaded blocklist and destination
///
/// The input is opened before the destination, so a missing input leaves no
/// output behind.
pub fn run_with(
    config: &PipelineConfig,
    blocklist: &Blocklist,
    dest: &mut dyn Destination,
) -> Result<RunReport> {
    info!(
        input = %config.input.display(),
        destination = %dest.target(),
        stride = config.stride,
        "Pipeline started"
    );

    let (report, elapsed) = timed(|| {
        let rows = ingest(&config.input, config.stride)?.policy(config.row_policy);
        transfer(rows, blocklist, &mut *dest, config.require_id)
    });

    let mut report = report?;
    report.elapsed = elapsed;
    report.checksum = dest.checksum().map(str::to_string);

    info!(
        sampled = report.rows_sampled,
        blocked = report.rows_blocked,
        written = report.rows_written,
        "Pipeline finished in: {:.3}s",
        elapsed.as_secs_f64()
    );
    if let (Some(algorithm), Some(checksum)) = (config.digest, &report.checksum) {
        info!("{}: {}", algorithm.name(), checksum);
    }

    Ok(report)
}

/// Filter `rows` and write the survivors to `dest` within its open/close scope
///
/// The returned report carries row counts only; timing and checksum are
/// filled in by [`run_with`].
pub fn transfer<I, D>(
    rows: I,
    blocklist: &Blocklist,
    dest: &mut D,
    require_id: bool,
) -> Result<RunReport>
where
    I: Iterator<Item = Result<Row>>,
    D: Destination + ?Sized,
{
    scoped(dest, |d| {
        let mut filtered = filter(rows, blocklist).require_id(require_id);
        let mut written = 0;
        for row in filtered.by_ref() {
            d.write(&row?)?;
            written += 1;
        }
        debug!(written, "row stream exhausted");

        Ok(RunReport {
            rows_sampled: filtered.passed() + filtered.blocked(),
            rows_blocked: filtered.blocked(),
            rows_written: written,
            ..RunReport::default()
        })
    })
}
