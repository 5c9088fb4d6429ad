//! stream-etl - Streaming CSV ingest with blocklist filtering
//!
//! This library reads rows from a comma-delimited file, drops the rows whose
//! `id` appears in a blocklist, and writes the survivors to a file, the
//! console, or a placeholder cloud target. Each stage pulls one row at a time
//! from the previous one, so memory use stays flat regardless of input size.
//!
//! # Key Features
//!
//! - **True streaming**: rows are parsed lazily from a reused line buffer
//! - **Sampling**: keep only every Nth data row with a stride
//! - **Order preservation**: surviving rows keep their input order
//! - **Fast filtering**: O(1) blocklist lookups
//! - **Fail-open blocklist**: a missing blocklist file blocks nothing
//! - **Checksums**: optional SHA-256/SHA-512 of the file output
//!
//! # Examples
//!
//! **Full run** with the default `data/` layout:
//!
//! ```no_run
//! use stream_etl::{run, PipelineConfig};
//!
//! let report = run(&PipelineConfig::default()).unwrap();
//! println!("wrote {} rows in {:?}", report.rows_written, report.elapsed);
//! ```
//!
//! **Composing the stages** by hand:
//!
//! ```no_run
//! use stream_etl::{filter, ingest, scoped, Blocklist, Destination, FileDestination};
//!
//! let blocklist = Blocklist::load("data/blocked_ids.txt").unwrap();
//! let mut dest = FileDestination::new("data/output.csv");
//! scoped(&mut dest, |d| {
//!     for row in filter(ingest("data/raw_data.csv", 1)?, &blocklist) {
//!         d.write(&row?)?;
//!     }
//!     Ok(())
//! })
//! .unwrap();
//! ```

pub mod blocklist;
pub mod destination;
pub mod digest;
pub mod error;
pub mod filter;
pub mod mockgen;
pub mod pipeline;
pub mod row;
pub mod source;
pub mod timing;

pub use blocklist::Blocklist;
pub use destination::{
    scoped, CloudDestination, ConsoleDestination, Destination, DestinationKind, FileDestination,
};
pub use digest::DigestAlgorithm;
pub use error::{EtlError, Result};
pub use filter::{filter, Filter};
pub use pipeline::{run, run_with, transfer, PipelineConfig, RunReport};
pub use row::{Header, Row};
pub use source::{ingest, Ingest, RowPolicy};
