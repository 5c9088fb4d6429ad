//! Output targets for filtered rows
//!
//! Every variant follows the same open/write/close contract. [`scoped`] runs a
//! body between `open` and `close` and guarantees the release step happens on
//! both the success and the error path.

use crate::digest::{DigestAlgorithm, DigestWriter};
use crate::error::{EtlError, Result};
use crate::row::Row;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Uniform output contract shared by file, console and cloud targets
pub trait Destination {
    /// Human-readable target used in logs and errors
    fn target(&self) -> String;

    /// Acquire the underlying output
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, row: &Row) -> Result<()>;

    /// Release the underlying output, flushing anything buffered
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Checksum of everything written, once closed, if the target computes one
    fn checksum(&self) -> Option<&str> {
        None
    }
}

/// Open `dest`, run `body`, and close `dest` regardless of the outcome
///
/// When both the body and the close fail, the body's error is returned.
pub fn scoped<D, T, F>(dest: &mut D, body: F) -> Result<T>
where
    D: Destination + ?Sized,
    F: FnOnce(&mut D) -> Result<T>,
{
    dest.open()?;
    let result = body(dest);
    let closed = dest.close();
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(e), _) => Err(e),
        (Ok(_), Err(e)) => Err(e),
    }
}

/// Which destination variant a run writes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DestinationKind {
    #[default]
    File,
    Console,
    Cloud,
}

impl FromStr for DestinationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(DestinationKind::File),
            "console" => Ok(DestinationKind::Console),
            "cloud" => Ok(DestinationKind::Cloud),
            _ => Err(format!(
                "Unknown destination '{}'. Supported: file, console, cloud",
                s
            )),
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DestinationKind::File => "file",
            DestinationKind::Console => "console",
            DestinationKind::Cloud => "cloud",
        })
    }
}

enum FileWriter {
    Plain(BufWriter<File>),
    Digest(DigestWriter<BufWriter<File>>),
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileWriter::Plain(w) => w.write(buf),
            FileWriter::Digest(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileWriter::Plain(w) => w.flush(),
            FileWriter::Digest(w) => w.flush(),
        }
    }
}

/// Writes comma-joined row values, one line per row, to a file
///
/// The file is truncated at `open`, so repeated runs over the same input
/// produce identical output.
pub struct FileDestination {
    path: PathBuf,
    digest: Option<DigestAlgorithm>,
    writer: Option<FileWriter>,
    checksum: Option<String>,
}

impl FileDestination {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileDestination {
            path: path.into(),
            digest: None,
            writer: None,
            checksum: None,
        }
    }

    /// Compute a checksum of the written bytes, available after `close`
    pub fn with_digest(mut self, algorithm: DigestAlgorithm) -> Self {
        self.digest = Some(algorithm);
        self
    }
}

impl Destination for FileDestination {
    fn target(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&mut self) -> Result<()> {
        let file = File::create(&self.path).map_err(|e| EtlError::write(self.target(), e))?;
        let buffered = BufWriter::new(file);
        self.writer = Some(match self.digest {
            Some(algorithm) => FileWriter::Digest(DigestWriter::new(buffered, algorithm)),
            None => FileWriter::Plain(buffered),
        });
        self.checksum = None;
        debug!(path = %self.path.display(), "opened output file");
        Ok(())
    }

    fn write(&mut self, row: &Row) -> Result<()> {
        match self.writer.as_mut() {
            Some(writer) => write_csv_line(writer, row)
                .map_err(|e| EtlError::write(self.path.display().to_string(), e)),
            None => Err(EtlError::NotOpen {
                target: self.target(),
            }),
        }
    }

    fn close(&mut self) -> Result<()> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };

        let flushed = match writer {
            FileWriter::Plain(mut w) => w.flush(),
            FileWriter::Digest(w) => {
                let (mut w, checksum) = w.finalize();
                w.flush().map(|()| self.checksum = Some(checksum))
            }
        };
        flushed.map_err(|e| EtlError::write(self.target(), e))?;

        debug!(path = %self.path.display(), "closed output file");
        Ok(())
    }

    fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }
}

#[inline]
fn write_csv_line<W: Write>(output: &mut W, row: &Row) -> io::Result<()> {
    for (i, value) in row.values().iter().enumerate() {
        if i > 0 {
            output.write_all(b",")?;
        }
        output.write_all(value.as_bytes())?;
    }
    output.write_all(b"\n")
}

/// Prints each row as a JSON object (keys in header order), one per line
pub struct ConsoleDestination<W: Write = Stdout> {
    output: W,
}

impl ConsoleDestination<Stdout> {
    pub fn new() -> Self {
        ConsoleDestination {
            output: io::stdout(),
        }
    }
}

impl Default for ConsoleDestination<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConsoleDestination<W> {
    pub fn with_writer(output: W) -> Self {
        ConsoleDestination { output }
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> Destination for ConsoleDestination<W> {
    fn target(&self) -> String {
        "console".to_string()
    }

    fn write(&mut self, row: &Row) -> Result<()> {
        serde_json::to_writer(&mut self.output, row)
            .map_err(io::Error::from)
            .and_then(|()| self.output.write_all(b"\n"))
            .map_err(|e| EtlError::write("console", e))
    }

    fn close(&mut self) -> Result<()> {
        self.output
            .flush()
            .map_err(|e| EtlError::write("console", e))
    }
}

/// Placeholder cloud target: reports each write instead of uploading it
pub struct CloudDestination<W: Write = Stdout> {
    provider: String,
    output: W,
    writes: usize,
}

impl CloudDestination<Stdout> {
    pub fn new<S: Into<String>>(provider: S) -> Self {
        Self::with_writer(provider, io::stdout())
    }
}

impl<W: Write> CloudDestination<W> {
    pub fn with_writer<S: Into<String>>(provider: S, output: W) -> Self {
        CloudDestination {
            provider: provider.into(),
            output,
            writes: 0,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Number of simulated writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> Destination for CloudDestination<W> {
    fn target(&self) -> String {
        format!("cloud:{}", self.provider)
    }

    fn write(&mut self, row: &Row) -> Result<()> {
        let payload = serde_json::to_string(row)
            .map_err(|e| EtlError::write(self.target(), io::Error::from(e)))?;
        writeln!(self.output, "Writing data to {}: {}", self.provider, payload)
            .map_err(|e| EtlError::write(self.target(), e))?;
        self.writes += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        info!(
            provider = %self.provider,
            writes = self.writes,
            "Simulated cloud upload finished"
        );
        self.output
            .flush()
            .map_err(|e| EtlError::write(self.target(), e))
    }
}

/// Build the destination selected for a run
pub fn build(
    kind: DestinationKind,
    output: &Path,
    cloud_provider: &str,
    digest: Option<DigestAlgorithm>,
) -> Box<dyn Destination> {
    match kind {
        DestinationKind::File => {
            let dest = FileDestination::new(output);
            Box::new(match digest {
                Some(algorithm) => dest.with_digest(algorithm),
                None => dest,
            })
        }
        DestinationKind::Console => Box::new(ConsoleDestination::new()),
        DestinationKind::Cloud => Box::new(CloudDestination::new(cloud_provider)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Header;
    use std::fs;
    use std::rc::Rc;

    fn sample_rows() -> Vec<Row> {
        let header = Rc::new(Header::parse("id,name,status"));
        vec![
            Row::new(
                Rc::clone(&header),
                vec!["101".into(), "A".into(), "active".into()],
                1,
            ),
            Row::new(header, vec!["103".into(), "C".into(), "active".into()], 3),
        ]
    }

    #[test]
    fn test_file_destination_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let mut dest = FileDestination::new(&path);

        scoped(&mut dest, |d| {
            for row in &sample_rows() {
                d.write(row)?;
            }
            Ok(())
        })
        .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "101,A,active\n103,C,active\n");
        assert!(dest.checksum().is_none());
    }

    #[test]
    fn test_file_destination_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");
        fs::write(&path, "stale,content\nmore\nlines\n").unwrap();

        let rows = sample_rows();
        let mut dest = FileDestination::new(&path);
        scoped(&mut dest, |d| d.write(&rows[0])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "101,A,active\n");
    }

    #[test]
    fn test_file_destination_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let rows = sample_rows();

        let mut dest = FileDestination::new(&path).with_digest(DigestAlgorithm::Sha256);
        scoped(&mut dest, |d| d.write(&rows[0])).unwrap();

        let mut expected = DigestWriter::new(Vec::new(), DigestAlgorithm::Sha256);
        expected.write_all(b"101,A,active\n").unwrap();
        assert_eq!(dest.checksum(), Some(expected.finalize().1.as_str()));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_flush_leaves_no_checksum() {
        let rows = sample_rows();
        // Writes land in the buffer; the flush on close hits ENOSPC
        let mut dest = FileDestination::new("/dev/full").with_digest(DigestAlgorithm::Sha256);

        let err = scoped(&mut dest, |d| d.write(&rows[0])).unwrap_err();

        assert!(matches!(err, EtlError::Write { .. }));
        assert!(dest.checksum().is_none());
    }

    #[test]
    fn test_write_before_open_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut dest = FileDestination::new(dir.path().join("output.csv"));

        let err = dest.write(&sample_rows()[0]).unwrap_err();
        assert!(matches!(err, EtlError::NotOpen { .. }));
    }

    #[test]
    fn test_scoped_closes_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let rows = sample_rows();
        let mut dest = FileDestination::new(&path);

        let result: Result<()> = scoped(&mut dest, |d| {
            d.write(&rows[0])?;
            Err(EtlError::InvalidStride)
        });

        assert!(matches!(result, Err(EtlError::InvalidStride)));
        // Released and flushed despite the failure
        assert!(matches!(dest.write(&rows[1]), Err(EtlError::NotOpen { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "101,A,active\n");
    }

    #[test]
    fn test_open_failure_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut dest = FileDestination::new(dir.path().join("missing").join("output.csv"));

        let err = scoped(&mut dest, |_| Ok(())).unwrap_err();
        assert!(matches!(err, EtlError::Write { .. }));
    }

    #[test]
    fn test_console_destination_prints_json() {
        let mut dest = ConsoleDestination::with_writer(Vec::new());
        scoped(&mut dest, |d| {
            for row in &sample_rows() {
                d.write(row)?;
            }
            Ok(())
        })
        .unwrap();

        let output = String::from_utf8(dest.into_inner()).unwrap();
        assert_eq!(
            output,
            "{\"id\":\"101\",\"name\":\"A\",\"status\":\"active\"}\n\
             {\"id\":\"103\",\"name\":\"C\",\"status\":\"active\"}\n"
        );
    }

    #[test]
    fn test_cloud_destination_reports_writes() {
        let mut dest = CloudDestination::with_writer("AWS", Vec::new());
        scoped(&mut dest, |d| d.write(&sample_rows()[0])).unwrap();

        assert_eq!(dest.writes(), 1);
        assert_eq!(dest.provider(), "AWS");
        let output = String::from_utf8(dest.into_inner()).unwrap();
        assert_eq!(
            output,
            "Writing data to AWS: {\"id\":\"101\",\"name\":\"A\",\"status\":\"active\"}\n"
        );
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("File".parse::<DestinationKind>(), Ok(DestinationKind::File));
        assert_eq!("console".parse::<DestinationKind>(), Ok(DestinationKind::Console));
        assert_eq!("cloud".parse::<DestinationKind>(), Ok(DestinationKind::Cloud));
        assert!("s3".parse::<DestinationKind>().is_err());
    }
}
