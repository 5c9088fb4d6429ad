use crate::error::{EtlError, Result};
use crate::row::{Header, Row};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

/// How data lines whose field count differs from the header are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Zip values against the header: extra values are dropped, missing ones
    /// leave the row short
    #[default]
    Lenient,
    /// Fail with [`EtlError::Malformed`]
    Strict,
}

/// Open a delimited file and lazily stream every `stride`-th data row
///
/// The file is opened and its header parsed here, so a missing input is
/// reported before any destination is touched. Read failures on data lines
/// surface as `Err` items when the stream is consumed.
pub fn ingest<P: AsRef<Path>>(path: P, stride: usize) -> Result<Ingest<BufReader<File>>> {
    let path = path.as_ref();
    if stride == 0 {
        return Err(EtlError::InvalidStride);
    }

    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => EtlError::NotFound {
            path: path.to_path_buf(),
        },
        _ => EtlError::Ingest {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    debug!(path = %path.display(), stride, "opened input");
    Ingest::from_reader(BufReader::new(file), path, stride)
}

/// Pull-based row stream over a buffered reader
///
/// Holds one line buffer that is reused across lines; rows are only built for
/// lines selected by the stride. The underlying reader is released when the
/// stream is dropped, whether or not it was exhausted.
pub struct Ingest<R> {
    reader: R,
    path: PathBuf,
    header: Option<Rc<Header>>,
    stride: usize,
    policy: RowPolicy,
    counter: usize,
    buf: String,
    done: bool,
}

impl<R: BufRead> Ingest<R> {
    /// Stream rows from any buffered reader; `path` is only used in errors
    pub fn from_reader<P: Into<PathBuf>>(mut reader: R, path: P, stride: usize) -> Result<Self> {
        let path = path.into();
        if stride == 0 {
            return Err(EtlError::InvalidStride);
        }

        let mut buf = String::new();
        let n = reader.read_line(&mut buf).map_err(|e| EtlError::Ingest {
            path: path.clone(),
            source: e,
        })?;

        let header = if n == 0 {
            warn!(path = %path.display(), "input has no header line");
            None
        } else {
            Some(Rc::new(Header::parse(strip_newline(&buf))))
        };

        Ok(Ingest {
            reader,
            path,
            header,
            stride,
            policy: RowPolicy::default(),
            counter: 0,
            buf,
            done: false,
        })
    }

    /// Set the column-count mismatch policy
    pub fn policy(mut self, policy: RowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Header of the input, `None` for an empty file
    pub fn header(&self) -> Option<&Header> {
        self.header.as_deref()
    }
}

impl<R: BufRead> Iterator for Ingest<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = match &self.header {
            Some(header) if !self.done => Rc::clone(header),
            _ => return None,
        };

        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(EtlError::Ingest {
                        path: self.path.clone(),
                        source: e,
                    }));
                }
            }

            // Every data line holds a position, blank ones included
            self.counter += 1;
            let line = strip_newline(&self.buf);
            if line.trim().is_empty() || self.counter % self.stride != 0 {
                continue;
            }

            let values: Vec<String> = line.split(',').map(str::to_string).collect();
            if self.policy == RowPolicy::Strict && values.len() != header.len() {
                self.done = true;
                return Some(Err(EtlError::Malformed {
                    line: self.counter,
                    expected: header.len(),
                    found: values.len(),
                }));
            }

            return Some(Ok(Row::new(header, values, self.counter)));
        }
    }
}

#[inline]
fn strip_newline(line: &str) -> &str {
    line.trim_end_matches(|c| c == '\n' || c == '\r')
}
