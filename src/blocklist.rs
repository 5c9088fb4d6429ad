use crate::error::{EtlError, Result};
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Set of identifiers whose rows are dropped; immutable once loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocklist {
    ids: FxHashSet<String>,
}

impl Blocklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a newline-delimited identifier list
    ///
    /// Lines are trimmed and empty lines discarded. A missing file is not an
    /// error: it yields an empty blocklist, meaning nothing is blocked.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No blocklist found, nothing will be blocked");
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(EtlError::Blocklist {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let blocklist = Self::from_reader(BufReader::new(file)).map_err(|e| EtlError::Blocklist {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!("Loaded {} ids from blocklist {}", blocklist.len(), path.display());
        Ok(blocklist)
    }

    /// Read identifiers from any buffered reader, one per line
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut ids = FxHashSet::default();
        for line in reader.lines() {
            let line = line?;
            let id = line.trim();
            if !id.is_empty() {
                ids.insert(id.to_string());
            }
        }
        Ok(Blocklist { ids })
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Blocklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Blocklist {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_trims_and_skips_blank_lines() {
        let input = "102\n  103  \n\n\t\n104\r\n";
        let blocklist = Blocklist::from_reader(input.as_bytes()).unwrap();

        assert_eq!(blocklist.len(), 3);
        assert!(blocklist.contains("102"));
        assert!(blocklist.contains("103"));
        assert!(blocklist.contains("104"));
        assert!(!blocklist.contains(""));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let blocklist = Blocklist::load(dir.path().join("blocked_ids.txt")).unwrap();
        assert!(blocklist.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocked_ids.txt");
        fs::write(&path, "102\n102\n105\n").unwrap();

        let blocklist = Blocklist::load(&path).unwrap();
        assert_eq!(blocklist.len(), 2);
        assert!(blocklist.contains("105"));
    }

    #[test]
    fn test_unreadable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory opens on unix but cannot be read line by line
        let err = Blocklist::load(dir.path()).unwrap_err();
        assert!(matches!(err, EtlError::Blocklist { .. }));
    }
}
