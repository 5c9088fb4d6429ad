use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::rc::Rc;

/// Field names parsed from the header line, shared by every row of a run
#[derive(Debug, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
    positions: FxHashMap<String, usize>,
}

impl Header {
    /// Parse a comma-separated header line
    pub fn parse(line: &str) -> Self {
        Self::new(line.split(',').map(str::to_string).collect())
    }

    pub fn new(names: Vec<String>) -> Self {
        let mut positions = FxHashMap::default();
        for (i, name) in names.iter().enumerate() {
            // First occurrence wins for duplicated column names
            positions.entry(name.clone()).or_insert(i);
        }
        Header { names, positions }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// One parsed data line, keyed by header field name
///
/// Values are stored in header order. A row built from a short line holds
/// fewer values than the header has names; the missing fields are simply
/// absent from [`Row::get`] and [`Row::iter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    header: Rc<Header>,
    values: Vec<String>,
    line: usize,
}

impl Row {
    /// Build a row, dropping values beyond the header's width
    pub fn new(header: Rc<Header>, mut values: Vec<String>, line: usize) -> Self {
        values.truncate(header.len());
        Row {
            header,
            values,
            line,
        }
    }

    /// Value of the named field, if the row has one
    pub fn get(&self, name: &str) -> Option<&str> {
        self.header
            .position(name)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    /// Shortcut for the `id` field the filter keys on
    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    /// (name, value) pairs in header order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .names()
            .iter()
            .zip(&self.values)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// 1-based position of the data line this row came from (header excluded)
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values joined with commas, in header order
    pub fn to_csv_line(&self) -> String {
        self.values.join(",")
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
