use crate::blocklist::Blocklist;
use crate::error::{EtlError, Result};
use crate::row::Row;

/// Drop rows whose `id` is in the blocklist
///
/// This function:
/// - Pulls one row at a time from upstream
/// - Looks up the row's `id` in the blocklist (O(1) hash lookup)
/// - Passes non-blocked rows through unchanged and in order
/// - Forwards upstream errors untouched
///
/// Rows without an `id` value are kept unless [`Filter::require_id`] is set.
pub fn filter<I>(rows: I, blocklist: &Blocklist) -> Filter<'_, I>
where
    I: Iterator<Item = Result<Row>>,
{
    Filter {
        rows,
        blocklist,
        require_id: false,
        passed: 0,
        blocked: 0,
    }
}

/// Lazy blocklist filter over a row stream
pub struct Filter<'a, I> {
    rows: I,
    blocklist: &'a Blocklist,
    require_id: bool,
    passed: usize,
    blocked: usize,
}

impl<'a, I> Filter<'a, I> {
    /// Reject rows lacking an `id` value with [`EtlError::Filter`]
    pub fn require_id(mut self, require: bool) -> Self {
        self.require_id = require;
        self
    }

    /// Rows passed through so far
    pub fn passed(&self) -> usize {
        self.passed
    }

    /// Rows dropped so far
    pub fn blocked(&self) -> usize {
        self.blocked
    }
}

impl<'a, I> Iterator for Filter<'a, I>
where
    I: Iterator<Item = Result<Row>>,
{
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.rows.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };

            let is_blocked = match row.id() {
                Some(id) => self.blocklist.contains(id),
                None if self.require_id => {
                    return Some(Err(EtlError::Filter {
                        line: row.line(),
                        reason: "row has no `id` value".to_string(),
                    }));
                }
                None => false,
            };

            if is_blocked {
                self.blocked += 1;
                continue;
            }

            self.passed += 1;
            return Some(Ok(row));
        }
    }
}
