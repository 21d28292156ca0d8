//! Data source abstractions for live tables.
//!
//! A table may declare that its rows come from an external system
//! (`"data": { "connection": ..., "query": ..., "columns": [...] }`). This
//! crate describes that contract without depending on any particular
//! database driver.
//!
//! ## Available Sources
//!
//! - `IteratorDataSource`: Wraps any iterator of row results
//! - `VecDataSource`: In-memory vector of rows
//!
//! ## Example
//!
//! ```ignore
//! use docprep_source::{DataSource, VecDataSource};
//! use serde_json::json;
//!
//! let rows = vec![json!({"name": "Ada"}), json!({"name": "Grace"})];
//! let mut source = VecDataSource::new(rows);
//!
//! while let Some(row) = source.next() {
//!     println!("Row: {:?}", row?);
//! }
//! ```

mod error;
mod provider;
mod query;

pub use error::SourceError;
pub use provider::{InMemoryRowProvider, RowProvider};
pub use query::{ColumnSpec, TableQuery, project_row};

use serde_json::Value;

/// A stream of rows for a single table query.
///
/// Each row is a JSON object keyed by field name. A source owns whatever
/// connection it reads from and releases it when dropped.
pub trait DataSource: Send {
    /// Get the next row, if available.
    ///
    /// Returns `None` when the source is exhausted. An `Err` item ends the
    /// stream; rows read before it remain valid.
    fn next(&mut self) -> Option<Result<Value, SourceError>>;

    /// Hint about the total number of rows (for logging).
    ///
    /// Returns `None` if the size is unknown or unbounded.
    fn size_hint(&self) -> Option<usize> {
        None
    }

    /// Check if the source has a known size.
    fn has_known_size(&self) -> bool {
        self.size_hint().is_some()
    }
}

/// Wraps any iterator of row results as a DataSource.
pub struct IteratorDataSource<I>
where
    I: Iterator<Item = Result<Value, SourceError>> + Send,
{
    inner: I,
    size_hint: Option<usize>,
}

impl<I> IteratorDataSource<I>
where
    I: Iterator<Item = Result<Value, SourceError>> + Send,
{
    /// Create a new data source from an iterator.
    pub fn new(inner: I) -> Self {
        let (lower, upper) = inner.size_hint();
        let size_hint = if upper == Some(lower) {
            Some(lower)
        } else {
            None
        };
        Self { inner, size_hint }
    }
}

impl<I> DataSource for IteratorDataSource<I>
where
    I: Iterator<Item = Result<Value, SourceError>> + Send,
{
    fn next(&mut self) -> Option<Result<Value, SourceError>> {
        self.inner.next()
    }

    fn size_hint(&self) -> Option<usize> {
        self.size_hint
    }
}

/// A data source backed by an in-memory vector of rows.
pub struct VecDataSource {
    rows: Vec<Value>,
    index: usize,
}

impl VecDataSource {
    /// Create a new data source from a vector.
    pub fn new(rows: Vec<Value>) -> Self {
        Self { rows, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the number of rows remaining.
    pub fn remaining(&self) -> usize {
        self.rows.len() - self.index
    }
}

impl DataSource for VecDataSource {
    fn next(&mut self) -> Option<Result<Value, SourceError>> {
        let row = self.rows.get(self.index)?.clone();
        self.index += 1;
        Some(Ok(row))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.rows.len())
    }
}

impl DataSource for Box<dyn DataSource> {
    fn next(&mut self) -> Option<Result<Value, SourceError>> {
        (**self).next()
    }

    fn size_hint(&self) -> Option<usize> {
        (**self).size_hint()
    }
}
