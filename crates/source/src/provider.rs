//! RowProvider trait for opening row streams.
//!
//! A provider owns the knowledge of how to reach an external system. The
//! normalizer never talks to it directly: a host adapts a provider into an
//! event-bus listener for the duration of a run.

use crate::{DataSource, SourceError, TableQuery, VecDataSource};
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

/// A trait for opening a row stream for a table query.
///
/// Implementations are responsible for opening and closing their own
/// connection; the returned source releases it when dropped.
pub trait RowProvider: Send + Sync + Debug {
    /// Opens a stream of rows answering `query`.
    fn open(&self, query: &TableQuery) -> Result<Box<dyn DataSource>, SourceError>;

    /// Returns a human-readable name for this provider (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// An in-memory row provider keyed by query text.
///
/// Rows must be registered before use. Useful for tests and for hosts that
/// prefetch their data.
#[derive(Debug, Default)]
pub struct InMemoryRowProvider {
    tables: RwLock<HashMap<String, Vec<Value>>>,
}

impl InMemoryRowProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the rows answering `query`.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Connection` if the internal lock is poisoned.
    pub fn add(&self, query: impl Into<String>, rows: Vec<Value>) -> Result<(), SourceError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| SourceError::Connection("row store lock poisoned".to_string()))?;
        tables.insert(query.into(), rows);
        Ok(())
    }

    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.tables.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RowProvider for InMemoryRowProvider {
    fn open(&self, query: &TableQuery) -> Result<Box<dyn DataSource>, SourceError> {
        let text = query
            .query_text()
            .ok_or_else(|| SourceError::Query(format!("unsupported query {}", query.query)))?;
        let tables = self
            .tables
            .read()
            .map_err(|_| SourceError::Connection("row store lock poisoned".to_string()))?;
        let rows = tables
            .get(text)
            .cloned()
            .ok_or_else(|| SourceError::Query(format!("no rows registered for '{}'", text)))?;
        debug!("Opened in-memory source for '{}' ({} rows)", text, rows.len());
        Ok(Box::new(VecDataSource::new(rows)))
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
