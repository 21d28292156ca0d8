//! Table normalization, including rows fetched from an external source.

use super::Normalizer;
use super::shorthand::{Object, is_truthy};
use crate::error::PreprocessError;
use crate::events::{TableDataRequest, TraversalEvent};
use docprep_idf::{Node, NodeMetadata, TableCell, TableNode};
use docprep_source::{TableQuery, project_row};
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

impl Normalizer<'_> {
    /// Normalizes a table. Rows fetched for a `data` declaration are
    /// appended after the authored rows before any cell is normalized.
    pub(super) async fn table(
        &mut self,
        mut obj: Object,
        mut meta: NodeMetadata,
    ) -> Result<Node, PreprocessError> {
        let mut table = match obj.remove("table") {
            Some(Value::Object(table)) => table,
            Some(other) => {
                return Err(PreprocessError::malformed(
                    "table",
                    format!("expected an object, got {}", other),
                ));
            }
            None => Object::new(),
        };

        let mut rows = match table.remove("body") {
            Some(Value::Array(rows)) => rows
                .into_iter()
                .map(|row| match row {
                    Value::Array(cells) => Ok(cells),
                    other => Err(PreprocessError::malformed(
                        "table",
                        format!("body rows must be arrays, got {}", other),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?,
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                return Err(PreprocessError::malformed(
                    "table",
                    format!("`body` must be an array, got {}", other),
                ));
            }
        };

        if let Some(spec) = obj.remove("data").filter(is_truthy) {
            self.fetch_rows(&spec, &mut rows).await?;
        }

        let body = self.normalize_body(rows).await?;
        meta.props = obj;
        Ok(Node::Table(TableNode {
            meta,
            table_props: table,
            body,
        }))
    }

    /// Asks the bus for rows matching `spec` and appends their projections
    /// to `rows`.
    async fn fetch_rows(
        &mut self,
        spec: &Value,
        rows: &mut Vec<Vec<Value>>,
    ) -> Result<(), PreprocessError> {
        let query = Arc::new(TableQuery::from_value(spec)?);
        let event = self.config.table_data_event.as_str();
        if self.bus.listener_count(event) == 0 {
            warn!(
                "Table declares external data but nothing listens for '{}'; no rows fetched",
                event
            );
            return Ok(());
        }

        let (sender, receiver) = async_channel::unbounded();
        let request = TableDataRequest::new(Arc::clone(&query), sender);
        self.bus
            .emit(event, TraversalEvent::TableData(request))
            .await?;
        receiver.close();

        let before = rows.len();
        while let Ok(row) = receiver.try_recv() {
            rows.push(project_row(&query.columns, &row));
        }
        debug!(
            "Fetched {} row(s) for table query '{}'",
            rows.len() - before,
            query.query_text().unwrap_or("<unnamed>")
        );
        Ok(())
    }

    /// Normalizes every cell, header rows included, column by column.
    /// Ragged rows keep their length.
    async fn normalize_body(
        &mut self,
        rows: Vec<Vec<Value>>,
    ) -> Result<Vec<Vec<TableCell>>, PreprocessError> {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut pending: Vec<Vec<Option<Value>>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Some).collect())
            .collect();
        let mut body: Vec<Vec<Option<TableCell>>> = pending
            .iter()
            .map(|row| (0..row.len()).map(|_| None).collect())
            .collect();

        for col in 0..width {
            for (row, cells) in pending.iter_mut().enumerate() {
                if let Some(value) = cells.get_mut(col).and_then(Option::take) {
                    body[row][col] = Some(self.normalize_cell(value).await?);
                }
            }
        }

        Ok(body
            .into_iter()
            .map(|row| row.into_iter().flatten().collect())
            .collect())
    }

    async fn normalize_cell(&mut self, value: Value) -> Result<TableCell, PreprocessError> {
        match value {
            Value::Object(marker) if marker.get("_span").is_some_and(is_truthy) => {
                Ok(TableCell::Span(marker))
            }
            other => Ok(TableCell::Content(self.normalize_node(other).await?)),
        }
    }
}
