//! The `data` declaration of a live table and the projection of fetched rows
//! into table cells.

use crate::SourceError;
use serde_json::{Map, Value};

/// How one table column is filled from a fetched row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSpec {
    /// The cell is the row's value for this field.
    Field(String),
    /// The cell is a copy of this node template whose `text` names the field
    /// to interpolate.
    Template(Map<String, Value>),
}

impl ColumnSpec {
    fn from_value(value: &Value) -> Result<Self, SourceError> {
        match value {
            Value::String(field) => Ok(ColumnSpec::Field(field.clone())),
            Value::Object(template) if template.contains_key("text") => {
                Ok(ColumnSpec::Template(template.clone()))
            }
            other => Err(SourceError::InvalidSpec(format!(
                "column must be a field name or an object with `text`, got {}",
                other
            ))),
        }
    }

    /// Produces the cell description for `row`.
    pub fn project(&self, row: &Value) -> Value {
        match self {
            ColumnSpec::Field(field) => row.get(field).cloned().unwrap_or(Value::Null),
            ColumnSpec::Template(template) => {
                let mut cell = template.clone();
                let field = template.get("text").and_then(Value::as_str);
                let text = field
                    .and_then(|f| row.get(f))
                    .cloned()
                    .unwrap_or(Value::Null);
                cell.insert("text".into(), text);
                Value::Object(cell)
            }
        }
    }
}

/// The external-data contract of one table: where to connect, what to ask,
/// and how to turn each answer row into cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    /// Connection parameters, opaque to the normalizer.
    pub connection: Value,
    /// The query, opaque to the normalizer (usually a string).
    pub query: Value,
    pub columns: Vec<ColumnSpec>,
}

impl TableQuery {
    /// Parses a table's `data` declaration.
    pub fn from_value(spec: &Value) -> Result<Self, SourceError> {
        let obj = spec.as_object().ok_or_else(|| {
            SourceError::InvalidSpec(format!("table data must be an object, got {}", spec))
        })?;
        let columns = match obj.get("columns") {
            Some(Value::Array(cols)) => cols
                .iter()
                .map(ColumnSpec::from_value)
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(SourceError::InvalidSpec(format!(
                    "`columns` must be an array, got {}",
                    other
                )));
            }
            None => return Err(SourceError::InvalidSpec("missing `columns`".into())),
        };
        Ok(Self {
            connection: obj.get("connection").cloned().unwrap_or(Value::Null),
            query: obj.get("query").cloned().unwrap_or(Value::Null),
            columns,
        })
    }

    /// The query as text, when it is a plain string.
    pub fn query_text(&self) -> Option<&str> {
        self.query.as_str()
    }
}

/// Projects a fetched row through the column specs, producing one raw cell
/// description per column.
pub fn project_row(columns: &[ColumnSpec], row: &Value) -> Vec<Value> {
    columns.iter().map(|c| c.project(row)).collect()
}
