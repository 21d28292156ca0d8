//! Configuration for a normalization run.

use crate::error::PreprocessError;
use docprep_types::DEFAULT_TOC_ID;
use serde::{Deserialize, Serialize};

/// Tunables for the normalizer and TOC assembly. Every field has a default,
/// so a partial JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreprocessConfig {
    /// TOC id used when a TOC or a `tocItem` entry does not name one.
    pub default_toc_id: String,
    /// Text shown by `pageReference` nodes until the layout stage substitutes
    /// the page number. Its width reserves space for the number.
    pub page_reference_placeholder: String,
    /// Minimum bottom margin of a TOC item followed by a section header.
    pub section_header_gap: f64,
    /// Label of the section header preceding digit-leading TOC items.
    pub numeric_section_label: String,
    /// Event emitted when a table needs rows from an external source.
    pub table_data_event: String,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            default_toc_id: DEFAULT_TOC_ID.to_string(),
            page_reference_placeholder: "00000".to_string(),
            section_header_gap: 10.0,
            numeric_section_label: "0-9".to_string(),
            table_data_event: "tableData".to_string(),
        }
    }
}

impl PreprocessConfig {
    pub fn from_json(json: &str) -> Result<Self, PreprocessError> {
        Ok(serde_json::from_str(json)?)
    }
}
