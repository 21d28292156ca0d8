use super::DocumentPreprocessor;
use crate::config::PreprocessConfig;
use crate::error::PreprocessError;
use crate::events::{Listener, TraversalEventBus};
use crate::table_data::row_provider_listener;
use docprep_source::RowProvider;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// A builder for creating a `DocumentPreprocessor`.
#[derive(Debug, Default)]
pub struct PreprocessorBuilder {
    config: PreprocessConfig,
    bus: TraversalEventBus,
}

impl PreprocessorBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(mut self, config: PreprocessConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the configuration from a JSON file. Missing fields keep their
    /// defaults.
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PreprocessError> {
        let path_ref = path.as_ref();
        let source = fs::read_to_string(path_ref).map_err(|e| {
            PreprocessError::Io(io::Error::new(
                e.kind(),
                format!("Failed to read config from '{}': {}", path_ref.display(), e),
            ))
        })?;
        self.config = PreprocessConfig::from_json(&source)?;
        Ok(self)
    }

    /// Shares an existing bus, so listeners registered on it elsewhere see
    /// this preprocessor's events.
    pub fn with_event_bus(mut self, bus: TraversalEventBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_listener(self, event: &str, listener: Listener) -> Self {
        self.bus.subscribe(event, listener);
        self
    }

    /// Answers table data requests from `provider`. Subscribes under the
    /// table data event of the configuration set so far.
    pub fn with_row_provider(self, provider: Arc<dyn RowProvider>) -> Self {
        let event = self.config.table_data_event.clone();
        self.with_listener(&event, row_provider_listener(provider))
    }

    pub fn build(self) -> DocumentPreprocessor {
        DocumentPreprocessor::new(self.config, self.bus)
    }
}
