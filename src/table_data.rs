//! Adapts a [`RowProvider`] into a table data listener.
//!
//! Providers are blocking: each request is served on tokio's blocking pool
//! so a slow query does not stall the runtime driving the normalizer.

use crate::error::EventError;
use crate::events::{Listener, TableDataRequest, TraversalEvent};
use docprep_source::RowProvider;
use log::debug;
use std::sync::Arc;

/// Builds a deferred listener that answers every table data request by
/// opening `provider` and pushing each row it yields. Other events are
/// ignored.
///
/// A failing source fails the listener, which aborts the run.
pub fn row_provider_listener(provider: Arc<dyn RowProvider>) -> Listener {
    Listener::deferred(move |event| {
        let provider = Arc::clone(&provider);
        async move {
            let TraversalEvent::TableData(request) = event else {
                return Ok(());
            };
            let name = provider.name();
            tokio::task::spawn_blocking(move || fetch_into(provider.as_ref(), &request))
                .await
                .map_err(|e| EventError::listener("tableData", format!("{} worker failed: {}", name, e)))?
        }
    })
}

fn fetch_into(provider: &dyn RowProvider, request: &TableDataRequest) -> Result<(), EventError> {
    let mut source = provider.open(&request.query)?;
    if let Some(expected) = source.size_hint() {
        debug!("{}: expecting {} row(s)", provider.name(), expected);
    }
    let mut delivered = 0usize;
    while let Some(row) = source.next() {
        request.try_push_row(row?)?;
        delivered += 1;
    }
    debug!("{}: delivered {} row(s)", provider.name(), delivered);
    Ok(())
}
