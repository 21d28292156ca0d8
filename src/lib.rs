//! Document normalization and forward-reference resolution.
//!
//! The [`DocumentPreprocessor`] accepts a loosely-structured document
//! description (shorthand strings, bare arrays, nested text) and produces a
//! canonical [`Node`] tree ready for layout. During the same descent it
//! collects node ids into a [`ReferenceRegistry`], so page and text
//! references may point at nodes declared later, and gathers `tocItem`
//! nodes into per-id tables of contents.
//!
//! ## Example
//!
//! ```
//! use docprep::{DocumentPreprocessor, PreprocessError};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), PreprocessError> {
//! let doc = DocumentPreprocessor::default().preprocess_blocking(json!([
//!     { "toc": { "title": "Contents" } },
//!     { "text": "Introduction", "tocItem": true, "id": "intro" },
//!     { "text": "see page ", "pageReference": "intro" },
//! ]))?;
//! assert!(doc.references.is_resolved("intro"));
//! assert_eq!(doc.tocs.get("_default_").map(|t| t.entry_texts()), Some(vec!["Introduction".to_string()]));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod preprocess;
pub mod references;
pub mod table_data;
pub mod toc;

pub use config::PreprocessConfig;
pub use error::{EventError, PreprocessError};
pub use events::{
    Listener, ListenerFuture, ScopedSubscription, TableDataRequest, TraversalEvent,
    TraversalEventBus,
};
pub use preprocess::{DocumentPreprocessor, PreprocessedDocument, PreprocessorBuilder};
pub use references::{ReferenceRecord, ReferenceRegistry};
pub use table_data::row_provider_listener;
pub use toc::{TocAssembler, TocRecord};

pub use docprep_idf::{
    ContainerNode, ImageNode, ImageSource, LeafNode, ListNode, Node, NodeMetadata, Outline,
    TableCell, TableNode, TextContent, TextNode, TocEntry, TocNode, WrapperNode,
};
pub use docprep_source::{
    ColumnSpec, DataSource, InMemoryRowProvider, IteratorDataSource, RowProvider, SourceError,
    TableQuery, VecDataSource,
};
pub use docprep_types::{DEFAULT_TOC_ID, NodeId, TocId};
