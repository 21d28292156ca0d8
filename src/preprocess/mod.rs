//! The document normalizer.
//!
//! A [`DocumentPreprocessor`] turns an author-supplied description into a
//! canonical [`Node`] tree in one depth-first descent. Identifiers and TOC
//! memberships are collected on the way down; TOC contents are assembled and
//! written into their `toc` nodes once the whole tree has been visited, so
//! items declared after their TOC are still listed.

mod builder;
mod containers;
mod shorthand;
mod table;
mod text;

pub use builder::PreprocessorBuilder;

use crate::config::PreprocessConfig;
use crate::error::PreprocessError;
use crate::events::TraversalEventBus;
use crate::references::ReferenceRegistry;
use crate::toc::TocAssembler;
use docprep_idf::{Node, NodeMetadata};
use docprep_types::TocId;
use log::{info, trace, warn};
use serde_json::Value;
use shorthand::{Object, coerce, has_truthy, take_meta, take_outline};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

type NodeFuture<'s> = Pin<Box<dyn Future<Output = Result<Node, PreprocessError>> + Send + 's>>;

/// The result of one normalization run.
#[derive(Debug)]
pub struct PreprocessedDocument {
    /// The normalized tree. Every `toc` node carries its assembled items.
    pub root: Node,
    /// Every id seen during the run, declared or only referenced.
    pub references: ReferenceRegistry,
    /// Every TOC seen during the run, including orphans.
    pub tocs: TocAssembler,
}

impl PreprocessedDocument {
    /// Renders the normalized tree back into author format.
    pub fn to_value(&self) -> Value {
        self.root.to_value()
    }
}

/// Normalizes document descriptions. Each call to
/// [`preprocess`](Self::preprocess) starts from empty registries, so one
/// preprocessor can serve any number of documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentPreprocessor {
    config: Arc<PreprocessConfig>,
    bus: TraversalEventBus,
}

impl DocumentPreprocessor {
    pub fn new(config: PreprocessConfig, bus: TraversalEventBus) -> Self {
        Self {
            config: Arc::new(config),
            bus,
        }
    }

    pub fn builder() -> PreprocessorBuilder {
        PreprocessorBuilder::new()
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// The bus this preprocessor emits traversal events on.
    pub fn event_bus(&self) -> &TraversalEventBus {
        &self.bus
    }

    /// Normalizes `input` into a canonical tree.
    ///
    /// # Errors
    ///
    /// Any error aborts the whole document; no partial tree is returned.
    pub async fn preprocess(&self, input: Value) -> Result<PreprocessedDocument, PreprocessError> {
        let start = Instant::now();
        let mut run = Normalizer::new(&self.config, &self.bus);
        let mut root = run.normalize_node(input).await?;

        run.tocs.assemble(&self.config);
        let tocs = &run.tocs;
        root.walk_mut(&mut |node| {
            if let Node::Toc(toc) = node {
                if let Some(record) = tocs.get(toc.toc_id.as_str()) {
                    toc.items = record.items.clone();
                }
            }
        });

        for id in run.references.unresolved() {
            warn!("Reference to id '{}' has no matching node", id);
        }
        for toc_id in run.tocs.orphans() {
            warn!("TOC '{}' has items but no toc node; they will not be listed", toc_id);
        }
        info!(
            "Normalized {} node(s) in {:.2?}: {} id(s), {} TOC(s)",
            run.nodes_seen,
            start.elapsed(),
            run.references.len(),
            run.tocs.len()
        );

        Ok(PreprocessedDocument {
            root,
            references: run.references,
            tocs: run.tocs,
        })
    }

    /// Parses `json` and normalizes it.
    pub async fn preprocess_str(&self, json: &str) -> Result<PreprocessedDocument, PreprocessError> {
        let input: Value = serde_json::from_str(json)?;
        self.preprocess(input).await
    }

    /// Runs [`preprocess`](Self::preprocess) to completion on a
    /// current-thread runtime. Must not be called from within a runtime.
    pub fn preprocess_blocking(&self, input: Value) -> Result<PreprocessedDocument, PreprocessError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.preprocess(input))
    }
}

/// State of a single run. Dropped, registries aside, once the run ends.
struct Normalizer<'a> {
    config: &'a PreprocessConfig,
    bus: &'a TraversalEventBus,
    default_toc: TocId,
    references: ReferenceRegistry,
    tocs: TocAssembler,
    nodes_seen: usize,
}

impl<'a> Normalizer<'a> {
    fn new(config: &'a PreprocessConfig, bus: &'a TraversalEventBus) -> Self {
        Self {
            config,
            bus,
            default_toc: TocId::from(config.default_toc_id.as_str()),
            references: ReferenceRegistry::new(),
            tocs: TocAssembler::new(),
            nodes_seen: 0,
        }
    }

    /// Normalizes one node and, recursively, its children.
    fn normalize_node<'s>(&'s mut self, input: Value) -> NodeFuture<'s> {
        Box::pin(async move {
            self.nodes_seen += 1;
            let mut obj = coerce(input);
            let outline = take_outline(&mut obj)?;
            let mut meta = take_meta(&mut obj, &self.default_toc);
            meta.outline = outline;
            let node = self.dispatch(obj, meta).await?;
            trace!("Normalized {} node", node.kind());
            Ok(node)
        })
    }

    async fn normalize_children(&mut self, items: Vec<Value>) -> Result<Vec<Node>, PreprocessError> {
        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            nodes.push(self.normalize_node(item).await?);
        }
        Ok(nodes)
    }

    /// Picks the handler by the first kind key present, in a fixed order.
    async fn dispatch(&mut self, obj: Object, meta: NodeMetadata) -> Result<Node, PreprocessError> {
        if has_truthy(&obj, "columns") {
            self.columns(obj, meta).await
        } else if has_truthy(&obj, "columnCount") {
            self.wrapper(obj, meta).await
        } else if has_truthy(&obj, "stack") {
            self.stack(obj, meta).await
        } else if has_truthy(&obj, "ul") {
            self.list(obj, meta, false).await
        } else if has_truthy(&obj, "ol") {
            self.list(obj, meta, true).await
        } else if has_truthy(&obj, "table") {
            self.table(obj, meta).await
        } else if obj.contains_key("text")
            || has_truthy(&obj, "pageReference")
            || has_truthy(&obj, "textReference")
        {
            self.text(obj, meta).await
        } else if has_truthy(&obj, "toc") {
            self.toc(obj, meta).await
        } else if has_truthy(&obj, "image") {
            text::image(obj, meta)
        } else if has_truthy(&obj, "canvas") {
            Ok(text::leaf(obj, meta, "canvas"))
        } else if has_truthy(&obj, "qr") {
            Ok(text::leaf(obj, meta, "qr"))
        } else {
            Err(PreprocessError::UnrecognizedStructure(
                Value::Object(obj).to_string(),
            ))
        }
    }
}
