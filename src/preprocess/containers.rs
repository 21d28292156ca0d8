//! Handlers for nodes whose payload is a sequence of child nodes.

use super::Normalizer;
use super::shorthand::{Object, take_sequence};
use crate::error::PreprocessError;
use docprep_idf::{ContainerNode, ListNode, Node, NodeMetadata, WrapperNode};
use serde_json::Value;

impl Normalizer<'_> {
    pub(super) async fn columns(
        &mut self,
        mut obj: Object,
        mut meta: NodeMetadata,
    ) -> Result<Node, PreprocessError> {
        let items = take_sequence(&mut obj, "columns", "columns")?;
        let children = self.normalize_children(items).await?;
        meta.props = obj;
        Ok(Node::Columns(ContainerNode { meta, children }))
    }

    pub(super) async fn stack(
        &mut self,
        mut obj: Object,
        mut meta: NodeMetadata,
    ) -> Result<Node, PreprocessError> {
        let items = take_sequence(&mut obj, "stack", "stack")?;
        let children = self.normalize_children(items).await?;
        meta.props = obj;
        Ok(Node::Stack(ContainerNode { meta, children }))
    }

    pub(super) async fn list(
        &mut self,
        mut obj: Object,
        mut meta: NodeMetadata,
        ordered: bool,
    ) -> Result<Node, PreprocessError> {
        let key = if ordered { "ol" } else { "ul" };
        let items = take_sequence(&mut obj, key, key)?;
        let items = self.normalize_children(items).await?;
        meta.props = obj;
        Ok(Node::List(ListNode {
            meta,
            ordered,
            items,
        }))
    }

    /// A block flowed across `columnCount` columns. Its children live under
    /// `content`; a single non-sequence child is accepted as-is.
    pub(super) async fn wrapper(
        &mut self,
        mut obj: Object,
        mut meta: NodeMetadata,
    ) -> Result<Node, PreprocessError> {
        let column_count = obj
            .remove("columnCount")
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                PreprocessError::malformed("columnCount", "column count must be a positive integer")
            })?;
        let items = match obj.remove("content") {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => Vec::new(),
            Some(single) => vec![single],
        };
        let content = self.normalize_children(items).await?;
        meta.props = obj;
        Ok(Node::Wrapper(WrapperNode {
            meta,
            column_count,
            content,
        }))
    }
}
