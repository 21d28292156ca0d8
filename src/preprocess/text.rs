//! Handlers for text, TOC and leaf nodes.

use super::Normalizer;
use super::shorthand::{Object, is_truthy, number_text};
use crate::error::PreprocessError;
use docprep_idf::{
    ImageNode, ImageSource, LeafNode, Node, NodeMetadata, TextContent, TextNode, TocNode,
};
use docprep_types::{NodeId, TocId};
use serde_json::Value;

impl Normalizer<'_> {
    /// Normalizes a text node and registers it under its id and TOCs.
    ///
    /// A `pageReference` replaces the content with the page placeholder; a
    /// `textReference` replaces it with nothing. Either way the target only
    /// needs to exist by the end of the run.
    pub(super) async fn text(
        &mut self,
        mut obj: Object,
        mut meta: NodeMetadata,
    ) -> Result<Node, PreprocessError> {
        let raw = obj.remove("text").unwrap_or(Value::Null);
        let page_target = take_reference(&mut obj, "pageReference")?;
        let text_target = take_reference(&mut obj, "textReference")?;

        let page_reference = page_target.map(|id| self.references.reference(&id));
        let text_reference = text_target.map(|id| self.references.reference(&id));

        let content = if text_reference.is_some() {
            TextContent::Plain(String::new())
        } else if page_reference.is_some() {
            TextContent::Plain(self.config.page_reference_placeholder.clone())
        } else {
            self.text_content(raw).await?
        };

        if let Some(outline) = meta.outline.as_mut() {
            if outline.text.is_none() {
                outline.text = Some(content.plain_text());
            }
        }
        meta.props = obj;

        let node = Node::Text(TextNode {
            meta,
            content,
            page_reference,
            text_reference,
        });

        for toc_id in &node.meta().toc_item {
            self.tocs.add_item(toc_id, node.clone());
        }
        if let Some(id) = &node.meta().id {
            self.references.declare(id, &node)?;
        }
        Ok(node)
    }

    /// Plain strings stay as they are; a nested description or a sequence of
    /// them becomes inline children. A nested object is normalized like any
    /// other node, so one that declares no kind is rejected.
    async fn text_content(&mut self, raw: Value) -> Result<TextContent, PreprocessError> {
        Ok(match raw {
            Value::Null => TextContent::Plain(String::new()),
            Value::String(s) => TextContent::Plain(s),
            Value::Number(n) => TextContent::Plain(number_text(&n)),
            Value::Bool(b) => TextContent::Plain(b.to_string()),
            Value::Array(items) => TextContent::Inline(self.normalize_children(items).await?),
            nested @ Value::Object(_) => TextContent::Inline(vec![self.normalize_node(nested).await?]),
        })
    }

    /// Normalizes a `toc` node and claims its id. The items are filled in
    /// after the descent; authored `items` are discarded.
    pub(super) async fn toc(
        &mut self,
        mut obj: Object,
        mut meta: NodeMetadata,
    ) -> Result<Node, PreprocessError> {
        let mut spec = match obj.remove("toc") {
            Some(Value::Object(spec)) => spec,
            Some(other) => {
                return Err(PreprocessError::malformed(
                    "toc",
                    format!("expected an object, got {}", other),
                ));
            }
            None => Object::new(),
        };

        let toc_id = match spec.remove("id") {
            Some(Value::String(s)) if !s.is_empty() => TocId::from(s),
            Some(Value::Number(n)) => TocId::from(number_text(&n)),
            _ => self.default_toc.clone(),
        };
        let title = match spec.remove("title") {
            Some(title) if is_truthy(&title) => Some(Box::new(self.normalize_node(title).await?)),
            _ => None,
        };
        let show_section_headers = spec
            .remove("showSectionHeaders")
            .is_some_and(|v| is_truthy(&v));
        spec.remove("items");

        self.tocs
            .claim(&toc_id, title.as_deref().cloned(), show_section_headers)?;

        meta.props = obj;
        Ok(Node::Toc(TocNode {
            meta,
            toc_id,
            title,
            show_section_headers,
            toc_props: spec,
            items: Vec::new(),
        }))
    }
}

fn take_reference(obj: &mut Object, key: &'static str) -> Result<Option<NodeId>, PreprocessError> {
    match obj.remove(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(Some(NodeId::from(s))),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Ok(Some(NodeId::from(number_text(&n)))),
        Some(v) if is_truthy(&v) => Err(PreprocessError::malformed(
            key,
            format!("target must be a node id, got {}", v),
        )),
        _ => Ok(None),
    }
}

/// Image payloads are either a serialized byte buffer
/// (`{ "type": "Buffer", "data": [...] }`) or a reference resolved by the
/// renderer, such as a file name or a data URL.
pub(super) fn image(mut obj: Object, mut meta: NodeMetadata) -> Result<Node, PreprocessError> {
    let image = obj.remove("image").unwrap_or(Value::Null);
    let source = match image {
        Value::Object(buffer)
            if buffer.get("type").and_then(Value::as_str) == Some("Buffer")
                && buffer.get("data").is_some_and(Value::is_array) =>
        {
            let data = buffer.get("data").and_then(Value::as_array).map_or(&[][..], Vec::as_slice);
            let bytes = data
                .iter()
                .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(|| PreprocessError::malformed("image", "buffer data must be bytes"))?;
            ImageSource::Bytes(bytes)
        }
        other => ImageSource::Reference(other),
    };
    meta.props = obj;
    Ok(Node::Image(ImageNode { meta, source }))
}

/// Canvas and QR payloads pass through untouched.
pub(super) fn leaf(mut obj: Object, mut meta: NodeMetadata, kind: &'static str) -> Node {
    let payload = obj.remove(kind).unwrap_or(Value::Null);
    meta.props = obj;
    let leaf = LeafNode { meta, payload };
    if kind == "qr" {
        Node::Qr(leaf)
    } else {
        Node::Canvas(leaf)
    }
}
