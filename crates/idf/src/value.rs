//! Rendering of canonical nodes back into the author-facing JSON shape.
//!
//! The output is itself valid normalizer input: re-normalizing it yields an
//! equal tree.

use crate::{
    ImageSource, Node, NodeMetadata, Outline, Props, TableCell, TextContent, TocEntry,
};
use serde_json::{Value, json};

impl Node {
    /// Renders this node as a JSON object in the author-facing format.
    pub fn to_value(&self) -> Value {
        let mut obj = meta_to_props(self.meta());
        match self {
            Node::Text(t) => {
                let text = match &t.content {
                    TextContent::Plain(s) => Value::String(s.clone()),
                    TextContent::Inline(children) => nodes_to_value(children),
                };
                obj.insert("text".into(), text);
                if let Some(target) = &t.page_reference {
                    obj.insert("pageReference".into(), json!(target.as_str()));
                }
                if let Some(target) = &t.text_reference {
                    obj.insert("textReference".into(), json!(target.as_str()));
                }
            }
            Node::Stack(c) => {
                obj.insert("stack".into(), nodes_to_value(&c.children));
            }
            Node::Columns(c) => {
                obj.insert("columns".into(), nodes_to_value(&c.children));
            }
            Node::Wrapper(w) => {
                obj.insert("columnCount".into(), json!(w.column_count));
                obj.insert("content".into(), nodes_to_value(&w.content));
            }
            Node::List(l) => {
                let key = if l.ordered { "ol" } else { "ul" };
                obj.insert(key.into(), nodes_to_value(&l.items));
            }
            Node::Table(t) => {
                let mut table = t.table_props.clone();
                let body = t
                    .body
                    .iter()
                    .map(|row| Value::Array(row.iter().map(cell_to_value).collect()))
                    .collect();
                table.insert("body".into(), Value::Array(body));
                obj.insert("table".into(), Value::Object(table));
            }
            Node::Image(img) => {
                let image = match &img.source {
                    ImageSource::Bytes(bytes) => json!({ "type": "Buffer", "data": bytes }),
                    ImageSource::Reference(v) => v.clone(),
                };
                obj.insert("image".into(), image);
            }
            Node::Canvas(leaf) => {
                obj.insert("canvas".into(), leaf.payload.clone());
            }
            Node::Qr(leaf) => {
                obj.insert("qr".into(), leaf.payload.clone());
            }
            Node::Toc(toc) => {
                let mut spec = toc.toc_props.clone();
                spec.insert("id".into(), json!(toc.toc_id.as_str()));
                if let Some(title) = &toc.title {
                    spec.insert("title".into(), title.to_value());
                }
                if toc.show_section_headers {
                    spec.insert("showSectionHeaders".into(), Value::Bool(true));
                }
                if !toc.items.is_empty() {
                    let items = toc.items.iter().map(|e| e.node().to_value()).collect();
                    spec.insert("items".into(), Value::Array(items));
                }
                obj.insert("toc".into(), Value::Object(spec));
            }
        }
        Value::Object(obj)
    }
}

impl TocEntry {
    pub fn to_value(&self) -> Value {
        self.node().to_value()
    }
}

fn nodes_to_value(nodes: &[Node]) -> Value {
    Value::Array(nodes.iter().map(Node::to_value).collect())
}

fn cell_to_value(cell: &TableCell) -> Value {
    match cell {
        TableCell::Content(node) => node.to_value(),
        TableCell::Span(marker) => Value::Object(marker.clone()),
    }
}

fn meta_to_props(meta: &NodeMetadata) -> Props {
    let mut obj = meta.props.clone();
    if let Some(id) = &meta.id {
        obj.insert("id".into(), json!(id.as_str()));
    }
    if !meta.toc_item.is_empty() {
        let ids = meta.toc_item.iter().map(|t| json!(t.as_str())).collect();
        obj.insert("tocItem".into(), Value::Array(ids));
    }
    if let Some(outline) = &meta.outline {
        obj.insert("outline".into(), outline_to_value(outline));
    }
    obj
}

fn outline_to_value(outline: &Outline) -> Value {
    let mut obj = outline.props.clone();
    obj.insert("level".into(), json!(outline.level));
    if let Some(text) = &outline.text {
        obj.insert("text".into(), json!(text));
    }
    Value::Object(obj)
}
