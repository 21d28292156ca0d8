//! Intermediate Document Format (IDF)
//! This crate defines the canonical, in-memory node tree a document
//! description is rewritten into. Every shorthand form accepted at the input
//! boundary has been eliminated by the time a tree is expressed in these types.

use docprep_types::{NodeId, TocId};
use serde_json::{Map, Value};

mod value;

/// Author properties the normalizer does not interpret (styles, margins,
/// widths, ...). They travel with the node untouched.
pub type Props = Map<String, Value>;

/// Property set on synthetic TOC section-header nodes.
pub const SECTION_HEADER_PROP: &str = "tocSectionHeader";

/// A common metadata structure carried by every node kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeMetadata {
    pub id: Option<NodeId>,
    /// TOCs this node contributes itself to.
    pub toc_item: Vec<TocId>,
    pub outline: Option<Outline>,
    pub props: Props,
}

/// A resolved outline (bookmark) declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub level: u32,
    pub text: Option<String>,
    pub props: Props,
}

// --- Main Node Enum ---

/// A canonical document node. A node is exactly one kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(TextNode),
    /// A vertical stack.
    Stack(ContainerNode),
    /// Horizontal columns.
    Columns(ContainerNode),
    /// A content block laid out over `column_count` columns.
    Wrapper(WrapperNode),
    List(ListNode),
    Table(TableNode),
    Image(ImageNode),
    Canvas(LeafNode),
    Qr(LeafNode),
    Toc(TocNode),
}

impl Node {
    /// Creates a plain text node.
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(TextNode::plain(content))
    }

    pub fn meta(&self) -> &NodeMetadata {
        match self {
            Node::Text(n) => &n.meta,
            Node::Stack(n) | Node::Columns(n) => &n.meta,
            Node::Wrapper(n) => &n.meta,
            Node::List(n) => &n.meta,
            Node::Table(n) => &n.meta,
            Node::Image(n) => &n.meta,
            Node::Canvas(n) | Node::Qr(n) => &n.meta,
            Node::Toc(n) => &n.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut NodeMetadata {
        match self {
            Node::Text(n) => &mut n.meta,
            Node::Stack(n) | Node::Columns(n) => &mut n.meta,
            Node::Wrapper(n) => &mut n.meta,
            Node::List(n) => &mut n.meta,
            Node::Table(n) => &mut n.meta,
            Node::Image(n) => &mut n.meta,
            Node::Canvas(n) | Node::Qr(n) => &mut n.meta,
            Node::Toc(n) => &mut n.meta,
        }
    }

    /// Returns a string identifier for the node kind, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Text(_) => "text",
            Node::Stack(_) => "stack",
            Node::Columns(_) => "columns",
            Node::Wrapper(_) => "wrapper",
            Node::List(l) if l.ordered => "ol",
            Node::List(_) => "ul",
            Node::Table(_) => "table",
            Node::Image(_) => "image",
            Node::Canvas(_) => "canvas",
            Node::Qr(_) => "qr",
            Node::Toc(_) => "toc",
        }
    }

    /// The text this node displays. Only text nodes display text of their own.
    pub fn plain_text(&self) -> String {
        match self {
            Node::Text(t) => t.content.plain_text(),
            _ => String::new(),
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_toc(&self) -> Option<&TocNode> {
        match self {
            Node::Toc(t) => Some(t),
            _ => None,
        }
    }

    /// Visits this node and every node nested below it, parents first.
    ///
    /// Inline text fragments, table cells and TOC titles are visited;
    /// assembled TOC entries are not, since they are copies of tree nodes.
    pub fn walk_mut<F: FnMut(&mut Node)>(&mut self, f: &mut F) {
        f(self);
        match self {
            Node::Text(t) => {
                if let TextContent::Inline(children) = &mut t.content {
                    children.iter_mut().for_each(|c| c.walk_mut(f));
                }
            }
            Node::Stack(c) | Node::Columns(c) => c.children.iter_mut().for_each(|n| n.walk_mut(f)),
            Node::Wrapper(w) => w.content.iter_mut().for_each(|n| n.walk_mut(f)),
            Node::List(l) => l.items.iter_mut().for_each(|n| n.walk_mut(f)),
            Node::Table(t) => {
                for cell in t.body.iter_mut().flatten() {
                    if let TableCell::Content(node) = cell {
                        node.walk_mut(f);
                    }
                }
            }
            Node::Toc(toc) => {
                if let Some(title) = toc.title.as_deref_mut() {
                    title.walk_mut(f);
                }
            }
            Node::Image(_) | Node::Canvas(_) | Node::Qr(_) => {}
        }
    }
}

// --- Text ---

#[derive(Debug, Clone, PartialEq)]
pub enum TextContent {
    Plain(String),
    /// Rich inline content: a sequence of normalized fragments.
    Inline(Vec<Node>),
}

impl TextContent {
    pub fn plain_text(&self) -> String {
        match self {
            TextContent::Plain(s) => s.clone(),
            TextContent::Inline(children) => children.iter().map(Node::plain_text).collect(),
        }
    }
}

impl Default for TextContent {
    fn default() -> Self {
        TextContent::Plain(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextNode {
    pub meta: NodeMetadata,
    pub content: TextContent,
    /// Target whose page number this node displays.
    pub page_reference: Option<NodeId>,
    /// Target whose text this node displays.
    pub text_reference: Option<NodeId>,
}

impl TextNode {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: TextContent::Plain(content.into()),
            ..Default::default()
        }
    }
}

// --- Containers ---

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContainerNode {
    pub meta: NodeMetadata,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WrapperNode {
    pub meta: NodeMetadata,
    pub column_count: u32,
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListNode {
    pub meta: NodeMetadata,
    pub ordered: bool,
    pub items: Vec<Node>,
}

// --- Table-specific Structures ---

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableNode {
    pub meta: NodeMetadata,
    /// Properties of the `table` object other than `body` (widths, headerRows, ...).
    pub table_props: Props,
    pub body: Vec<Vec<TableCell>>,
}

impl TableNode {
    pub fn header_rows(&self) -> usize {
        self.table_props
            .get("headerRows")
            .and_then(Value::as_u64)
            .map_or(0, |n| n as usize)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableCell {
    Content(Node),
    /// A row/column span continuation marker, kept as authored.
    Span(Props),
}

impl TableCell {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            TableCell::Content(n) => Some(n),
            TableCell::Span(_) => None,
        }
    }
}

// --- Leaves ---

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Raw image bytes decoded from a serialized buffer.
    Bytes(Vec<u8>),
    /// A name, path or data URI, resolved by a later stage.
    Reference(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    pub meta: NodeMetadata,
    pub source: ImageSource,
}

/// A node whose payload is opaque to normalization (canvas drawings, QR text).
#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    pub meta: NodeMetadata,
    pub payload: Value,
}

// --- Table of contents ---

#[derive(Debug, Clone, PartialEq)]
pub enum TocEntry {
    Item(Node),
    SectionHeader(Node),
}

impl TocEntry {
    pub fn node(&self) -> &Node {
        match self {
            TocEntry::Item(n) | TocEntry::SectionHeader(n) => n,
        }
    }

    pub fn node_mut(&mut self) -> &mut Node {
        match self {
            TocEntry::Item(n) | TocEntry::SectionHeader(n) => n,
        }
    }

    pub fn is_section_header(&self) -> bool {
        matches!(self, TocEntry::SectionHeader(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TocNode {
    pub meta: NodeMetadata,
    pub toc_id: TocId,
    pub title: Option<Box<Node>>,
    pub show_section_headers: bool,
    /// Properties of the `toc` object other than the ones above.
    pub toc_props: Props,
    /// Assembled entries, filled in once the whole document has been traversed.
    pub items: Vec<TocEntry>,
}
