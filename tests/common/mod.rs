#![allow(dead_code)]

use docprep::{DocumentPreprocessor, Node, PreprocessError, PreprocessedDocument};
use serde_json::Value;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Normalize a document with the default configuration
pub fn preprocess(input: Value) -> Result<PreprocessedDocument, PreprocessError> {
    init_logging();
    DocumentPreprocessor::default().preprocess_blocking(input)
}

/// Children of a stack root, panicking on any other root kind
pub fn stack_children(doc: &PreprocessedDocument) -> &[Node] {
    match &doc.root {
        Node::Stack(stack) => &stack.children,
        other => panic!("expected a stack root, got {}", other.kind()),
    }
}

/// Displayed text of every entry of the first toc node under the root
pub fn toc_entry_texts(doc: &PreprocessedDocument) -> Vec<String> {
    find_toc(&doc.root)
        .map(|toc| toc.items.iter().map(|e| e.node().plain_text()).collect())
        .unwrap_or_default()
}

pub fn find_toc(node: &Node) -> Option<&docprep::TocNode> {
    match node {
        Node::Toc(toc) => Some(toc),
        Node::Stack(c) | Node::Columns(c) => c.children.iter().find_map(find_toc),
        Node::Wrapper(w) => w.content.iter().find_map(find_toc),
        Node::List(l) => l.items.iter().find_map(find_toc),
        _ => None,
    }
}
