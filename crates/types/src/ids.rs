//! Newtype wrappers for document identifiers
//!
//! Node ids (targets of `pageReference`/`textReference`) and TOC ids live in
//! separate namespaces. Keeping them as distinct types prevents a TOC id from
//! being looked up in the reference registry and vice versa.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifier used by a TOC that does not declare one, and by `tocItem`
/// entries that are not strings.
pub const DEFAULT_TOC_ID: &str = "_default_";

/// The identifier of a node that other nodes may reference.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Creates a new NodeId from a string
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this node ID
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identifier of a table of contents.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TocId(Arc<str>);

impl TocId {
    /// Creates a new TocId from a string
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// The id shared by every TOC and `tocItem` that does not name one.
    pub fn default_id() -> Self {
        Self::new(DEFAULT_TOC_ID)
    }

    /// Returns the string representation of this TOC ID
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        &*self.0 == DEFAULT_TOC_ID
    }
}

impl Default for TocId {
    fn default() -> Self {
        Self::default_id()
    }
}

impl From<String> for TocId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for TocId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for TocId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TocId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_creation() {
        let id1 = NodeId::new("chapter-1");
        let id2 = NodeId::from("chapter-1");
        let id3 = NodeId::from(String::from("chapter-1"));

        assert_eq!(id1, id2);
        assert_eq!(id2, id3);
        assert_eq!(id1.as_str(), "chapter-1");
        assert_eq!(id1.to_string(), "chapter-1");
    }

    #[test]
    fn test_default_toc_id() {
        let toc = TocId::default();
        assert!(toc.is_default());
        assert_eq!(toc.as_str(), "_default_");
        assert!(!TocId::from("appendix").is_default());
    }

    #[test]
    fn test_borrowed_lookup() {
        use std::collections::HashMap;

        let mut anchors = HashMap::new();
        anchors.insert(NodeId::new("intro"), 1);
        anchors.insert(NodeId::new("summary"), 2);

        assert_eq!(anchors.get("intro"), Some(&1));
        assert_eq!(anchors.get(&NodeId::new("summary")), Some(&2));
        assert_eq!(anchors.get("missing"), None);
    }
}
