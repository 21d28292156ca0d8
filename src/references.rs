//! The per-document table of node identifiers.
//!
//! A record is created by whichever side is seen first: the node declaring
//! `id`, or a node referring to it through `pageReference`/`textReference`.
//! A referrer seen first leaves a pseudo record that the declaring node later
//! claims. Referrers keep only the identifier; the layout stage resolves it
//! through this registry once page numbers are known.

use crate::error::PreprocessError;
use docprep_idf::Node;
use docprep_types::NodeId;
use indexmap::IndexMap;
use indexmap::map::Entry;
use log::trace;

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRecord {
    owner: Option<Node>,
    is_pseudo: bool,
}

impl ReferenceRecord {
    fn pseudo() -> Self {
        Self {
            owner: None,
            is_pseudo: true,
        }
    }

    fn bound(node: &Node) -> Self {
        Self {
            owner: Some(node.clone()),
            is_pseudo: false,
        }
    }

    /// A snapshot of the node bound to this identifier, if any.
    pub fn owner(&self) -> Option<&Node> {
        self.owner.as_ref()
    }

    pub fn is_pseudo(&self) -> bool {
        self.is_pseudo
    }

    /// The text a `textReference` to this record displays.
    pub fn resolved_text(&self) -> Option<String> {
        self.owner.as_ref().map(Node::plain_text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceRegistry {
    records: IndexMap<NodeId, ReferenceRecord>,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `id` to `node`.
    ///
    /// # Errors
    ///
    /// Returns `PreprocessError::DuplicateIdentifier` if another node already
    /// holds a concrete binding for `id`.
    pub fn declare(&mut self, id: &NodeId, node: &Node) -> Result<(), PreprocessError> {
        match self.records.entry(id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(ReferenceRecord::bound(node));
            }
            Entry::Occupied(mut slot) => {
                if !slot.get().is_pseudo {
                    return Err(PreprocessError::DuplicateIdentifier(id.clone()));
                }
                trace!("Binding forward reference '{}'", id);
                *slot.get_mut() = ReferenceRecord::bound(node);
            }
        }
        Ok(())
    }

    /// Records a reference to `id`, creating a pseudo record if the target
    /// has not been seen yet. Returns the key the referrer links through.
    pub fn reference(&mut self, id: &NodeId) -> NodeId {
        self.records
            .entry(id.clone())
            .or_insert_with(ReferenceRecord::pseudo);
        id.clone()
    }

    pub fn get(&self, id: &str) -> Option<&ReferenceRecord> {
        self.records.get(id)
    }

    /// True if `id` is bound to a concrete node.
    pub fn is_resolved(&self, id: &str) -> bool {
        self.get(id).is_some_and(|r| !r.is_pseudo)
    }

    /// Identifiers that were referenced but never declared.
    pub fn unresolved(&self) -> Vec<&NodeId> {
        self.records
            .iter()
            .filter(|(_, r)| r.is_pseudo)
            .map(|(id, _)| id)
            .collect()
    }

    /// Iterates records in the order their identifiers were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &ReferenceRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_then_duplicate_fails() {
        let mut registry = ReferenceRegistry::new();
        let id = NodeId::new("intro");
        registry.declare(&id, &Node::text("Introduction")).unwrap();

        let err = registry.declare(&id, &Node::text("Again")).unwrap_err();
        assert!(matches!(err, PreprocessError::DuplicateIdentifier(ref dup) if dup == &id));
        assert_eq!(
            registry.get("intro").and_then(|r| r.resolved_text()),
            Some("Introduction".to_string())
        );
    }

    #[test]
    fn test_forward_reference_is_claimed() {
        let mut registry = ReferenceRegistry::new();
        let id = NodeId::new("summary");

        let link = registry.reference(&id);
        assert_eq!(link, id);
        assert!(!registry.is_resolved("summary"));
        assert_eq!(registry.unresolved(), vec![&id]);

        registry.declare(&id, &Node::text("Summary")).unwrap();
        assert!(registry.is_resolved("summary"));
        assert!(registry.unresolved().is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reference_to_known_id_keeps_binding() {
        let mut registry = ReferenceRegistry::new();
        let id = NodeId::new("fig");
        registry.declare(&id, &Node::text("Figure")).unwrap();
        registry.reference(&id);
        registry.reference(&id);

        let record = registry.get("fig").unwrap();
        assert!(!record.is_pseudo());
        assert_eq!(record.owner(), Some(&Node::text("Figure")));
    }
}
