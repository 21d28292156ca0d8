//! Table-of-contents aggregation.
//!
//! Items declare membership through `tocItem` anywhere in the tree, before or
//! after the `toc` node they belong to. Records are keyed by TOC id; a record
//! created by an item is a pseudo record until a `toc` node claims it. Once
//! the whole document has been traversed, `assemble` sorts every claimed
//! record and inserts section headers where requested.

use crate::config::PreprocessConfig;
use crate::error::PreprocessError;
use docprep_idf::{Node, SECTION_HEADER_PROP, TextNode, TocEntry};
use docprep_types::TocId;
use indexmap::IndexMap;
use log::debug;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
pub struct TocRecord {
    pub toc_id: TocId,
    pub title: Option<Node>,
    pub items: Vec<TocEntry>,
    pub show_section_headers: bool,
    is_pseudo: bool,
}

impl TocRecord {
    fn pseudo(toc_id: TocId) -> Self {
        Self {
            toc_id,
            title: None,
            items: Vec::new(),
            show_section_headers: false,
            is_pseudo: true,
        }
    }

    pub fn is_pseudo(&self) -> bool {
        self.is_pseudo
    }

    /// Displayed text of every entry, headers included, in order.
    pub fn entry_texts(&self) -> Vec<String> {
        self.items.iter().map(|e| e.node().plain_text()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TocAssembler {
    records: IndexMap<TocId, TocRecord>,
    assembled: bool,
}

impl TocAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `node` to the items of `toc_id`, creating a pseudo record if
    /// no TOC with that id has been seen yet.
    pub fn add_item(&mut self, toc_id: &TocId, node: Node) {
        self.records
            .entry(toc_id.clone())
            .or_insert_with(|| TocRecord::pseudo(toc_id.clone()))
            .items
            .push(TocEntry::Item(node));
    }

    /// Makes `toc_id` concrete, adopting any items declared so far.
    ///
    /// # Errors
    ///
    /// Returns `PreprocessError::DuplicateTocIdentifier` if a `toc` node
    /// already claimed `toc_id`.
    pub fn claim(
        &mut self,
        toc_id: &TocId,
        title: Option<Node>,
        show_section_headers: bool,
    ) -> Result<(), PreprocessError> {
        let record = self
            .records
            .entry(toc_id.clone())
            .or_insert_with(|| TocRecord::pseudo(toc_id.clone()));
        if !record.is_pseudo {
            return Err(PreprocessError::DuplicateTocIdentifier(toc_id.clone()));
        }
        debug!(
            "Claimed TOC '{}' with {} pending item(s)",
            toc_id,
            record.items.len()
        );
        record.is_pseudo = false;
        record.title = title;
        record.show_section_headers = show_section_headers;
        Ok(())
    }

    /// Sorts every claimed record by displayed text and inserts section
    /// headers where requested. Pseudo records are left untouched. Calling
    /// this more than once has no further effect.
    pub fn assemble(&mut self, config: &PreprocessConfig) {
        if self.assembled {
            return;
        }
        for record in self.records.values_mut().filter(|r| !r.is_pseudo) {
            sort_entries(&mut record.items);
            if record.show_section_headers {
                record.items = insert_section_headers(std::mem::take(&mut record.items), config);
            }
            debug!(
                "Assembled TOC '{}': {} entries",
                record.toc_id,
                record.items.len()
            );
        }
        self.assembled = true;
    }

    pub fn get(&self, toc_id: &str) -> Option<&TocRecord> {
        self.records.get(toc_id)
    }

    /// True if items point at `toc_id` but no `toc` node claimed it.
    pub fn is_orphan(&self, toc_id: &str) -> bool {
        self.get(toc_id).is_some_and(|r| r.is_pseudo)
    }

    pub fn orphans(&self) -> impl Iterator<Item = &TocId> {
        self.records
            .iter()
            .filter(|(_, r)| r.is_pseudo)
            .map(|(id, _)| id)
    }

    /// Iterates records in the order their ids were first seen.
    pub fn iter(&self) -> impl Iterator<Item = &TocRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Stable ordinal sort by displayed text.
fn sort_entries(items: &mut [TocEntry]) {
    items.sort_by_cached_key(|e| e.node().plain_text());
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Numeric,
    Letter(char),
}

/// Inserts a header before the first item of every section in one left to
/// right pass. `items` must already be sorted.
///
/// A digit-leading first item opens the numeric section. Later digits only
/// stay in that section while it is the current one; after a letter section
/// a digit opens a section named after itself.
fn insert_section_headers(items: Vec<TocEntry>, config: &PreprocessConfig) -> Vec<TocEntry> {
    let mut out: Vec<TocEntry> = Vec::with_capacity(items.len() * 2);
    let mut section: Option<Section> = None;

    for (index, entry) in items.into_iter().enumerate() {
        let Some(lead) = entry.node().plain_text().chars().next() else {
            out.push(entry);
            continue;
        };

        if index == 0 && lead.is_ascii_digit() {
            out.push(section_header(&config.numeric_section_label));
            section = Some(Section::Numeric);
        } else {
            let upper = lead.to_uppercase().next().unwrap_or(lead);
            let unchanged = match section {
                Some(Section::Numeric) => lead.is_ascii_digit(),
                Some(Section::Letter(current)) => current == upper,
                None => false,
            };
            if !unchanged {
                if let Some(previous) = out.last_mut() {
                    ensure_bottom_margin(previous.node_mut(), config.section_header_gap);
                }
                out.push(section_header(&upper.to_string()));
                section = Some(Section::Letter(upper));
            }
        }
        out.push(entry);
    }
    out
}

fn section_header(label: &str) -> TocEntry {
    let mut header = TextNode::plain(label);
    header
        .meta
        .props
        .insert(SECTION_HEADER_PROP.into(), Value::Bool(true));
    TocEntry::SectionHeader(Node::Text(header))
}

/// Raises the node's bottom margin to at least `gap`, honouring whichever
/// margin form it already uses.
fn ensure_bottom_margin(node: &mut Node, gap: f64) {
    let props = &mut node.meta_mut().props;
    if let Some(Value::Array(margin)) = props.get_mut("margin") {
        if margin.len() == 4 {
            let bottom = margin[3].as_f64().unwrap_or(0.0);
            margin[3] = json!(bottom.max(gap));
            return;
        }
    }
    if let Some(all) = props.get("margin").and_then(Value::as_f64) {
        props.insert("margin".into(), json!([all, all, all, all.max(gap)]));
        return;
    }
    let bottom = props
        .get("marginBottom")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    props.insert("marginBottom".into(), json!(bottom.max(gap)));
}
