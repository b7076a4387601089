//! Section tree building from the flat prompt list
//!
//! The builder walks the list once, left to right, keeping a cursor on the
//! current section and the current sub-section. Trees are rebuilt from
//! scratch on every call and carry no state between calls.

use serde::Serialize;
use tracing::{debug, instrument};

use super::divider::{DividerKind, DividerParser};
use crate::config::{DEFAULT_ALL_SECTION_NAME, DEFAULT_UNGROUPED_SECTION_NAME};
use crate::host::PromptEntry;
use crate::search::{self, SearchDoc};

pub const UNGROUPED_SECTION_ID: &str = "section-ungrouped";
pub const ALL_SECTION_ID: &str = "section-all";

/// One node of the section tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionNode {
    /// Stable within one build: derived from the header entry identifier
    pub id: String,
    /// Display name with markers stripped
    pub name: String,
    /// Raw header text, the identity used for collapse state
    pub original_key: String,
    pub is_sub_section: bool,
    pub header_entry: Option<PromptEntry>,
    pub entries: Vec<PromptEntry>,
    pub sub_sections: Vec<SectionNode>,
}

impl SectionNode {
    fn from_header(entry: &PromptEntry, clean_name: String, is_sub_section: bool) -> Self {
        let prefix = if is_sub_section { "sub" } else { "section" };
        SectionNode {
            id: format!("{}-{}", prefix, entry.identifier),
            name: clean_name,
            original_key: entry.name.clone(),
            is_sub_section,
            header_entry: Some(entry.clone()),
            entries: Vec::new(),
            sub_sections: Vec::new(),
        }
    }

    fn synthetic(id: &str, name: &str, entries: Vec<PromptEntry>) -> Self {
        SectionNode {
            id: id.to_string(),
            name: name.to_string(),
            original_key: name.to_string(),
            is_sub_section: false,
            header_entry: None,
            entries,
            sub_sections: Vec::new(),
        }
    }

    /// Content entries of this node and all nested sub-sections, headers excluded
    pub fn all_entries(&self) -> Vec<&PromptEntry> {
        let mut out: Vec<&PromptEntry> = self.entries.iter().collect();
        for sub in &self.sub_sections {
            out.extend(sub.all_entries());
        }
        out
    }

    pub fn total_count(&self) -> usize {
        self.entries.len()
            + self
                .sub_sections
                .iter()
                .map(SectionNode::total_count)
                .sum::<usize>()
    }

    pub fn enabled_count(&self) -> usize {
        self.all_entries().iter().filter(|e| e.enabled).count()
    }

    /// Every identifier placed in this subtree, header entries included
    pub fn identifiers(&self) -> Vec<&str> {
        let mut out = Vec::new();
        if let Some(header) = &self.header_entry {
            out.push(header.identifier.as_str());
        }
        out.extend(self.entries.iter().map(|e| e.identifier.as_str()));
        for sub in &self.sub_sections {
            out.extend(sub.identifiers());
        }
        out
    }
}

/// Find a node anywhere in `nodes` by its `id`
pub fn find_section<'a>(nodes: &'a [SectionNode], id: &str) -> Option<&'a SectionNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_section(&node.sub_sections, id) {
            return Some(found);
        }
    }
    None
}

/// Collapse keys of every node, depth-first
pub fn collect_keys(nodes: &[SectionNode]) -> Vec<String> {
    let mut keys = Vec::new();
    for node in nodes {
        keys.push(node.original_key.clone());
        keys.extend(collect_keys(&node.sub_sections));
    }
    keys
}

/// Keep only what matches `term`.
///
/// A section whose own header name matches is kept whole. Otherwise its entries are
/// filtered by relevance (name and content) and ranked, sub-sections are
/// filtered recursively, and the section disappears when nothing is left.
pub fn filter_sections(nodes: &[SectionNode], term: &str) -> Vec<SectionNode> {
    if term.trim().is_empty() {
        return nodes.to_vec();
    }
    nodes
        .iter()
        .filter_map(|node| filter_node(node, term))
        .collect()
}

fn filter_node(node: &SectionNode, term: &str) -> Option<SectionNode> {
    // Synthetic wrappers have no header of their own to match by name
    if node.header_entry.is_some() && search::score(&node.name, term) > 0 {
        return Some(node.clone());
    }

    let corpus: Vec<SearchDoc<usize>> = node
        .entries
        .iter()
        .enumerate()
        .map(|(idx, e)| SearchDoc::new(idx, format!("{} {}", e.name, e.content)))
        .collect();
    let entries: Vec<PromptEntry> = search::search(&corpus, term)
        .into_iter()
        .map(|hit| node.entries[hit.id].clone())
        .collect();
    let sub_sections = filter_sections(&node.sub_sections, term);

    if entries.is_empty() && sub_sections.is_empty() {
        return None;
    }
    Some(SectionNode {
        entries,
        sub_sections,
        ..node.clone()
    })
}

/// Where plain entries currently land
enum SubCursor {
    Attached { section: usize, sub: usize },
    /// Sub-header seen before any section; it collects entries but is never
    /// attached to the result.
    Orphan(SectionNode),
}

/// Builds section trees from the ordered prompt list
#[derive(Debug, Clone)]
pub struct SectionTreeBuilder {
    parser: DividerParser,
    ungrouped_name: String,
    all_name: String,
}

impl Default for SectionTreeBuilder {
    fn default() -> Self {
        Self::new(DividerParser::builtin())
    }
}

impl SectionTreeBuilder {
    pub fn new(parser: DividerParser) -> Self {
        SectionTreeBuilder {
            parser,
            ungrouped_name: DEFAULT_UNGROUPED_SECTION_NAME.to_string(),
            all_name: DEFAULT_ALL_SECTION_NAME.to_string(),
        }
    }

    pub fn with_synthetic_names(
        mut self,
        ungrouped_name: impl Into<String>,
        all_name: impl Into<String>,
    ) -> Self {
        self.ungrouped_name = ungrouped_name.into();
        self.all_name = all_name.into();
        self
    }

    pub fn parser(&self) -> &DividerParser {
        &self.parser
    }

    pub fn set_parser(&mut self, parser: DividerParser) {
        self.parser = parser;
    }

    #[instrument(level = "debug", skip_all, fields(entry_count = entries.len()))]
    pub fn build(&self, entries: &[PromptEntry]) -> Vec<SectionNode> {
        let mut sections: Vec<SectionNode> = Vec::new();
        let mut ungrouped: Vec<PromptEntry> = Vec::new();
        let mut current_section: Option<usize> = None;
        let mut current_sub: Option<SubCursor> = None;

        for entry in entries {
            let info = self.parser.parse(&entry.name);
            match info.kind() {
                DividerKind::Section => {
                    sections.push(SectionNode::from_header(entry, info.clean_name, false));
                    current_section = Some(sections.len() - 1);
                    current_sub = None;
                }
                DividerKind::SubSection => {
                    let node = SectionNode::from_header(entry, info.clean_name, true);
                    current_sub = Some(match current_section {
                        Some(section) => {
                            let parent = &mut sections[section];
                            parent.sub_sections.push(node);
                            SubCursor::Attached {
                                section,
                                sub: parent.sub_sections.len() - 1,
                            }
                        }
                        None => {
                            debug!(
                                header = %entry.name,
                                "Sub-section before any section, not attached"
                            );
                            SubCursor::Orphan(node)
                        }
                    });
                }
                DividerKind::Plain => match &mut current_sub {
                    Some(SubCursor::Attached { section, sub }) => {
                        sections[*section].sub_sections[*sub]
                            .entries
                            .push(entry.clone());
                    }
                    Some(SubCursor::Orphan(node)) => node.entries.push(entry.clone()),
                    None => match current_section {
                        Some(section) => sections[section].entries.push(entry.clone()),
                        None => ungrouped.push(entry.clone()),
                    },
                },
            }
        }

        if !ungrouped.is_empty() {
            sections.insert(
                0,
                SectionNode::synthetic(UNGROUPED_SECTION_ID, &self.ungrouped_name, ungrouped),
            );
        }

        if sections.is_empty() && !entries.is_empty() {
            sections.push(SectionNode::synthetic(
                ALL_SECTION_ID,
                &self.all_name,
                entries.to_vec(),
            ));
        }

        debug!(section_count = sections.len(), "Built section tree");
        sections
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
