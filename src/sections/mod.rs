//! Sections module - grouping the flat prompt list into a navigable tree
//!
//! # Module Structure
//!
//! - `divider` - Name → section / sub-section / plain classification
//! - `tree` - Single-pass tree builder, tree queries and filtering
//! - `collapse` - Persisted open/closed state per section

mod collapse;
mod divider;
mod tree;

pub use collapse::CollapseStateStore;
pub use divider::{
    split_custom_patterns, DividerInfo, DividerKind, DividerParser, BUILTIN_SECTION_PATTERNS,
    DEFAULT_SECTION_NAME, DEFAULT_SUB_SECTION_NAME,
};
pub use tree::{
    collect_keys, filter_sections, find_section, SectionNode, SectionTreeBuilder, ALL_SECTION_ID,
    UNGROUPED_SECTION_ID,
};
