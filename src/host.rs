//! Host collaborator contract
//!
//! The organizer never owns the prompt list. The host application hands it
//! the ordered entries and performs enable/disable toggles on its behalf.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One record of the host's ordered prompt list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptEntry {
    /// Unique identifier within the list
    pub identifier: String,
    /// Display name; divider entries encode structure here
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl PromptEntry {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        PromptEntry {
            identifier: identifier.into(),
            name: name.into(),
            content: String::new(),
            enabled: false,
            role: None,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Prompt list owned by the host application
pub trait PromptHost {
    /// Current flat list in display order
    fn ordered_entries(&self) -> Vec<PromptEntry>;

    /// Identifiers currently enabled
    fn enabled_identifiers(&self) -> HashSet<String>;

    /// Enable or disable one entry. The host may react asynchronously
    /// (debounced save, re-render) after this returns.
    fn set_enabled(&mut self, identifier: &str, enabled: bool) -> anyhow::Result<()>;
}

/// Modal dialogs, abstracted so services stay testable
pub trait Dialogs {
    fn confirm(&self, message: &str) -> bool;
    /// `None` when the user cancelled
    fn prompt_text(&self, message: &str, default: &str) -> Option<String>;
}

/// Move the element at `from` to position `to`, shifting the rest.
///
/// Out-of-range indices leave the list unchanged.
pub fn reorder<T: Clone>(list: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = list.to_vec();
    if from >= out.len() || to >= out.len() || from == to {
        return out;
    }
    let item = out.remove(from);
    out.insert(to, item);
    out
}
