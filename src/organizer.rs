//! Prompt organizer service
//!
//! One instance per prompt-configuration screen. It owns the host handle and
//! every section-side store, rebuilds the section tree on demand and runs
//! snapshot / bulk-toggle requests through the convergence engine.

use tracing::{debug, info, warn};

use crate::config::{OrganizerConfig, COLLAPSE_STATE_KEY, CUSTOM_PATTERNS_KEY, SNAPSHOT_KEY};
use crate::error::OrganizerError;
use crate::events::{ChangeEvent, ChangeNotifier, RebuildGuard, SubscriptionId};
use crate::host::PromptHost;
use crate::sections::{
    collect_keys, filter_sections, find_section, CollapseStateStore, DividerParser, SectionNode,
    SectionTreeBuilder,
};
use crate::snapshot::{ApplyOutcome, ApplyReport, SnapshotStore, ToggleConvergenceEngine};
use crate::storage::{PersistSlot, SharedStore};

pub struct PromptOrganizer<H: PromptHost> {
    host: H,
    builder: SectionTreeBuilder,
    collapse: CollapseStateStore,
    snapshots: SnapshotStore,
    engine: ToggleConvergenceEngine,
    custom_patterns: String,
    patterns_slot: PersistSlot,
    notifier: ChangeNotifier,
    guard: RebuildGuard,
    tree: Vec<SectionNode>,
}

impl<H: PromptHost> std::fmt::Debug for PromptOrganizer<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptOrganizer")
            .field("sections", &self.tree.len())
            .field("custom_patterns", &self.custom_patterns)
            .field("rebuilding", &self.guard.is_active())
            .finish()
    }
}

impl<H: PromptHost> PromptOrganizer<H> {
    /// Load persisted state from `store` and build the initial tree.
    ///
    /// A stored custom pattern string that fails to compile is logged and
    /// the built-in patterns are used instead.
    pub fn new(host: H, config: &OrganizerConfig, store: SharedStore) -> Self {
        let patterns_slot = PersistSlot::new(store.clone(), CUSTOM_PATTERNS_KEY);
        let custom_patterns: String = patterns_slot.load();
        let (parser, error) = DividerParser::with_custom_patterns(&custom_patterns);
        if let Some(e) = error {
            warn!(error = %e, "Stored divider patterns are invalid, using built-ins");
        }

        let builder = SectionTreeBuilder::new(parser).with_synthetic_names(
            config.ungrouped_section_name.clone(),
            config.all_section_name.clone(),
        );

        let mut organizer = PromptOrganizer {
            host,
            builder,
            collapse: CollapseStateStore::load(store.clone(), COLLAPSE_STATE_KEY),
            snapshots: SnapshotStore::load(store, SNAPSHOT_KEY),
            engine: ToggleConvergenceEngine::new(config.snapshot_step_delay()),
            custom_patterns,
            patterns_slot,
            notifier: ChangeNotifier::new(),
            guard: RebuildGuard::new(),
            tree: Vec::new(),
        };
        organizer.refresh();
        organizer
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Tree from the last rebuild
    pub fn tree(&self) -> &[SectionNode] {
        &self.tree
    }

    pub fn section(&self, section_id: &str) -> Option<&SectionNode> {
        find_section(&self.tree, section_id)
    }

    /// Current tree narrowed to `term`; the stored tree is untouched
    pub fn filtered_tree(&self, term: &str) -> Vec<SectionNode> {
        filter_sections(&self.tree, term)
    }

    // ------------------------------------------------------------------
    // Rebuild and notification
    // ------------------------------------------------------------------

    pub fn on_changed<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.notifier.on_changed(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Handle on the in-progress flag for the presentation layer's
    /// structure observer
    pub fn rebuild_guard(&self) -> RebuildGuard {
        self.guard.clone()
    }

    /// Rebuild the tree from the host list and notify subscribers.
    ///
    /// Returns false when a rebuild is already in progress. Subscribers run
    /// while the guard is still held.
    pub fn refresh(&mut self) -> bool {
        let Some(_token) = self.guard.enter() else {
            debug!("Rebuild already in progress, skipping");
            return false;
        };
        let entries = self.host.ordered_entries();
        self.tree = self.builder.build(&entries);
        debug!(
            entry_count = entries.len(),
            section_count = self.tree.len(),
            "Rebuilt section tree"
        );
        self.notifier.notify(&ChangeEvent::TreeRebuilt {
            section_count: self.tree.len(),
        });
        true
    }

    /// Upstream "structure changed" notification. Ignored while our own
    /// rebuild is running.
    pub fn handle_structure_changed(&mut self) -> bool {
        if self.guard.is_active() {
            debug!("Ignoring structure change raised by our own rebuild");
            return false;
        }
        self.refresh()
    }

    // ------------------------------------------------------------------
    // Divider patterns
    // ------------------------------------------------------------------

    pub fn custom_patterns(&self) -> &str {
        &self.custom_patterns
    }

    pub fn active_patterns(&self) -> &[String] {
        self.builder.parser().sources()
    }

    /// Replace the custom divider patterns (comma separated), persist them
    /// and rebuild. An invalid pattern is returned as a non-fatal error;
    /// parsing then uses the built-in patterns only.
    pub fn set_custom_patterns(&mut self, raw: &str) -> Option<OrganizerError> {
        let (parser, error) = DividerParser::with_custom_patterns(raw);
        if let Some(e) = &error {
            warn!(error = %e, "Custom divider patterns rejected, using built-ins");
        }
        self.custom_patterns = raw.trim().to_string();
        let _ = self.patterns_slot.save(&self.custom_patterns);
        self.builder.set_parser(parser);
        info!(
            pattern_count = self.builder.parser().sources().len(),
            "Divider patterns updated"
        );
        self.notifier.notify(&ChangeEvent::PatternsChanged);
        self.refresh();
        error
    }

    // ------------------------------------------------------------------
    // Collapse state
    // ------------------------------------------------------------------

    pub fn is_open(&self, section_key: &str) -> bool {
        self.collapse.is_open(section_key)
    }

    /// Returns the new open state
    pub fn toggle_open(&mut self, section_key: &str) -> bool {
        self.collapse.toggle(section_key)
    }

    pub fn expand_all(&mut self) {
        self.collapse.open_all(collect_keys(&self.tree));
    }

    pub fn collapse_all(&mut self) {
        self.collapse.close_all(collect_keys(&self.tree));
    }

    // ------------------------------------------------------------------
    // Enabled state
    // ------------------------------------------------------------------

    /// Enable or disable every content entry of a section, nested
    /// sub-sections included. Header entries are left alone. An unknown
    /// section id changes nothing and reports `UnknownSection`.
    pub fn set_section_enabled(&mut self, section_id: &str, enabled: bool) -> ApplyReport {
        let Some(node) = self.section(section_id) else {
            warn!(section_id, "Bulk toggle for unknown section");
            return ApplyReport::empty(ApplyOutcome::UnknownSection);
        };
        let plan: Vec<(String, bool)> = node
            .all_entries()
            .into_iter()
            .map(|entry| (entry.identifier.clone(), enabled))
            .collect();
        if plan.is_empty() {
            debug!(section_id, "No entries to toggle");
        }
        let report = self.engine.converge(&mut self.host, &plan);
        self.after_toggles(&report);
        report
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshots.get().is_some()
    }

    /// Store the host's current enabled set; returns how many ids it holds
    pub fn capture_snapshot(&mut self) -> usize {
        let snapshot = self.engine.capture_snapshot(&self.host);
        let count = snapshot.len();
        self.snapshots.set(snapshot);
        info!(enabled_count = count, "Saved toggle snapshot");
        count
    }

    /// Drive the host back to the stored snapshot with minimal toggles
    pub fn restore_snapshot(&mut self) -> ApplyReport {
        let Some(target) = self.snapshots.get() else {
            debug!("No snapshot stored");
            return ApplyReport::empty(ApplyOutcome::NoSnapshot);
        };
        let all_ids: Vec<String> = self
            .host
            .ordered_entries()
            .into_iter()
            .map(|entry| entry.identifier)
            .collect();
        let report = self.engine.apply_snapshot(&mut self.host, target, &all_ids);
        self.after_toggles(&report);
        report
    }

    pub fn clear_snapshot(&mut self) {
        self.snapshots.clear();
    }

    fn after_toggles(&mut self, report: &ApplyReport) {
        if report.changed.is_empty() {
            return;
        }
        self.notifier.notify(&ChangeEvent::EnabledChanged {
            identifiers: report.changed.clone(),
        });
        self.refresh();
    }
}

#[cfg(test)]
#[path = "organizer_tests.rs"]
mod tests;
