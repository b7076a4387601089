//! Snapshot capture and minimal-diff restore of the enabled set
//!
//! Restoring only touches entries whose state differs from the target and
//! spaces host calls out so the host's own reaction (debounced save,
//! re-render) settles between toggles.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::OrganizerError;
use crate::host::PromptHost;
use crate::storage::{PersistSlot, SharedStore};

/// Enabled identifiers at capture time
pub type Snapshot = BTreeSet<String>;

/// How a restore ended, for user messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Nothing to apply: no snapshot stored, or the target was empty
    NoSnapshot,
    /// Every entry already had the desired state
    AlreadyMatches,
    /// At least one toggle was attempted
    Applied,
    /// A bulk toggle named a section the current tree does not have
    UnknownSection,
}

#[derive(Debug)]
pub struct ApplyReport {
    pub outcome: ApplyOutcome,
    /// Identifiers whose state was changed, in call order
    pub changed: Vec<String>,
    /// Per-entry host failures; the batch continues past them
    pub failures: Vec<OrganizerError>,
}

impl ApplyReport {
    pub(crate) fn empty(outcome: ApplyOutcome) -> Self {
        ApplyReport {
            outcome,
            changed: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives the host toward a desired enabled set with as few toggles as possible
#[derive(Debug, Clone)]
pub struct ToggleConvergenceEngine {
    step_delay: Duration,
}

impl ToggleConvergenceEngine {
    pub fn new(step_delay: Duration) -> Self {
        ToggleConvergenceEngine { step_delay }
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    pub fn capture_snapshot(&self, host: &dyn PromptHost) -> Snapshot {
        let snapshot: Snapshot = host.enabled_identifiers().into_iter().collect();
        debug!(enabled_count = snapshot.len(), "Captured snapshot");
        snapshot
    }

    /// Make membership of every id in `all_ids` match `target`.
    ///
    /// Ids outside `all_ids` are ignored, as are target ids the host no
    /// longer lists.
    #[instrument(level = "debug", skip_all, fields(target_len = target.len(), id_count = all_ids.len()))]
    pub fn apply_snapshot(
        &self,
        host: &mut dyn PromptHost,
        target: &Snapshot,
        all_ids: &[String],
    ) -> ApplyReport {
        if target.is_empty() {
            debug!("Empty snapshot, nothing to apply");
            return ApplyReport::empty(ApplyOutcome::NoSnapshot);
        }
        let plan: Vec<(String, bool)> = all_ids
            .iter()
            .map(|id| (id.clone(), target.contains(id)))
            .collect();
        self.converge(host, &plan)
    }

    /// Apply `(id, desired_enabled)` pairs, skipping ids already in the desired state.
    pub fn converge(&self, host: &mut dyn PromptHost, plan: &[(String, bool)]) -> ApplyReport {
        let current: HashSet<String> = host.enabled_identifiers();
        let diff: Vec<&(String, bool)> = plan
            .iter()
            .filter(|(id, desired)| current.contains(id) != *desired)
            .collect();

        if diff.is_empty() {
            debug!(planned = plan.len(), "Enabled set already matches");
            return ApplyReport::empty(ApplyOutcome::AlreadyMatches);
        }

        let mut report = ApplyReport::empty(ApplyOutcome::Applied);
        for (index, (id, enabled)) in diff.iter().enumerate() {
            if index > 0 && !self.step_delay.is_zero() {
                std::thread::sleep(self.step_delay);
            }
            match host.set_enabled(id, *enabled) {
                Ok(()) => report.changed.push(id.clone()),
                Err(e) => {
                    warn!(id = %id, enabled, error = %e, "Host toggle failed, continuing");
                    report.failures.push(OrganizerError::HostToggle {
                        id: id.clone(),
                        message: format!("{:#}", e),
                    });
                }
            }
        }

        info!(
            changed = report.changed.len(),
            failed = report.failures.len(),
            "Applied enabled-state changes"
        );
        report
    }
}

impl Default for ToggleConvergenceEngine {
    fn default() -> Self {
        Self::new(Duration::from_millis(
            crate::config::DEFAULT_SNAPSHOT_STEP_DELAY_MS,
        ))
    }
}

/// Single persisted snapshot slot
#[derive(Debug)]
pub struct SnapshotStore {
    snapshot: Option<Snapshot>,
    slot: PersistSlot,
}

impl SnapshotStore {
    pub fn load(store: SharedStore, key: &str) -> Self {
        let slot = PersistSlot::new(store, key);
        let snapshot: Option<Snapshot> = slot.load();
        SnapshotStore { snapshot, slot }
    }

    pub fn get(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn set(&mut self, snapshot: Snapshot) {
        self.snapshot = Some(snapshot);
        let _ = self.slot.save(&self.snapshot);
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
        let _ = self.slot.save(&self.snapshot);
    }
}
