//! Change notification and the rebuild-in-progress guard
//!
//! Rebuilding the section tree changes the presented structure, and the
//! presentation layer reports structural changes back upstream. The
//! [`RebuildGuard`] flag is held for the whole build-and-present cycle so a
//! notification caused by our own rebuild does not trigger another one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// What changed, for subscribers that care
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The section tree was rebuilt
    TreeRebuilt { section_count: usize },
    /// Enabled state changed for these identifiers
    EnabledChanged { identifiers: Vec<String> },
    /// Divider patterns were replaced
    PatternsChanged,
    /// A folder or item assignment changed in a leaf universe
    FoldersChanged { universe: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Publish/subscribe list of change callbacks
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_changed<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false when `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Deliver `event` to every subscriber, in subscription order
    pub fn notify(&self, event: &ChangeEvent) {
        debug!(?event, subscribers = self.subscribers.len(), "Notifying subscribers");
        for (_, callback) in &self.subscribers {
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Shared "rebuild in progress" flag.
///
/// Clones observe the same flag, so the presentation layer's structure
/// observer can hold one and skip notifications while it is active.
#[derive(Debug, Clone, Default)]
pub struct RebuildGuard {
    active: Arc<AtomicBool>,
}

impl RebuildGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Mark a rebuild as started. `None` if one is already running.
    /// The flag clears when the returned token is dropped.
    pub fn enter(&self) -> Option<RebuildToken> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RebuildToken {
                active: Arc::clone(&self.active),
            })
    }
}

#[must_use = "the rebuild flag clears as soon as the token is dropped"]
#[derive(Debug)]
pub struct RebuildToken {
    active: Arc<AtomicBool>,
}

impl Drop for RebuildToken {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_notify_reaches_subscribers_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = ChangeNotifier::new();
        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            notifier.on_changed(move |_| seen.lock().push(tag));
        }
        notifier.notify(&ChangeEvent::PatternsChanged);
        assert_eq!(*seen.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let count = Arc::new(Mutex::new(0));
        let mut notifier = ChangeNotifier::new();
        let id = {
            let count = Arc::clone(&count);
            notifier.on_changed(move |_| *count.lock() += 1)
        };
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.notify(&ChangeEvent::PatternsChanged);
        assert_eq!(*count.lock(), 0);
    }

    #[test]
    fn test_guard_rejects_reentry_until_token_dropped() {
        let guard = RebuildGuard::new();
        let observer = guard.clone();
        let token = guard.enter().expect("first entry succeeds");
        assert!(observer.is_active());
        assert!(guard.enter().is_none());
        drop(token);
        assert!(!observer.is_active());
        assert!(guard.enter().is_some());
    }
}
