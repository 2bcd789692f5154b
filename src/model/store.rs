use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;

use crate::model::ModelDescriptor;

pub type ActiveModel = Option<Arc<ModelDescriptor>>;

/// Shared slot holding the currently active model descriptor.
///
/// Cloning the store yields another handle to the same slot. Subscribers are
/// notified synchronously on every change.
#[derive(Clone)]
pub struct ModelStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    sender: watch::Sender<ActiveModel>,
    tickets: AtomicU64,
}

impl ModelStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            inner: Arc::new(StoreInner {
                sender,
                tickets: AtomicU64::new(0),
            }),
        }
    }

    pub fn get(&self) -> ActiveModel {
        self.inner.sender.borrow().clone()
    }

    /// Replace the stored descriptor, superseding every ticket issued so far.
    ///
    /// Returns `false` when the new value equals the current one; nothing is
    /// written and no subscriber is woken in that case.
    pub fn set(&self, descriptor: ModelDescriptor) -> bool {
        self.inner.sender.send_if_modified(|current| {
            self.inner.tickets.fetch_add(1, Ordering::SeqCst);
            replace_if_changed(current, descriptor)
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<ActiveModel> {
        self.inner.sender.subscribe()
    }

    /// Reserve a ticket for a pending write. Each call supersedes all
    /// previously issued tickets.
    pub fn issue_ticket(&self) -> u64 {
        self.inner.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Write `descriptor` only if `ticket` is still the newest one issued.
    ///
    /// Returns whether the ticket was honoured, even if the stored value was
    /// already equal.
    pub fn set_if_latest(&self, ticket: u64, descriptor: ModelDescriptor) -> bool {
        let mut honoured = false;
        self.inner.sender.send_if_modified(|current| {
            if self.inner.tickets.load(Ordering::SeqCst) != ticket {
                return false;
            }
            honoured = true;
            replace_if_changed(current, descriptor)
        });
        honoured
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}

fn replace_if_changed(current: &mut ActiveModel, descriptor: ModelDescriptor) -> bool {
    if current.as_deref() == Some(&descriptor) {
        return false;
    }
    *current = Some(Arc::new(descriptor));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(value: serde_json::Value) -> ModelDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn starts_empty() {
        assert!(ModelStore::new().get().is_none());
    }

    #[test]
    fn set_replaces_whole_descriptor() {
        let store = ModelStore::new();
        store.set(descriptor(json!({
            "name": "first",
            "output": { "type": "IMG_CLASSIFIER", "labels": ["a"] }
        })));
        store.set(descriptor(json!({ "output": { "type": "OTHER" } })));

        let current = store.get().unwrap();
        assert_eq!(current.output_type(), Some("OTHER"));
        assert!(current.extra.get("name").is_none());
        assert!(current.output.payload.get("labels").is_none());
    }

    #[test]
    fn setting_equal_descriptor_does_not_notify() {
        let store = ModelStore::new();
        let mut rx = store.subscribe();
        let model = descriptor(json!({ "output": { "type": "IMG_CLASSIFIER" } }));

        assert!(store.set(model.clone()));
        assert!(rx.has_changed().unwrap());
        let first = rx.borrow_and_update().clone();

        assert!(!store.set(model));
        assert!(!rx.has_changed().unwrap());
        assert!(Arc::ptr_eq(&first.unwrap(), &store.get().unwrap()));
    }

    #[test]
    fn clones_share_the_slot() {
        let store = ModelStore::new();
        let other = store.clone();
        other.set(descriptor(json!({ "output": {} })));
        assert!(store.get().is_some());
    }

    #[test]
    fn stale_ticket_is_not_committed() {
        let store = ModelStore::new();
        let older = store.issue_ticket();
        let newer = store.issue_ticket();

        assert!(store.set_if_latest(newer, descriptor(json!({ "output": { "type": "NEW" } }))));
        assert!(!store.set_if_latest(older, descriptor(json!({ "output": { "type": "OLD" } }))));
        assert_eq!(store.get().unwrap().output_type(), Some("NEW"));
    }

    #[test]
    fn direct_set_supersedes_pending_ticket() {
        let store = ModelStore::new();
        let pending = store.issue_ticket();

        store.set(descriptor(json!({ "output": { "type": "DIRECT" } })));

        assert!(!store.set_if_latest(pending, descriptor(json!({ "output": { "type": "LOADED" } }))));
        assert_eq!(store.get().unwrap().output_type(), Some("DIRECT"));
    }
}
