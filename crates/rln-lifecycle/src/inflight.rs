use rln_types::CredentialHash;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Credential-bearing operations a caller may have in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Extend,
    Erase,
    Withdraw,
    View,
}

/// Caller-owned re-entrancy guard, keyed per (hash, action).
///
/// A second begin on the same key is refused while the first permit is
/// alive; operations on distinct hashes proceed independently. None of
/// these operations are cancellable mid-flight, so the triggering
/// control stays disabled until the permit drops.
#[derive(Clone, Default)]
pub struct InFlightTracker {
    active: Arc<Mutex<HashSet<(CredentialHash, ActionKind)>>>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the (hash, action) slot. Returns `None` if the same
    /// operation is already running for that hash.
    pub fn try_begin(&self, hash: CredentialHash, action: ActionKind) -> Option<InFlightPermit> {
        let mut active = self.active.lock().ok()?;
        if !active.insert((hash, action)) {
            return None;
        }

        Some(InFlightPermit {
            tracker: self.clone(),
            key: (hash, action),
        })
    }

    pub fn is_active(&self, hash: &CredentialHash, action: ActionKind) -> bool {
        self.active
            .lock()
            .map(|active| active.contains(&(*hash, action)))
            .unwrap_or(false)
    }
}

/// Released on drop, freeing the slot for the next attempt.
pub struct InFlightPermit {
    tracker: InFlightTracker,
    key: (CredentialHash, ActionKind),
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        if let Ok(mut active) = self.tracker.active.lock() {
            active.remove(&self.key);
        }
    }
}
