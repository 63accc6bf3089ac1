//! The "a turn is in flight" marker shared with the worker

use crate::integration::turn::TurnId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Id of the active turn, or nothing
///
/// Written by the presentation thread only. The worker holds a clone and
/// checks whether its own turn is still the active one.
#[derive(Clone, Debug, Default)]
pub struct ProcessingFlag {
    active: Arc<AtomicU64>,
}

impl ProcessingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, turn: TurnId) {
        self.active.store(turn.get(), Ordering::SeqCst);
    }

    /// Clear the flag and return the turn that was active
    pub fn clear(&self) -> Option<TurnId> {
        match self.active.swap(0, Ordering::SeqCst) {
            0 => None,
            id => Some(TurnId(id)),
        }
    }

    /// Clear only if `turn` is still the active one
    pub fn clear_if(&self, turn: TurnId) -> bool {
        self.active
            .compare_exchange(turn.get(), 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_set(&self) -> bool {
        self.active.load(Ordering::SeqCst) != 0
    }

    pub fn is_active(&self, turn: TurnId) -> bool {
        self.active.load(Ordering::SeqCst) == turn.get()
    }

    pub fn active(&self) -> Option<TurnId> {
        match self.active.load(Ordering::SeqCst) {
            0 => None,
            id => Some(TurnId(id)),
        }
    }
}
