//! What a sync run would do, computed before anything is changed.

use crate::diff::ChangeSet;
use crate::event::{Appointment, RemoteEvent};
use crate::sync_window::SyncWindow;

#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub window: SyncWindow,
    /// Remote events in the window, as listed at the start of the run.
    pub remote_events: Vec<RemoteEvent>,
    /// Every local appointment, in or out of the window.
    pub local_events: Vec<Appointment>,
    pub remote_changes: ChangeSet<RemoteEvent>,
    pub local_changes: ChangeSet<Appointment>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.remote_changes.is_empty() && self.local_changes.is_empty()
    }
}
