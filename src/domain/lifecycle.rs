//! Hook into the object-lifecycle registry that owns displayed groups.

use crate::domain::arena::{DisplayedGroup, GroupHandle};

/// Registry notified when displayed groups come and go.
///
/// `created` fires exactly once per newly constructed group; reused groups
/// are not announced again. `destroyed` fires when a refresh leaves a group
/// unreferenced; the group has already left the arena and its handle is stale.
pub trait GroupLifecycle {
    fn created(&mut self, handle: GroupHandle, group: &DisplayedGroup);

    fn destroyed(&mut self, _handle: GroupHandle, _group: &DisplayedGroup) {}
}

/// Lifecycle that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLifecycle;

impl GroupLifecycle for NoopLifecycle {
    fn created(&mut self, _handle: GroupHandle, _group: &DisplayedGroup) {}
}

/// Lifecycle that records unique ids in notification order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingLifecycle {
    pub created: Vec<String>,
    pub destroyed: Vec<String>,
}

impl RecordingLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.created.clear();
        self.destroyed.clear();
    }
}

impl GroupLifecycle for RecordingLifecycle {
    fn created(&mut self, _handle: GroupHandle, group: &DisplayedGroup) {
        self.created.push(group.unique_id().to_string());
    }

    fn destroyed(&mut self, _handle: GroupHandle, group: &DisplayedGroup) {
        self.destroyed.push(group.unique_id().to_string());
    }
}
