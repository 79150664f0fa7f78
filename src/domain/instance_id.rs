//! Per-build instance numbering of group keys.

use std::collections::HashMap;

use tracing::trace;

/// Hands out a running number per group key.
///
/// One allocator covers one build pass (all pinned sections of it) and is
/// dropped afterwards. The first request for a key yields 0.
#[derive(Debug, Default)]
pub struct InstanceIdAllocator {
    counters: HashMap<String, u32>,
}

impl InstanceIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_instance_id(&mut self, group_key: &str) -> u32 {
        let instance_id = match self.counters.get_mut(group_key) {
            Some(counter) => {
                *counter += 1;
                *counter
            }
            None => {
                self.counters.insert(group_key.to_string(), 0);
                0
            }
        };
        trace!(group_key, instance_id, "allocated instance id");
        instance_id
    }
}
