//! Layout-container registry - the set of live layout containers.
//!
//! An entry holds what the scheduler needs to know about one container:
//! its axis, its rule text and the bounding-box snapshot taken during the
//! pre-render phase. The registry never owns container instances; handles
//! deregister themselves on destruction through a weak back-reference.

use std::collections::HashMap;

use crate::types::{Axis, NodeId, Px};

#[derive(Debug, Clone)]
pub(crate) struct ContainerEntry {
    pub axis: Axis,
    pub rule: String,
    /// Bounding size recorded before the last native render; `None` until
    /// the first pre-render pass sees this entry.
    pub snapshot: Option<(Px, Px)>,
}

/// Live layout containers keyed by node identity.
#[derive(Debug, Default)]
pub(crate) struct LayoutRegistry {
    entries: HashMap<NodeId, ContainerEntry>,
}

impl LayoutRegistry {
    /// Add or replace the entry for `node`.
    pub fn register(&mut self, node: NodeId, axis: Axis, rule: String) {
        self.entries.insert(
            node,
            ContainerEntry {
                axis,
                rule,
                snapshot: None,
            },
        );
    }

    pub fn deregister(&mut self, node: NodeId) {
        self.entries.remove(&node);
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Replace the rule text of an existing entry.
    pub fn set_rule(&mut self, node: NodeId, rule: String) -> bool {
        match self.entries.get_mut(&node) {
            Some(entry) => {
                entry.rule = rule;
                true
            }
            None => false,
        }
    }

    /// Snapshot of registered nodes, detached from the map so callers can
    /// iterate while entries are added or removed mid-frame.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.entries.keys().copied().collect()
    }

    pub fn axis_rule(&self, node: NodeId) -> Option<(Axis, String)> {
        self.entries
            .get(&node)
            .map(|entry| (entry.axis, entry.rule.clone()))
    }

    /// Record the pre-render bounding size for `node`.
    pub fn snapshot(&mut self, node: NodeId, width: Px, height: Px) {
        if let Some(entry) = self.entries.get_mut(&node) {
            entry.snapshot = Some((width, height));
        }
    }

    pub fn snapshot_of(&self, node: NodeId) -> Option<(Px, Px)> {
        self.entries.get(&node).and_then(|entry| entry.snapshot)
    }
}

// =============================================================================
// Tests
// =============================================================================
