//! Layout engine - registry, tree indexing and frame scheduling.
//!
//! [`LayoutEngine`] is the one stateful object of the crate. The
//! application constructs it once, registers layout containers against
//! host nodes, and calls [`pre_frame`](LayoutEngine::pre_frame) /
//! [`post_frame`](LayoutEngine::post_frame) around the host's native
//! render, every frame, on the render thread.

mod indexer;
mod registry;
mod scheduler;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use crate::placement::PlacementAttributes;
use crate::types::{Axis, NodeId};

pub use indexer::TreeIndex;

use registry::LayoutRegistry;

// =============================================================================
// Engine
// =============================================================================

/// The layout scheduler and its owned state.
///
/// Shared pieces (`registry`, dirty set) sit behind `Rc<RefCell<_>>` so
/// container handles and resize observers can reach them without owning
/// the engine; everything still runs on a single thread.
pub struct LayoutEngine {
    root: NodeId,
    registry: Rc<RefCell<LayoutRegistry>>,
    attributes: HashMap<NodeId, PlacementAttributes>,
    index: Option<TreeIndex>,
    dirty: Rc<RefCell<HashSet<NodeId>>>,
    first_post_run: bool,
}

impl LayoutEngine {
    /// Create an engine for the tree rooted at `root`.
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            registry: Rc::new(RefCell::new(LayoutRegistry::default())),
            attributes: HashMap::new(),
            index: None,
            dirty: Rc::new(RefCell::new(HashSet::new())),
            first_post_run: true,
        }
    }

    /// The root the tree index is built from.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Register `node` as a layout container partitioning along `axis`
    /// with the given rule.
    ///
    /// The returned handle deregisters the container when dropped; the
    /// registry holds no owning reference back to it.
    pub fn register(
        &mut self,
        node: NodeId,
        axis: Axis,
        rule: impl Into<String>,
    ) -> ContainerHandle {
        self.registry.borrow_mut().register(node, axis, rule.into());
        ContainerHandle {
            node,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Replace a registered container's rule. The container is queued for
    /// recomputation on the next frame. Returns `false` for unregistered
    /// nodes.
    pub fn set_rule(&mut self, node: NodeId, rule: impl Into<String>) -> bool {
        if self.registry.borrow_mut().set_rule(node, rule.into()) {
            self.dirty.borrow_mut().insert(node);
            true
        } else {
            false
        }
    }

    pub fn is_registered(&self, node: NodeId) -> bool {
        self.registry.borrow().contains(node)
    }

    pub fn registered_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Indexed DFS depth of `node`, if the index has seen it.
    pub fn depth_of(&self, node: NodeId) -> Option<u32> {
        self.index.as_ref().and_then(|index| index.depth(node))
    }

    // =========================================================================
    // Placement attributes
    // =========================================================================

    /// Placement attributes for `node`; defaults if never set.
    pub fn attributes(&self, node: NodeId) -> PlacementAttributes {
        self.attributes.get(&node).copied().unwrap_or_default()
    }

    /// Store the full attribute record for `node`.
    pub fn set_attributes(&mut self, node: NodeId, attrs: PlacementAttributes) {
        self.attributes.insert(node, attrs);
    }

    /// Insert explicit defaults for a freshly created widget and return a
    /// mutable reference for follow-up tweaks.
    pub fn ensure_attributes(&mut self, node: NodeId) -> &mut PlacementAttributes {
        self.attributes.entry(node).or_default()
    }
}

// =============================================================================
// Container handle
// =============================================================================

/// Non-owning handle to a registered layout container.
///
/// Dropping the handle deregisters the container; if the engine is gone
/// first, dropping is a no-op.
pub struct ContainerHandle {
    node: NodeId,
    registry: Weak<RefCell<LayoutRegistry>>,
}

impl ContainerHandle {
    /// The container's node.
    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Drop for ContainerHandle {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().deregister(self.node);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Justify;

    #[test]
    fn test_handle_deregisters_on_drop() {
        let mut engine = LayoutEngine::new(NodeId(1));
        let handle = engine.register(NodeId(2), Axis::Vertical, "r,r");
        assert!(engine.is_registered(NodeId(2)));
        assert_eq!(engine.registered_count(), 1);

        drop(handle);
        assert!(!engine.is_registered(NodeId(2)));
    }

    #[test]
    fn test_handle_outliving_engine_is_harmless() {
        let mut engine = LayoutEngine::new(NodeId(1));
        let handle = engine.register(NodeId(2), Axis::Vertical, "r,r");
        drop(engine);
        drop(handle);
    }

    #[test]
    fn test_set_rule_marks_dirty() {
        let mut engine = LayoutEngine::new(NodeId(1));
        let _handle = engine.register(NodeId(2), Axis::Horizontal, "r,r");

        assert!(engine.set_rule(NodeId(2), "30%,70%"));
        assert!(engine.dirty.borrow().contains(&NodeId(2)));
        assert!(!engine.set_rule(NodeId(3), "r"));
    }

    #[test]
    fn test_attribute_side_table() {
        let mut engine = LayoutEngine::new(NodeId(1));
        let node = NodeId(5);

        // Reads fall back to explicit defaults.
        assert_eq!(engine.attributes(node), PlacementAttributes::default());

        engine.ensure_attributes(node).justify_x = Justify::Center;
        engine.ensure_attributes(node).scale_y = 0.5;
        let attrs = engine.attributes(node);
        assert_eq!(attrs.justify_x, Justify::Center);
        assert_eq!(attrs.scale_y, 0.5);

        engine.set_attributes(node, PlacementAttributes::centered());
        assert_eq!(engine.attributes(node).justify_y, Justify::Center);
    }
}
