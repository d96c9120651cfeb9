//! MemoryHost - an in-memory widget tree implementing every capability.
//!
//! Geometry writes apply immediately and resize observers fire
//! synchronously, which makes this host the reference for the engine's
//! frame semantics. `render_frame` is a no-op beyond counting invocations;
//! there is nothing to paint.

use std::collections::HashMap;

use super::{
    Colorable, Container, Positionable, RenderDriver, ResizeNotify, ResizeObserver, Sizable,
    Visible,
};
use crate::types::{NodeId, Px, Rgba};

#[derive(Debug, Clone)]
struct NodeRecord {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    x: Px,
    y: Px,
    width: Px,
    height: Px,
    visible: bool,
    background: Rgba,
    resizable: bool,
}

impl NodeRecord {
    fn new(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            visible: true,
            background: Rgba::TRANSPARENT,
            resizable: true,
        }
    }
}

/// In-memory widget tree with a single root node.
pub struct MemoryHost {
    nodes: HashMap<NodeId, NodeRecord>,
    observers: HashMap<NodeId, Vec<ResizeObserver>>,
    root: NodeId,
    next_id: u64,
    frames_rendered: u64,
}

impl MemoryHost {
    /// Create a host whose root node has the given size.
    pub fn new(root_width: Px, root_height: Px) -> Self {
        let root = NodeId(1);
        let mut nodes = HashMap::new();
        let mut record = NodeRecord::new(None);
        record.width = root_width;
        record.height = root_height;
        nodes.insert(root, record);
        Self {
            nodes,
            observers: HashMap::new(),
            root,
            next_id: 2,
            frames_rendered: 0,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a node under `parent`. Returns `None` if the parent does
    /// not exist.
    pub fn create_node(&mut self, parent: NodeId) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, NodeRecord::new(Some(parent)));
        if let Some(record) = self.nodes.get_mut(&parent) {
            record.children.push(id);
        }
        Some(id)
    }

    /// Remove `node` and its whole subtree.
    pub fn remove_node(&mut self, node: NodeId) {
        let Some(record) = self.nodes.remove(&node) else {
            return;
        };
        self.observers.remove(&node);
        if let Some(parent) = record.parent
            && let Some(parent_record) = self.nodes.get_mut(&parent)
        {
            parent_record.children.retain(|c| *c != node);
        }
        for child in record.children {
            self.remove_node(child);
        }
    }

    /// Mark a node as a fixed-size widget kind (size requests ignored).
    pub fn set_resizable(&mut self, node: NodeId, resizable: bool) {
        if let Some(record) = self.nodes.get_mut(&node) {
            record.resizable = resizable;
        }
    }

    /// How many times `render_frame` has been entered.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    fn notify_resize(&self, node: NodeId) {
        let Some(observers) = self.observers.get(&node) else {
            return;
        };
        // Clone the Rc handles so observers may install further observers.
        let observers: Vec<ResizeObserver> = observers.clone();
        for observer in observers {
            observer(node);
        }
    }
}

impl Container for MemoryHost {
    fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|r| r.children.clone())
            .unwrap_or_default()
    }

    fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }
}

impl Positionable for MemoryHost {
    fn position(&self, node: NodeId) -> (Px, Px) {
        self.nodes.get(&node).map(|r| (r.x, r.y)).unwrap_or((0, 0))
    }

    fn set_position(&mut self, node: NodeId, x: Px, y: Px) {
        if let Some(record) = self.nodes.get_mut(&node) {
            record.x = x;
            record.y = y;
        }
    }
}

impl Sizable for MemoryHost {
    fn bounding_rect(&self, node: NodeId) -> (Px, Px) {
        self.nodes
            .get(&node)
            .map(|r| (r.width, r.height))
            .unwrap_or((0, 0))
    }

    fn set_size(&mut self, node: NodeId, width: Px, height: Px) {
        let changed = match self.nodes.get_mut(&node) {
            Some(record) if record.resizable => {
                let changed = record.width != width || record.height != height;
                record.width = width;
                record.height = height;
                changed
            }
            _ => false,
        };
        if changed {
            self.notify_resize(node);
        }
    }

    fn supports_resize(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|r| r.resizable)
    }
}

impl Visible for MemoryHost {
    fn is_visible(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|r| r.visible)
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(record) = self.nodes.get_mut(&node) {
            record.visible = visible;
        }
    }
}

impl Colorable for MemoryHost {
    fn background(&self, node: NodeId) -> Rgba {
        self.nodes
            .get(&node)
            .map(|r| r.background)
            .unwrap_or(Rgba::TRANSPARENT)
    }

    fn set_background(&mut self, node: NodeId, color: Rgba) {
        if let Some(record) = self.nodes.get_mut(&node) {
            record.background = color;
        }
    }
}

impl RenderDriver for MemoryHost {
    fn render_frame(&mut self) {
        // Geometry is already realized; only the entry is recorded.
        self.frames_rendered += 1;
    }
}

impl ResizeNotify for MemoryHost {
    fn observe_resize(&mut self, node: NodeId, observer: ResizeObserver) {
        self.observers.entry(node).or_default().push(observer);
    }

    fn clear_resize_observers(&mut self) {
        self.observers.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
