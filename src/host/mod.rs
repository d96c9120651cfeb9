//! Host capabilities - the seam between the engine and the widget toolkit.
//!
//! The engine never talks to a concrete toolkit. Each toolkit capability
//! is a narrow trait; a host type implements the ones its widgets support,
//! and the engine depends only on the capabilities it actually uses
//! (bundled as [`Host`]). Positions handed across this seam are relative
//! to the node's parent container.

mod memory;

use std::rc::Rc;

use crate::types::{NodeId, Px, Rgba};

pub use memory::MemoryHost;

/// Callback installed on a node, invoked when the node's box changes.
pub type ResizeObserver = Rc<dyn Fn(NodeId)>;

/// Child enumeration and liveness queries.
pub trait Container {
    /// Direct children of `node`, in tree order.
    fn children_of(&self, node: NodeId) -> Vec<NodeId>;

    /// Whether `node` still exists in the tree.
    fn exists(&self, node: NodeId) -> bool;
}

/// Reading and writing a node's position.
pub trait Positionable {
    fn position(&self, node: NodeId) -> (Px, Px);

    fn set_position(&mut self, node: NodeId, x: Px, y: Px);
}

/// Reading and writing a node's size.
pub trait Sizable {
    /// The node's realized bounding size.
    fn bounding_rect(&self, node: NodeId) -> (Px, Px);

    /// Request a size. Widgets that do not support resizing ignore this;
    /// callers check [`supports_resize`](Sizable::supports_resize) first.
    fn set_size(&mut self, node: NodeId, width: Px, height: Px);

    /// Whether this widget kind accepts size requests at all.
    fn supports_resize(&self, node: NodeId) -> bool;
}

/// Showing and hiding a node.
pub trait Visible {
    fn is_visible(&self, node: NodeId) -> bool;

    fn set_visible(&mut self, node: NodeId, visible: bool);
}

/// Background color of a node.
pub trait Colorable {
    fn background(&self, node: NodeId) -> Rgba;

    fn set_background(&mut self, node: NodeId, color: Rgba);
}

/// Synchronous re-entry into the native render step.
///
/// The scheduler calls this between depth levels so that geometry written
/// at one level has settled before deeper levels measure it.
pub trait RenderDriver {
    fn render_frame(&mut self);
}

/// Push-style resize notification.
///
/// Observers reduce per-frame polling where the toolkit supports change
/// callbacks; polling via [`Sizable::bounding_rect`] comparison remains
/// the source of truth.
pub trait ResizeNotify {
    /// Install `observer` on `node`; it fires whenever the node's box
    /// changes.
    fn observe_resize(&mut self, node: NodeId, observer: ResizeObserver);

    /// Drop every installed observer (before a fresh install pass).
    fn clear_resize_observers(&mut self);
}

/// Everything the layout engine requires of a host.
pub trait Host: Container + Positionable + Sizable + RenderDriver + ResizeNotify {}

impl<T> Host for T where T: Container + Positionable + Sizable + RenderDriver + ResizeNotify {}
