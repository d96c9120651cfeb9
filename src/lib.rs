//! # apportion
//!
//! Rule-driven proportional layout for retained widget trees.
//!
//! A layout container owns its children's geometry and recomputes it from
//! a compact textual rule (`"20:10u,5u,r"`, `"40%,60%"`, ...). The engine
//! partitions the container's extent along one axis among its direct
//! children; children that are themselves containers are re-partitioned
//! recursively, and leaf widgets get a placement pass (scale, clamp,
//! justify, pad) inside their allocated slot.
//!
//! ## Architecture
//!
//! The pipeline runs once per rendered frame, frame-synchronously:
//!
//! ```text
//! pre_frame (snapshot + index) → native render → post_frame (dirty drain)
//! ```
//!
//! ## Modules
//!
//! - [`types`] - node identity, pixel geometry, axes, justification
//! - [`rule`] - the rule DSL parser and the proportional distributor
//! - [`placement`] - leaf placement policy inside an allocated slot
//! - [`host`] - capability traits for the widget toolkit, plus an
//!   in-memory reference host
//! - [`engine`] - container registry, tree indexer and the frame scheduler

pub mod engine;
pub mod host;
pub mod placement;
pub mod rule;
pub mod types;

// Re-export commonly used items
pub use types::{Axis, Justify, NodeId, Px, Rect, Rgba, Slot};

pub use rule::{
    Bounds, Distribution, DistributionFlags, DistributionRule, PartKind, RuleError, RulePart,
    distribute, parse,
};

pub use placement::{PlacementAttributes, place};

pub use host::{
    Colorable, Container, Host, MemoryHost, Positionable, RenderDriver, ResizeNotify,
    ResizeObserver, Sizable, Visible,
};

pub use engine::{ContainerHandle, LayoutEngine, TreeIndex};
