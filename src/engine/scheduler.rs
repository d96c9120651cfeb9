//! Layout Scheduler / Dirty Tracker - the per-frame control flow.
//!
//! Two phases bracket the host's native render, both on the render thread:
//!
//! - **Pre-render**: snapshot every registered container's bounding box;
//!   rebuild the tree index (and reinstall resize observers) on the first
//!   frame or whenever the tree structure drifted.
//! - **Post-render**: bootstrap-lay every container once on the first
//!   frame, then repeatedly sweep for containers whose box changed,
//!   processing each batch in ascending depth order. A render refresh is
//!   forced between non-adjacent depth levels so deeper containers measure
//!   settled geometry. Dirty nodes not yet present in the index defer the
//!   whole batch one frame.

use std::rc::Rc;

use log::{debug, warn};

use super::{LayoutEngine, TreeIndex};
use crate::host::Host;
use crate::placement::place;
use crate::rule::{DistributionFlags, distribute, parse};
use crate::types::{NodeId, Slot};

/// A dirty container ordered for processing: depth first, DFS entry order
/// within a depth level.
type QueueItem = (u32, u32, NodeId);

impl LayoutEngine {
    // =========================================================================
    // Pre-render phase
    // =========================================================================

    /// Run the pre-render phase: snapshot container sizes and rebuild the
    /// tree index if the structure drifted.
    pub fn pre_frame<H: Host>(&mut self, host: &mut H) {
        let nodes = self.registry.borrow().nodes();
        for node in nodes {
            let (width, height) = host.bounding_rect(node);
            self.registry.borrow_mut().snapshot(node, width, height);
        }

        if self.index.is_none() || self.structure_drifted(host) {
            self.rebuild_index(host);
        }
    }

    /// A previously indexed node disappeared or changed its child count.
    fn structure_drifted<H: Host>(&self, host: &H) -> bool {
        let Some(index) = &self.index else {
            return true;
        };
        for (node, recorded) in index.child_counts() {
            if !host.exists(node) {
                debug!("indexed node {node} no longer exists, tree index is stale");
                return true;
            }
            if host.children_of(node).len() != recorded {
                debug!("child count changed under {node}, tree index is stale");
                return true;
            }
        }
        false
    }

    /// Rebuild the index from scratch and reinstall resize observers on
    /// every registered container.
    fn rebuild_index<H: Host>(&mut self, host: &mut H) {
        self.index = Some(TreeIndex::build(host, self.root));

        host.clear_resize_observers();
        let nodes = self.registry.borrow().nodes();
        for node in nodes {
            let dirty = Rc::clone(&self.dirty);
            host.observe_resize(
                node,
                Rc::new(move |changed| {
                    dirty.borrow_mut().insert(changed);
                }),
            );
        }
    }

    // =========================================================================
    // Post-render phase
    // =========================================================================

    /// Run the post-render phase: bootstrap on the first call, then drain
    /// resized containers depth by depth until geometry is stable.
    pub fn post_frame<H: Host>(&mut self, host: &mut H) {
        if self.first_post_run {
            self.bootstrap(host);
            self.first_post_run = false;
        }

        loop {
            self.sweep_resized(host);

            let batch: Vec<NodeId> = {
                let registry = self.registry.borrow();
                let mut dirty = self.dirty.borrow_mut();
                // Containers deregistered since they were marked are no
                // longer ours to process.
                dirty.retain(|node| registry.contains(*node));
                if dirty.is_empty() {
                    break;
                }
                dirty.iter().copied().collect()
            };

            // Re-snapshot before applying anything, so the next sweep
            // compares against the geometry this batch is about to write.
            let nodes = self.registry.borrow().nodes();
            for node in nodes {
                let (width, height) = host.bounding_rect(node);
                self.registry.borrow_mut().snapshot(node, width, height);
            }

            let Some(queue) = self.depth_queue(&batch) else {
                warn!(
                    "dirty containers reference tree positions not yet indexed; \
                     deferring the batch one frame"
                );
                break;
            };

            self.process_queue(host, &queue);
            self.dirty.borrow_mut().clear();
        }
    }

    /// First-frame pass: lay out every registered container once, top-down
    /// by depth, refreshing the render after each so deeper containers
    /// measure post-parent-resize geometry.
    fn bootstrap<H: Host>(&mut self, host: &mut H) {
        let mut queue: Vec<QueueItem> = Vec::new();
        let nodes = self.registry.borrow().nodes();
        for node in nodes {
            let ordering = self
                .index
                .as_ref()
                .and_then(|index| Some((index.depth(node)?, index.entry(node)?)));
            match ordering {
                Some((depth, entry)) => queue.push((depth, entry, node)),
                None => warn!("container {node} is not in the tree index at bootstrap, skipping"),
            }
        }
        queue.sort_unstable();

        for (_, _, node) in queue {
            self.apply_container(host, node);
            host.render_frame();
        }
    }

    /// Add every container whose current box differs from its pre-render
    /// snapshot to the dirty set. Entries that were never snapshotted
    /// (registered mid-frame) count as changed.
    fn sweep_resized<H: Host>(&mut self, host: &H) {
        let nodes = self.registry.borrow().nodes();
        for node in nodes {
            let current = host.bounding_rect(node);
            if self.registry.borrow().snapshot_of(node) != Some(current) {
                self.dirty.borrow_mut().insert(node);
            }
        }
    }

    /// Order a dirty batch by ascending depth; `None` if any node is
    /// missing from the index (the recoverable not-yet-synced condition).
    fn depth_queue(&self, batch: &[NodeId]) -> Option<Vec<QueueItem>> {
        let index = self.index.as_ref()?;
        let mut queue = Vec::with_capacity(batch.len());
        for &node in batch {
            queue.push((index.depth(node)?, index.entry(node)?, node));
        }
        queue.sort_unstable();
        Some(queue)
    }

    /// Consume a depth-ordered queue, forcing a render refresh whenever
    /// the next depth is not adjacent to the last processed one, and after
    /// the final level.
    fn process_queue<H: Host>(&mut self, host: &mut H, queue: &[QueueItem]) {
        let mut last_depth: Option<u32> = None;
        for &(depth, _, node) in queue {
            if let Some(last) = last_depth
                && depth > last + 1
            {
                host.render_frame();
            }
            self.apply_container(host, node);
            last_depth = Some(depth);
        }
        host.render_frame();
    }

    // =========================================================================
    // Applying a distribution
    // =========================================================================

    /// Recompute one container and write the results to its children.
    ///
    /// A rejected rule aborts only this container's recompute: the
    /// diagnostic is logged and the previous geometry stays.
    fn apply_container<H: Host>(&mut self, host: &mut H, node: NodeId) {
        let Some((axis, rule_text)) = self.registry.borrow().axis_rule(node) else {
            return;
        };

        let children = host.children_of(node);
        let rule = match parse(&rule_text, children.len()) {
            Ok(rule) => rule,
            Err(err) => {
                warn!("container {node}: rule '{rule_text}' rejected: {err}");
                return;
            }
        };

        let (width, height) = host.bounding_rect(node);
        let (main_extent, cross_extent) = axis.split(width, height);
        let result = distribute(&rule, axis, main_extent, cross_extent);
        if result.flags.contains(DistributionFlags::REMAINDERS_DROPPED) {
            warn!("container {node}: no space left, remainder parts dropped");
        }

        for (child, slot) in children.into_iter().zip(result.slots) {
            let Some(slot) = slot else {
                debug!("container {node}: child {child} received no slot");
                continue;
            };
            if self.registry.borrow().contains(child) {
                // Nested containers get their full box; their own recompute
                // is picked up by the next sweep.
                host.set_position(child, slot.x, slot.y);
                host.set_size(child, slot.width, slot.height);
            } else {
                self.place_leaf(host, child, &slot);
            }
        }
    }

    /// Apply the leaf placement policy to a non-container child.
    fn place_leaf<H: Host>(&mut self, host: &mut H, child: NodeId, slot: &Slot) {
        let attrs = self.attributes(child);
        let resizable = host.supports_resize(child);
        if !resizable {
            warn!("leaf {child} does not support resizing, placing best-effort");
        }

        let rect = place(slot, &attrs, |width, height| {
            if resizable {
                host.set_size(child, width, height);
                Some(host.bounding_rect(child))
            } else {
                None
            }
        });
        host.set_position(child, rect.x, rect.y);
    }
}

// =============================================================================
// Tests
// =============================================================================
