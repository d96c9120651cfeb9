//! Leaf Placement Policy - fitting a single widget inside its slot.
//!
//! Where the distributor partitions a container among many children, this
//! pass refines one child's box inside the slot it was given: scale the
//! slot extent, clamp it, apply it to the widget, re-probe what the widget
//! actually became, then justify and pad the result.

use crate::types::{Justify, Px, Rect, Slot};

// =============================================================================
// Placement attributes
// =============================================================================

/// Per-widget placement preferences, read by [`place`].
///
/// Stored in a side table owned by the engine, keyed by node identity,
/// and mutated only through explicit setters on
/// [`LayoutEngine`](crate::engine::LayoutEngine).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementAttributes {
    /// Fraction of the slot extent the widget should occupy per axis.
    pub scale_x: f32,
    pub scale_y: f32,
    /// Alignment of the realized box inside the slot, per axis.
    pub justify_x: Justify,
    pub justify_y: Justify,
    /// Size limits per axis; 0 = unbounded.
    pub min_x: Px,
    pub min_y: Px,
    pub max_x: Px,
    pub max_y: Px,
    /// Insets applied by start/end justification on the matching side.
    pub padding_left: Px,
    pub padding_right: Px,
    pub padding_top: Px,
    pub padding_bottom: Px,
}

impl Default for PlacementAttributes {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            justify_x: Justify::Start,
            justify_y: Justify::Start,
            min_x: 0,
            min_y: 0,
            max_x: 0,
            max_y: 0,
            padding_left: 0,
            padding_right: 0,
            padding_top: 0,
            padding_bottom: 0,
        }
    }
}

impl PlacementAttributes {
    /// Attributes that scale to a fraction of the slot on both axes.
    pub fn scaled(scale_x: f32, scale_y: f32) -> Self {
        Self {
            scale_x,
            scale_y,
            ..Self::default()
        }
    }

    /// Attributes that center the widget on both axes.
    pub fn centered() -> Self {
        Self {
            justify_x: Justify::Center,
            justify_y: Justify::Center,
            ..Self::default()
        }
    }
}

// =============================================================================
// Placement
// =============================================================================

fn clamp_extent(value: Px, min: Px, max: Px) -> Px {
    let mut result = value;
    if min > 0 && result < min {
        result = min;
    }
    if max > 0 && result > max {
        result = max;
    }
    result
}

/// Compute a widget's final box inside `slot`.
///
/// `probe` applies the requested size to the widget and reports the size
/// it actually realized; widgets that cannot be resized return `None` and
/// placement proceeds with the clamped candidate (soft failure).
///
/// Per axis the candidate size is `scale * slot_extent` clamped into
/// `[min, max]`. The final position centers the realized size for
/// [`Justify::Center`], or anchors it to the slot start/end offset by the
/// leading/trailing padding.
pub fn place<F>(slot: &Slot, attrs: &PlacementAttributes, mut probe: F) -> Rect
where
    F: FnMut(Px, Px) -> Option<(Px, Px)>,
{
    let candidate_w = clamp_extent(
        (attrs.scale_x * slot.width as f32).round() as Px,
        attrs.min_x,
        attrs.max_x,
    );
    let candidate_h = clamp_extent(
        (attrs.scale_y * slot.height as f32).round() as Px,
        attrs.min_y,
        attrs.max_y,
    );

    // What was set and what the widget became can differ; the realized
    // size is what gets positioned.
    let (width, height) = probe(candidate_w, candidate_h).unwrap_or((candidate_w, candidate_h));

    let x = slot.x
        + match attrs.justify_x {
            Justify::Start => attrs.padding_left,
            Justify::Center => (slot.width - width).abs() / 2,
            Justify::End => slot.width - width - attrs.padding_right,
        };
    let y = slot.y
        + match attrs.justify_y {
            Justify::Start => attrs.padding_top,
            Justify::Center => (slot.height - height).abs() / 2,
            Justify::End => slot.height - height - attrs.padding_bottom,
        };

    Rect::new(x, y, width, height)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(x: Px, y: Px, w: Px, h: Px) -> Slot {
        Rect::new(x, y, w, h)
    }

    /// Probe that realizes exactly what was requested.
    fn exact(w: Px, h: Px) -> Option<(Px, Px)> {
        Some((w, h))
    }

    #[test]
    fn test_half_scale_centered() {
        let attrs = PlacementAttributes {
            scale_x: 0.5,
            justify_x: Justify::Center,
            ..Default::default()
        };
        let rect = place(&slot(0, 0, 200, 40), &attrs, exact);
        assert_eq!(rect.width, 100);
        assert_eq!(rect.x, 50);
    }

    #[test]
    fn test_default_fills_slot_at_origin() {
        let rect = place(&slot(10, 20, 120, 60), &PlacementAttributes::default(), exact);
        assert_eq!(rect, Rect::new(10, 20, 120, 60));
    }

    #[test]
    fn test_start_justify_applies_leading_padding() {
        let attrs = PlacementAttributes {
            scale_x: 0.5,
            scale_y: 0.5,
            padding_left: 8,
            padding_top: 3,
            ..Default::default()
        };
        let rect = place(&slot(100, 200, 40, 20), &attrs, exact);
        assert_eq!((rect.x, rect.y), (108, 203));
        assert_eq!((rect.width, rect.height), (20, 10));
    }

    #[test]
    fn test_end_justify_applies_trailing_padding() {
        let attrs = PlacementAttributes {
            scale_x: 0.25,
            justify_x: Justify::End,
            padding_right: 5,
            ..Default::default()
        };
        let rect = place(&slot(0, 0, 200, 40), &attrs, exact);
        // 200 - 50 - 5
        assert_eq!(rect.x, 145);
    }

    #[test]
    fn test_min_max_clamp() {
        let attrs = PlacementAttributes {
            scale_x: 0.1,
            scale_y: 2.0,
            min_x: 30,
            max_y: 50,
            ..Default::default()
        };
        let rect = place(&slot(0, 0, 100, 40), &attrs, exact);
        assert_eq!(rect.width, 30); // 10 clamped up
        assert_eq!(rect.height, 50); // 80 clamped down
    }

    #[test]
    fn test_unavailable_probe_uses_candidates() {
        let attrs = PlacementAttributes {
            scale_x: 0.5,
            justify_x: Justify::Center,
            ..Default::default()
        };
        let rect = place(&slot(0, 0, 200, 40), &attrs, |_, _| None);
        assert_eq!(rect.width, 100);
        assert_eq!(rect.x, 50);
    }

    #[test]
    fn test_realized_size_wins_over_requested() {
        // The widget refuses to shrink below 150 wide.
        let attrs = PlacementAttributes {
            scale_x: 0.5,
            justify_x: Justify::Center,
            ..Default::default()
        };
        let rect = place(&slot(0, 0, 200, 40), &attrs, |_, h| Some((150, h)));
        assert_eq!(rect.width, 150);
        assert_eq!(rect.x, 25);
    }

    #[test]
    fn test_oversized_realized_centering_uses_absolute_difference() {
        // Realized 260 in a 200 slot: |200 - 260| / 2 = 30 from slot start.
        let attrs = PlacementAttributes {
            justify_x: Justify::Center,
            ..Default::default()
        };
        let rect = place(&slot(0, 0, 200, 40), &attrs, |_, h| Some((260, h)));
        assert_eq!(rect.x, 30);
    }

    #[test]
    fn test_scale_zero_collapses() {
        let attrs = PlacementAttributes::scaled(0.0, 0.0);
        let rect = place(&slot(0, 0, 200, 40), &attrs, exact);
        assert_eq!((rect.width, rect.height), (0, 0));
    }
}
