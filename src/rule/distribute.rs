//! Proportional Distributor - parsed rule + container extents into slots.
//!
//! # Algorithm
//!
//! 1. Compute the unit measure `mu = main_extent / total_units`.
//! 2. Size every explicit (`Units`/`Percent`) part as `round(magnitude * mu)`,
//!    clamped into its `[min, max]` bounds.
//! 3. Split whatever extent is left across the remainder parts by weight.
//!    Negative leftover drops the remainder parts instead; positive leftover
//!    with no remainder parts stays unallocated as a trailing gap.
//! 4. If clamping pushed the total past the container, shrink every
//!    allocated part proportionally so the total fits exactly. Bounds are
//!    not re-enforced on the shrunk values.
//! 5. Emit slots contiguously in part order along the main axis.
//!
//! The function is pure: identical inputs always produce identical slots.

use bitflags::bitflags;

use super::parser::{DistributionRule, PartKind};
use crate::types::{Axis, Px, Slot};

bitflags! {
    /// Non-fatal outcomes of a distribution pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DistributionFlags: u8 {
        /// Explicit parts under-consumed the extent and no remainder part
        /// was there to absorb the surplus.
        const TRAILING_GAP = 1 << 0;
        /// Negative leftover: every remainder part was dropped.
        const REMAINDERS_DROPPED = 1 << 1;
        /// The allocated total exceeded the extent and all parts were
        /// shrunk proportionally to fit.
        const SHRUNK = 1 << 2;
    }
}

/// The result of distributing a rule over a container extent.
///
/// `slots` is positionally aligned with the rule's parts; `None` means the
/// part received no space (dropped remainder, or zero leftover).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub slots: Vec<Option<Slot>>,
    pub flags: DistributionFlags,
}

impl Distribution {
    /// Sum of all allocated main-axis extents.
    pub fn allocated_total(&self, axis: Axis) -> Px {
        self.slots
            .iter()
            .flatten()
            .map(|s| axis.split(s.width, s.height).0)
            .sum()
    }
}

/// Clamp an extent into `[min, max]`, 0 meaning unbounded on that side.
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

/// Distribute `main_extent` among the rule's parts, filling `cross_extent`
/// on the cross axis.
///
/// # Examples
///
/// ```
/// use apportion::rule::{distribute, parse};
/// use apportion::types::Axis;
///
/// let rule = parse("20:10u,5u,r", 3).unwrap();
/// let dist = distribute(&rule, Axis::Horizontal, 300, 40);
/// let widths: Vec<i32> = dist.slots.iter().map(|s| s.unwrap().width).collect();
/// assert_eq!(widths, vec![150, 75, 75]);
/// ```
pub fn distribute(
    rule: &DistributionRule,
    axis: Axis,
    main_extent: Px,
    cross_extent: Px,
) -> Distribution {
    let part_count = rule.parts.len();
    let mut sizes: Vec<Option<Px>> = vec![None; part_count];
    let mut flags = DistributionFlags::empty();

    // Explicit parts first: they claim space regardless of what is left.
    let mu = main_extent as f64 / rule.total_units as f64;
    let mut consumed: Px = 0;
    for (i, part) in rule.parts.iter().enumerate() {
        let Some(magnitude) = part.kind.explicit_magnitude() else {
            continue;
        };
        let provisional = (magnitude as f64 * mu).round() as Px;
        let size = clamp_extent(provisional, part.bounds.min, part.bounds.max);
        sizes[i] = Some(size);
        consumed += size;
    }

    let remaining = main_extent - consumed;
    let remainder_weights: Vec<(usize, u32)> = rule
        .parts
        .iter()
        .enumerate()
        .filter_map(|(i, p)| match p.kind {
            PartKind::Remainder(w) => Some((i, w)),
            _ => None,
        })
        .collect();

    if remaining > 0 {
        if remainder_weights.is_empty() {
            flags |= DistributionFlags::TRAILING_GAP;
        } else {
            split_remainder(remaining, &remainder_weights, &mut sizes);
        }
    } else if remaining < 0 && !remainder_weights.is_empty() {
        flags |= DistributionFlags::REMAINDERS_DROPPED;
    }
    // remaining == 0: remainder parts receive no slot, and that is not a
    // drop condition.

    // Min-clamping (or rounding) can overcommit the extent; scale every
    // allocated part back so the total matches exactly. Bounds are not
    // re-applied to the shrunk values.
    let allocated: Px = sizes.iter().flatten().sum();
    if allocated > main_extent {
        flags |= DistributionFlags::SHRUNK;
        shrink_to_fit(main_extent, allocated, &mut sizes);
    }

    // Lay the slots out contiguously, in part order. Dropped parts do not
    // advance the offset.
    let mut offset: Px = 0;
    let slots = sizes
        .into_iter()
        .map(|size| {
            size.map(|s| {
                let slot = axis.slot(offset, s, cross_extent);
                offset += s;
                slot
            })
        })
        .collect();

    Distribution { slots, flags }
}

/// Split `remaining` across the remainder parts proportionally to their
/// weights. Cumulative rounding keeps the shares summing to `remaining`
/// exactly.
fn split_remainder(remaining: Px, weights: &[(usize, u32)], sizes: &mut [Option<Px>]) {
    let total_weight: u32 = weights.iter().map(|(_, w)| w).sum();
    if total_weight == 0 {
        return;
    }
    let mut acc = 0.0f64;
    let mut prev: Px = 0;
    for &(i, w) in weights {
        acc += remaining as f64 * w as f64 / total_weight as f64;
        let cut = acc.round() as Px;
        sizes[i] = Some(cut - prev);
        prev = cut;
    }
}

/// Scale every allocated size by `main_extent / allocated` with cumulative
/// rounding, so the shrunk total equals `main_extent` exactly.
fn shrink_to_fit(main_extent: Px, allocated: Px, sizes: &mut [Option<Px>]) {
    let factor = main_extent as f64 / allocated as f64;
    let mut acc = 0.0f64;
    let mut prev: Px = 0;
    for size in sizes.iter_mut() {
        let Some(current) = *size else { continue };
        acc += current as f64 * factor;
        let cut = acc.round() as Px;
        *size = Some(cut - prev);
        prev = cut;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::parse;

    fn widths(dist: &Distribution) -> Vec<Option<Px>> {
        dist.slots.iter().map(|s| s.map(|r| r.width)).collect()
    }

    #[test]
    fn test_units_with_remainder() {
        // 300px at 20 units: mu = 15, so 10u = 150, 5u = 75, r takes the rest.
        let rule = parse("20:10u,5u,r", 3).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 300, 40);
        assert_eq!(widths(&dist), vec![Some(150), Some(75), Some(75)]);
        assert_eq!(dist.flags, DistributionFlags::empty());

        // Slots tile the extent in order.
        let xs: Vec<Px> = dist.slots.iter().map(|s| s.unwrap().x).collect();
        assert_eq!(xs, vec![0, 150, 225]);
        for slot in dist.slots.iter().flatten() {
            assert_eq!(slot.y, 0);
            assert_eq!(slot.height, 40);
        }
    }

    #[test]
    fn test_vertical_axis() {
        let rule = parse("50%,50%", 2).unwrap();
        let dist = distribute(&rule, Axis::Vertical, 300, 120);
        let a = dist.slots[0].unwrap();
        let b = dist.slots[1].unwrap();
        assert_eq!((a.y, a.height, a.width, a.x), (0, 150, 120, 0));
        assert_eq!((b.y, b.height, b.width, b.x), (150, 150, 120, 0));
    }

    #[test]
    fn test_percent_sum_under_100_leaves_gap() {
        let rule = parse("30%,30%", 2).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 200, 10);
        assert_eq!(widths(&dist), vec![Some(60), Some(60)]);
        assert!(dist.flags.contains(DistributionFlags::TRAILING_GAP));
        assert!(dist.allocated_total(Axis::Horizontal) <= 200);
    }

    #[test]
    fn test_percent_sum_exactly_100_fills() {
        for w in [99, 100, 187, 300, 1001] {
            let rule = parse("25%,25%,50%", 3).unwrap();
            let dist = distribute(&rule, Axis::Horizontal, w, 10);
            assert_eq!(
                dist.allocated_total(Axis::Horizontal),
                w,
                "extent {w} not fully covered"
            );
        }
    }

    #[test]
    fn test_remainder_only_splits_equally() {
        let rule = parse("r,r,r", 3).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 100, 10);
        let ws: Vec<Px> = dist.slots.iter().map(|s| s.unwrap().width).collect();
        assert_eq!(ws.iter().sum::<Px>(), 100);
        for w in &ws {
            assert!((33..=34).contains(w), "uneven share {w}");
        }
    }

    #[test]
    fn test_weighted_remainders() {
        let rule = parse("2r,r,r", 3).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 400, 10);
        assert_eq!(widths(&dist), vec![Some(200), Some(100), Some(100)]);
    }

    #[test]
    fn test_min_clamp_steals_from_remainder() {
        // 10% of 100 = 10, min pushes it to 40; the remainder gets 60.
        let rule = parse("10%[min=40],r", 2).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 100, 10);
        assert_eq!(widths(&dist), vec![Some(40), Some(60)]);
    }

    #[test]
    fn test_max_clamp() {
        let rule = parse("80%[max=50],r", 2).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 100, 10);
        assert_eq!(widths(&dist), vec![Some(50), Some(50)]);
    }

    #[test]
    fn test_negative_leftover_drops_remainders() {
        // Min bounds consume 120 of 100; the remainder is dropped entirely,
        // then the explicit parts shrink to fit.
        let rule = parse("50%[min=70],50%[min=50],r", 3).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 100, 10);
        assert!(dist.flags.contains(DistributionFlags::REMAINDERS_DROPPED));
        assert!(dist.flags.contains(DistributionFlags::SHRUNK));
        assert_eq!(dist.slots[2], None);
        assert_eq!(dist.allocated_total(Axis::Horizontal), 100);
    }

    #[test]
    fn test_leftover_zero_boundary() {
        // Explicit parts consume the extent exactly: the remainder part
        // receives no slot, but this is not the drop condition.
        let rule = parse("60%,40%,r", 3).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 100, 10);
        assert_eq!(widths(&dist), vec![Some(60), Some(40), None]);
        assert!(!dist.flags.contains(DistributionFlags::REMAINDERS_DROPPED));
        assert!(!dist.flags.contains(DistributionFlags::TRAILING_GAP));
    }

    #[test]
    fn test_shrink_ignores_bounds() {
        // Both parts are clamped up to 80 in a 100px container; the shrink
        // pass scales them below their mins and does not re-clamp.
        let rule = parse("50%[min=80],50%[min=80]", 2).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 100, 10);
        assert!(dist.flags.contains(DistributionFlags::SHRUNK));
        assert_eq!(widths(&dist), vec![Some(50), Some(50)]);
    }

    #[test]
    fn test_dropped_part_does_not_advance_offset() {
        let rule = parse("60%,r,40%", 3).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 100, 10);
        assert_eq!(dist.slots[1], None);
        // The third slot starts where the first ends.
        assert_eq!(dist.slots[2].unwrap().x, 60);
    }

    #[test]
    fn test_deterministic() {
        let rule = parse("10u,3r,r", 3).unwrap();
        let a = distribute(&rule, Axis::Vertical, 777, 31);
        let b = distribute(&rule, Axis::Vertical, 777, 31);
        assert_eq!(a, b);
    }

    #[test]
    fn test_slots_monotonic_and_disjoint() {
        let rule = parse("7u,13u,2r,r,5u", 5).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 997, 55);
        let mut last_end = 0;
        for slot in dist.slots.iter().flatten() {
            assert!(slot.x >= last_end, "slot overlaps its predecessor");
            last_end = slot.x + slot.width;
        }
        assert!(last_end <= 997);
    }

    #[test]
    fn test_zero_extent() {
        let rule = parse("50%,50%,r", 3).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 0, 10);
        assert_eq!(widths(&dist), vec![Some(0), Some(0), None]);
    }

    #[test]
    fn test_empty_rule_distributes_nothing() {
        let rule = parse("", 0).unwrap();
        let dist = distribute(&rule, Axis::Horizontal, 500, 10);
        assert!(dist.slots.is_empty());
        assert!(dist.flags.contains(DistributionFlags::TRAILING_GAP));
    }
}
