//! Rule Parser - distribution-rule strings into validated parts.
//!
//! Parsing is strict about structure (brackets, arity, unit budgets) and
//! lenient about presentation: keywords are case-insensitive and
//! whitespace is insignificant everywhere.

use thiserror::Error;

use crate::types::Px;

// =============================================================================
// Parsed representation
// =============================================================================

/// How a single part claims space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// `<N>u` - N units out of the rule's total.
    Units(u32),
    /// `<N>%` - N units out of 100.
    Percent(u32),
    /// `r` / `<N>r` - weighted share of whatever space is left.
    Remainder(u32),
}

impl PartKind {
    /// Magnitude of an explicit (`Units`/`Percent`) part; `None` for
    /// remainder parts.
    pub const fn explicit_magnitude(&self) -> Option<u32> {
        match self {
            PartKind::Units(n) | PartKind::Percent(n) => Some(*n),
            PartKind::Remainder(_) => None,
        }
    }
}

/// Optional size limits attached to a part via `[min=..,max=..]`.
///
/// Zero means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub min: Px,
    pub max: Px,
}

impl Bounds {
    const fn is_unbounded(&self) -> bool {
        self.min == 0 && self.max == 0
    }
}

/// One positional part of a distribution rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulePart {
    pub kind: PartKind,
    pub bounds: Bounds,
}

/// A validated distribution rule: the unit budget plus one part per child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionRule {
    pub total_units: u32,
    pub parts: Vec<RulePart>,
}

// =============================================================================
// Errors
// =============================================================================

/// Why a rule string was rejected.
///
/// A rejected rule fails the recomputation of exactly the container that
/// carries it; the scheduler logs the error and leaves the container's
/// previous geometry in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("rule has {found} parts but the container has {expected} children")]
    Arity { expected: usize, found: usize },

    #[error("remainder part {part} carries min/max bounds")]
    Constraint { part: usize },

    #[error("explicit parts claim {claimed} of {total_units} available units")]
    Overflow { claimed: u32, total_units: u32 },
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a distribution rule against the container's current child count.
///
/// An empty rule is not an error: it defaults to `child_count` equal
/// percent parts of `100 / child_count` each.
///
/// # Examples
///
/// ```
/// use apportion::rule::{parse, PartKind};
///
/// let rule = parse("20:10u, 5u, r", 3).unwrap();
/// assert_eq!(rule.total_units, 20);
/// assert_eq!(rule.parts[2].kind, PartKind::Remainder(1));
///
/// let rule = parse("", 4).unwrap();
/// assert_eq!(rule.parts.len(), 4);
/// assert!(rule.parts.iter().all(|p| p.kind == PartKind::Percent(25)));
/// ```
pub fn parse(rule: &str, child_count: usize) -> Result<DistributionRule, RuleError> {
    let trimmed = rule.trim();
    if trimmed.is_empty() {
        return Ok(default_rule(child_count));
    }

    let (total_units, body) = split_total_units(trimmed)?;
    if total_units == 0 {
        return Err(RuleError::Syntax("total units must be positive".into()));
    }

    let raw_parts = split_parts(body)?;
    let mut parts = Vec::with_capacity(raw_parts.len());
    for (index, raw) in raw_parts.iter().enumerate() {
        parts.push(parse_part(raw, index)?);
    }

    if parts.len() != child_count {
        return Err(RuleError::Arity {
            expected: child_count,
            found: parts.len(),
        });
    }

    let claimed: u32 = parts
        .iter()
        .filter_map(|p| p.kind.explicit_magnitude())
        .sum();
    if claimed > total_units {
        return Err(RuleError::Overflow {
            claimed,
            total_units,
        });
    }

    Ok(DistributionRule { total_units, parts })
}

/// Equal percent shares for every child, used when the rule is empty.
fn default_rule(child_count: usize) -> DistributionRule {
    let parts = if child_count == 0 {
        Vec::new()
    } else {
        log::debug!(
            "empty distribution rule, defaulting to {} equal percent parts",
            child_count
        );
        let share = 100 / child_count as u32;
        vec![
            RulePart {
                kind: PartKind::Percent(share),
                bounds: Bounds::default(),
            };
            child_count
        ]
    };
    DistributionRule {
        total_units: 100,
        parts,
    }
}

/// Resolve the `<N>:` prefix into a unit budget; default is 100 (percent
/// semantics).
fn split_total_units(rule: &str) -> Result<(u32, &str), RuleError> {
    let Some(colon) = rule.find(':') else {
        return Ok((100, rule));
    };
    let head = rule[..colon].trim();
    let total = head
        .parse::<u32>()
        .map_err(|_| RuleError::Syntax(format!("bad total-units prefix '{head}'")))?;
    Ok((total, &rule[colon + 1..]))
}

/// Split the part list on `,`/`;`, honoring `[...]` groups so their inner
/// separators do not break a part apart. Unbalanced brackets are syntax
/// errors.
fn split_parts(body: &str) -> Result<Vec<String>, RuleError> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;

    for c in body.chars() {
        match c {
            '[' => {
                depth += 1;
                if depth > 1 {
                    return Err(RuleError::Syntax("nested '[' in extra-argument group".into()));
                }
                current.push(c);
            }
            ']' => {
                if depth == 0 {
                    return Err(RuleError::Syntax("unmatched ']'".into()));
                }
                depth -= 1;
                current.push(c);
            }
            ',' | ';' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if depth != 0 {
        return Err(RuleError::Syntax("unclosed '[' in extra-argument group".into()));
    }
    parts.push(current);
    Ok(parts)
}

/// Parse one part: a magnitude/kind body plus an optional bounds group.
fn parse_part(raw: &str, index: usize) -> Result<RulePart, RuleError> {
    let raw = raw.trim();
    let (body, bounds) = match raw.find('[') {
        Some(open) => {
            let close = raw
                .rfind(']')
                .ok_or_else(|| RuleError::Syntax(format!("part {index}: unclosed '['")))?;
            if close != raw.len() - 1 {
                return Err(RuleError::Syntax(format!(
                    "part {index}: trailing input after ']'"
                )));
            }
            (raw[..open].trim(), parse_bounds(&raw[open + 1..close], index)?)
        }
        None => (raw, Bounds::default()),
    };

    let kind = parse_kind(body, index)?;
    if matches!(kind, PartKind::Remainder(_)) && !bounds.is_unbounded() {
        return Err(RuleError::Constraint { part: index });
    }

    Ok(RulePart { kind, bounds })
}

/// Parse the `name=value` pairs of a bounds group.
fn parse_bounds(args: &str, index: usize) -> Result<Bounds, RuleError> {
    let mut bounds = Bounds::default();
    for pair in args.split([',', ';']) {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (name, value) = pair.split_once('=').ok_or_else(|| {
            RuleError::Syntax(format!("part {index}: expected name=value, got '{pair}'"))
        })?;
        let value: Px = value.trim().parse().map_err(|_| {
            RuleError::Syntax(format!("part {index}: bad integer '{}'", value.trim()))
        })?;
        if value < 0 {
            return Err(RuleError::Syntax(format!(
                "part {index}: negative bound {value}"
            )));
        }
        match name.trim().to_ascii_lowercase().as_str() {
            "min" => bounds.min = value,
            "max" => bounds.max = value,
            other => {
                return Err(RuleError::Syntax(format!(
                    "part {index}: unknown extra argument '{other}'"
                )));
            }
        }
    }
    Ok(bounds)
}

/// Parse a part body: `<N>%`, `<N>u`, `r` or `<N>r`.
fn parse_kind(body: &str, index: usize) -> Result<PartKind, RuleError> {
    let compact: String = body
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    let (magnitude, suffix) = match compact.bytes().last() {
        Some(b'%') => (&compact[..compact.len() - 1], b'%'),
        Some(b'u') => (&compact[..compact.len() - 1], b'u'),
        Some(b'r') => (&compact[..compact.len() - 1], b'r'),
        _ => {
            return Err(RuleError::Syntax(format!(
                "part {index}: unrecognized part '{body}'"
            )));
        }
    };

    // Bare `r` is a remainder of weight 1; `%` and `u` require a magnitude.
    if magnitude.is_empty() {
        return if suffix == b'r' {
            Ok(PartKind::Remainder(1))
        } else {
            Err(RuleError::Syntax(format!(
                "part {index}: missing magnitude in '{body}'"
            )))
        };
    }

    let n = magnitude.parse::<u32>().map_err(|_| {
        RuleError::Syntax(format!("part {index}: bad magnitude '{magnitude}'"))
    })?;

    Ok(match suffix {
        b'%' => PartKind::Percent(n),
        b'u' => PartKind::Units(n),
        _ => PartKind::Remainder(n),
    })
}

// =============================================================================
// Tests
// =============================================================================
