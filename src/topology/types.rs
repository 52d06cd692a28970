//! Core types for the topology merge engines.
//!
//! Router names are plain case-sensitive strings under their lexicographic
//! order; links and sessions are keyed by the canonical (sorted) endpoint
//! pair so both directions of an observation land in the same table entry.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ipnet::Ipv4Net;

/// IGP link metric. `None` in a [`MetricPair`] means the direction was never
/// observed.
pub type Metric = u32;

/// Error returned by [`LinkKey::canonical`] when both endpoints name the same
/// router.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("self-looping link ({router}, {router})")]
pub struct SelfLoop {
    pub router: String,
}

/// Error returned by [`IbgpLabel::from_token`] for tokens outside the session
/// grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid iBGP session label '{token}' (expected UP, OVER or DOWN)")]
pub struct InvalidLabel {
    pub token: String,
}

/// Canonical, order-independent key for a link or session between two
/// routers.
///
/// Endpoints are stored sorted (`left < right`), so `canonical(a, b)` and
/// `canonical(b, a)` yield the same key; the flag returned alongside records
/// whether the observation had to be flipped to reach this form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkKey {
    left: String,
    right: String,
}

impl LinkKey {
    /// Canonicalize an ordered endpoint pair.
    ///
    /// Returns the key and `true` when `src`/`dst` had to be swapped. Fails
    /// with [`SelfLoop`] when both endpoints are equal; no table entry exists
    /// for such an observation.
    pub fn canonical(src: &str, dst: &str) -> Result<(Self, bool), SelfLoop> {
        if src == dst {
            return Err(SelfLoop {
                router: src.to_string(),
            });
        }
        let swapped = src > dst;
        let key = if swapped {
            LinkKey {
                left: dst.to_string(),
                right: src.to_string(),
            }
        } else {
            LinkKey {
                left: src.to_string(),
                right: dst.to_string(),
            }
        };
        Ok((key, swapped))
    }

    /// Lexicographically smaller endpoint.
    pub fn left(&self) -> &str {
        &self.left
    }

    /// Lexicographically larger endpoint.
    pub fn right(&self) -> &str {
        &self.right
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.left, self.right)
    }
}

/// Pair of directional metrics for one canonical link.
///
/// `forward` is the `left -> right` direction of the key, `reverse` the
/// opposite one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricPair {
    pub forward: Option<Metric>,
    pub reverse: Option<Metric>,
}

/// Directional classification of an iBGP session relative to the
/// route-reflection hierarchy.
///
/// `Up`: the source is a reflection client of the destination. `Over`: plain
/// peers. `Down`: the source reflects routes to the destination (mirror of
/// `Up`). `Unset`: the direction was never observed.
///
/// The enum deliberately does not implement `Ord`; the only order the labels
/// carry is the resolution rank used by [`select_ibgp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IbgpLabel {
    Up,
    Over,
    Down,
    Unset,
}

impl IbgpLabel {
    /// Parse a session token from an input line.
    pub fn from_token(token: &str) -> Result<Self, InvalidLabel> {
        match token {
            "UP" => Ok(IbgpLabel::Up),
            "OVER" => Ok(IbgpLabel::Over),
            "DOWN" => Ok(IbgpLabel::Down),
            _ => Err(InvalidLabel {
                token: token.to_string(),
            }),
        }
    }

    /// Output token for repaired files, `None` for `Unset`.
    pub fn as_token(self) -> Option<&'static str> {
        match self {
            IbgpLabel::Up => Some("UP"),
            IbgpLabel::Over => Some("OVER"),
            IbgpLabel::Down => Some("DOWN"),
            IbgpLabel::Unset => None,
        }
    }

    /// The same session seen from the opposite endpoint.
    ///
    /// Involution on `{Up, Over, Down}`: `sym(Up) = Down`, `sym(Over) =
    /// Over`, `sym(Down) = Up`; `Unset` stays `Unset`.
    pub fn symmetric(self) -> Self {
        match self {
            IbgpLabel::Up => IbgpLabel::Down,
            IbgpLabel::Over => IbgpLabel::Over,
            IbgpLabel::Down => IbgpLabel::Up,
            IbgpLabel::Unset => IbgpLabel::Unset,
        }
    }

    pub fn is_set(self) -> bool {
        self != IbgpLabel::Unset
    }

    /// Fixed resolution order `Up < Over < Down < Unset`, used exclusively by
    /// [`select_ibgp`]. Not a semantic ranking of session types.
    fn resolution_rank(self) -> u8 {
        match self {
            IbgpLabel::Up => 0,
            IbgpLabel::Over => 1,
            IbgpLabel::Down => 2,
            IbgpLabel::Unset => 3,
        }
    }

    /// `Down` counts as `Over` during resolution.
    fn normalized(self) -> Self {
        if self == IbgpLabel::Down {
            IbgpLabel::Over
        } else {
            self
        }
    }
}

impl fmt::Display for IbgpLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token().unwrap_or("unset"))
    }
}

/// Resolve two observations of the same session direction to the label least
/// constraining iBGP route spread.
///
/// Any `Down` operand is first normalized to `Over`, then the smaller
/// resolution rank wins: `Up` beats `Over`, and any set label beats `Unset`.
pub fn select_ibgp(a: IbgpLabel, b: IbgpLabel) -> IbgpLabel {
    let a = a.normalized();
    let b = b.normalized();
    if a.resolution_rank() <= b.resolution_rank() {
        a
    } else {
        b
    }
}

/// Pair of directional session labels for one canonical link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPair {
    pub forward: IbgpLabel,
    pub reverse: IbgpLabel,
}

/// Merged IGP graph: canonical link to directional metric pair.
pub type IgpTable = BTreeMap<LinkKey, MetricPair>;

/// Merged iBGP session graph: canonical link to directional label pair.
pub type IbgpTable = BTreeMap<LinkKey, LabelPair>;

/// Border routers and the prefixes they originate.
pub type PrefixTable = BTreeMap<String, BTreeSet<Ipv4Net>>;
