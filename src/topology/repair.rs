//! Filters the merged tables into a corrected topology.
//!
//! All decisions are driven by sets computed in
//! [`check_consistency`](super::consistency::check_consistency); no new
//! validation happens here.

use std::fmt;

use ipnet::Ipv4Net;

use crate::diagnostics::{DiagnosticKind, Diagnostics};

use super::consistency::ConsistencyResult;
use super::types::{IbgpLabel, IbgpTable, IgpTable, Metric, PrefixTable};

/// One directed IGP link, rendered as a tab-separated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgpRecord {
    pub src: String,
    pub dst: String,
    pub metric: Metric,
}

impl fmt::Display for IgpRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.src, self.dst, self.metric)
    }
}

/// One directed iBGP session, rendered as a tab-separated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IbgpRecord {
    pub src: String,
    pub dst: String,
    pub label: IbgpLabel,
}

impl fmt::Display for IbgpRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.src, self.dst, self.label)
    }
}

/// One prefix origin, rendered as a tab-separated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRecord {
    pub asbr: String,
    pub prefix: Ipv4Net,
}

impl fmt::Display for PrefixRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.asbr, self.prefix)
    }
}

/// Corrected topology, ready to be written back out.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RepairedTopology {
    pub igp: Vec<IgpRecord>,
    pub ibgp: Vec<IbgpRecord>,
    pub prefixes: Vec<PrefixRecord>,
}

/// Filter the merged tables against the violation sets.
///
/// IGP links keep each direction that was actually observed. Sessions are
/// all-or-nothing: one endpoint missing from the IGP topology or one
/// unresolved direction drops the whole session. Prefixes of border routers
/// outside the control plane are dropped wholesale. Every drop is recorded
/// as an informational diagnostic.
pub fn repair(
    igp: &IgpTable,
    ibgp: &IbgpTable,
    prefixes: &PrefixTable,
    violations: &ConsistencyResult,
    diags: &mut Diagnostics,
) -> RepairedTopology {
    let mut repaired = RepairedTopology::default();

    for (key, pair) in igp {
        if pair.forward.is_none() && pair.reverse.is_none() {
            diags.info(
                DiagnosticKind::AsymmetricLink,
                format!("dropping IGP link {key}: no direction was ever observed"),
            );
            continue;
        }
        if let Some(metric) = pair.forward {
            repaired.igp.push(IgpRecord {
                src: key.left().to_string(),
                dst: key.right().to_string(),
                metric,
            });
        }
        if let Some(metric) = pair.reverse {
            repaired.igp.push(IgpRecord {
                src: key.right().to_string(),
                dst: key.left().to_string(),
                metric,
            });
        }
    }

    for (key, pair) in ibgp {
        if violations.ibgp_not_igp.contains(key.left())
            || violations.ibgp_not_igp.contains(key.right())
        {
            diags.info(
                DiagnosticKind::ConsistencyViolation,
                format!("dropping iBGP session {key}: endpoint missing from the IGP topology"),
            );
            continue;
        }
        if !pair.forward.is_set() || !pair.reverse.is_set() {
            diags.info(
                DiagnosticKind::AsymmetricSession,
                format!("dropping iBGP session {key}: unresolved direction"),
            );
            continue;
        }
        repaired.ibgp.push(IbgpRecord {
            src: key.left().to_string(),
            dst: key.right().to_string(),
            label: pair.forward,
        });
        repaired.ibgp.push(IbgpRecord {
            src: key.right().to_string(),
            dst: key.left().to_string(),
            label: pair.reverse,
        });
    }

    for (asbr, originated) in prefixes {
        if violations.asbr_not_bgp.contains(asbr) {
            diags.info(
                DiagnosticKind::ConsistencyViolation,
                format!("dropping prefixes originated by {asbr}: router is not in both topologies"),
            );
            continue;
        }
        for prefix in originated {
            repaired.prefixes.push(PrefixRecord {
                asbr: asbr.clone(),
                prefix: *prefix,
            });
        }
    }

    repaired
}
