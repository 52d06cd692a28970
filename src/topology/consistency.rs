//! Three-way router-set containment checks between the merged tables.

use std::collections::BTreeSet;

use crate::diagnostics::{DiagnosticKind, Diagnostics};

use super::types::{IbgpTable, IgpTable, LinkKey, PrefixTable};

/// Router-set differences characterizing a topology mismatch.
///
/// A session between routers without IGP reachability or a border router
/// outside the control plane breaks the simulation; an IGP-only router is
/// merely suspicious.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyResult {
    /// Routers with iBGP sessions but no IGP link (error).
    pub ibgp_not_igp: BTreeSet<String>,
    /// Routers in the IGP graph that run no iBGP session (warning).
    pub igp_not_ibgp: BTreeSet<String>,
    /// Border routers outside the intersection of both graphs (error).
    pub asbr_not_bgp: BTreeSet<String>,
}

impl ConsistencyResult {
    /// True when all three violation sets are empty.
    pub fn consistent(&self) -> bool {
        self.ibgp_not_igp.is_empty()
            && self.igp_not_ibgp.is_empty()
            && self.asbr_not_bgp.is_empty()
    }

    /// Record one diagnostic per offending router.
    pub fn emit_diagnostics(&self, diags: &mut Diagnostics) {
        for router in &self.ibgp_not_igp {
            diags.error(
                DiagnosticKind::ConsistencyViolation,
                format!("router {router} runs iBGP sessions but has no IGP link"),
            );
        }
        for router in &self.igp_not_ibgp {
            diags.warn(
                DiagnosticKind::ConsistencyViolation,
                format!("router {router} is in the IGP topology but runs no iBGP session"),
            );
        }
        for router in &self.asbr_not_bgp {
            diags.error(
                DiagnosticKind::ConsistencyViolation,
                format!("border router {router} originates prefixes but is outside the control plane"),
            );
        }
    }
}

fn routers_of<'a>(keys: impl Iterator<Item = &'a LinkKey>) -> BTreeSet<String> {
    let mut routers = BTreeSet::new();
    for key in keys {
        routers.insert(key.left().to_string());
        routers.insert(key.right().to_string());
    }
    routers
}

/// Compute the three violation sets from the finalized tables.
///
/// Runs in O(routers + links); the tables are only read.
pub fn check_consistency(
    igp: &IgpTable,
    ibgp: &IbgpTable,
    prefixes: &PrefixTable,
) -> ConsistencyResult {
    let routers_igp = routers_of(igp.keys());
    let routers_ibgp = routers_of(ibgp.keys());
    let asbrs: BTreeSet<String> = prefixes.keys().cloned().collect();

    let control_plane: BTreeSet<String> =
        routers_igp.intersection(&routers_ibgp).cloned().collect();

    ConsistencyResult {
        ibgp_not_igp: routers_ibgp.difference(&routers_igp).cloned().collect(),
        igp_not_ibgp: routers_igp.difference(&routers_ibgp).cloned().collect(),
        asbr_not_bgp: asbrs.difference(&control_plane).cloned().collect(),
    }
}
