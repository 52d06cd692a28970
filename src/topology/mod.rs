//! Topology merge, consistency and repair passes.
//!
//! This module contains the canonical link/session tables, the merge
//! engines that fold directed observations into them, and the passes that
//! check and repair the finished topology.

pub mod consistency;
pub mod ibgp;
pub mod igp;
pub mod prefixes;
pub mod repair;
pub mod types;

// Re-export key types and functions for easier access
pub use consistency::{check_consistency, ConsistencyResult};
pub use ibgp::{IbgpConfig, IbgpMerger};
pub use igp::{IgpConfig, IgpMerger};
pub use prefixes::PrefixCollector;
pub use repair::{repair, IbgpRecord, IgpRecord, PrefixRecord, RepairedTopology};
pub use types::{
    select_ibgp, IbgpLabel, IbgpTable, IgpTable, InvalidLabel, LabelPair, LinkKey, Metric,
    MetricPair, PrefixTable, SelfLoop,
};
