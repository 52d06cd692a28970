//! # Topocheck - Validation and repair of BGP/IGP topology descriptions
//!
//! This library validates the control-plane topology files that drive
//! BGP/IGP routing simulations and writes back repaired copies.
//!
//! ## Overview
//!
//! Simulation topologies are described by three hand-authored files: an IGP
//! link-metric graph, an iBGP session graph with route-reflection labels,
//! and a table mapping border routers to the prefixes they originate. Such
//! files accumulate duplicates, missing reverse directions and outright
//! contradictions. Topocheck folds every directed observation into
//! canonical per-link records, resolves disagreements, cross-checks the
//! three router sets and emits `.fixed` files containing only the records
//! that survive.
//!
//! ## Key Features
//!
//! - **Canonical link keys**: both directions of a link or session land in
//!   the same table entry regardless of input order
//! - **Minimum-tightening IGP merge**: duplicate metrics keep the minimum
//!   and disagreements are reported, never silently dropped
//! - **iBGP label algebra**: `UP`/`OVER`/`DOWN` observations are resolved
//!   to the label least constraining route spread, with optional reverse
//!   inference from the symmetric label
//! - **Consistency checking**: three-way containment checks between the
//!   IGP, iBGP and border-router sets
//! - **Deterministic repair**: dropped records are decided purely by the
//!   violation sets, so rerunning on repaired output is a fixed point
//! - **Diagnostics collector**: every skipped or rewritten record is kept
//!   with its severity instead of being interleaved with the output
//!
//! ## Architecture
//!
//! The library is organized into a few modules:
//!
//! - `topology`: canonical tables, the merge engines, consistency checking
//!   and repair
//! - `line_parser`: fixed-grammar tokenizers and file loaders
//! - `diagnostics`: severity-tagged diagnostics collection
//! - `report`: `.fixed` file emission and the optional JSON run report
//! - `prefix_gen`: synthetic prefix-origin generators for building inputs
//!
//! ## Example Usage
//!
//! ```rust
//! use topocheck::diagnostics::Diagnostics;
//! use topocheck::topology::{
//!     check_consistency, IbgpConfig, IbgpMerger, IgpConfig, IgpMerger, PrefixCollector,
//! };
//!
//! let mut diags = Diagnostics::new();
//!
//! let mut igp = IgpMerger::new(IgpConfig::default());
//! igp.ingest("lyon", "paris", 10, &mut diags);
//! igp.ingest("paris", "lyon", 10, &mut diags);
//!
//! let mut ibgp = IbgpMerger::new(IbgpConfig::default());
//! ibgp.ingest("lyon", "paris", "UP", &mut diags);
//! ibgp.ingest("paris", "lyon", "DOWN", &mut diags);
//!
//! let igp = igp.finish(&mut diags);
//! let ibgp = ibgp.finish(&mut diags);
//! let prefixes = PrefixCollector::new().finish();
//!
//! let result = check_consistency(&igp, &ibgp, &prefixes);
//! assert!(result.consistent());
//! ```
//!
//! ## Input Format
//!
//! Inputs hold one whitespace-separated record per line:
//!
//! - IGP links: `src dst metric`, e.g. `lyon paris 10`
//! - iBGP sessions: `src dst UP|OVER|DOWN`, e.g. `lyon paris UP`
//! - Prefix origins: `asbr a.b.c.d/len`, e.g. `paris 101.1.0.0/24`
//!
//! Empty lines are skipped; malformed lines are reported and dropped
//! without aborting the run.
//!
//! ## Error Handling
//!
//! The library uses `color_eyre` for fatal failures (unreadable or
//! unwritable files) and a [`diagnostics::Diagnostics`] collector for
//! everything recoverable, so merge logic stays testable without capturing
//! console output.

pub mod diagnostics;
pub mod line_parser;
pub mod prefix_gen;
pub mod report;
pub mod topology;
