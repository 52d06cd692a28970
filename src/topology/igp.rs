//! Minimum-tightening merge of directed IGP metric observations.

use crate::diagnostics::{DiagnosticKind, Diagnostics};

use super::types::{IgpTable, LinkKey, Metric, MetricPair};

/// Tunables for [`IgpMerger`], mirroring the CLI surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgpConfig {
    /// Treat every observation as evidence for both directions, tightening
    /// the opposite one with `default_metric`.
    pub reverse_igp: bool,
    /// Metric merged into auto-filled reverse directions. `None` leaves the
    /// reverse direction unobserved even when `reverse_igp` is set.
    pub default_metric: Option<Metric>,
}

/// Folds directed `src dst metric` observations into a canonical link table.
///
/// Repeated observations of one direction keep the minimum metric. Values
/// that disagree raise a [`DiagnosticKind::ConflictingObservation`] warning
/// unless one of them is the configured default reverse metric.
#[derive(Debug, Default)]
pub struct IgpMerger {
    config: IgpConfig,
    table: IgpTable,
}

impl IgpMerger {
    pub fn new(config: IgpConfig) -> Self {
        IgpMerger {
            config,
            table: IgpTable::new(),
        }
    }

    /// Merge one directed observation into the table.
    ///
    /// Self-loops are dropped with a warning and never create an entry.
    pub fn ingest(&mut self, src: &str, dst: &str, metric: Metric, diags: &mut Diagnostics) {
        let (key, swapped) = match LinkKey::canonical(src, dst) {
            Ok(canonical) => canonical,
            Err(err) => {
                diags.warn(DiagnosticKind::SelfLoop, format!("ignoring IGP {err}"));
                return;
            }
        };

        let reverse_candidate = if self.config.reverse_igp {
            self.config.default_metric
        } else {
            None
        };
        let incoming = if swapped {
            MetricPair {
                forward: reverse_candidate,
                reverse: Some(metric),
            }
        } else {
            MetricPair {
                forward: Some(metric),
                reverse: reverse_candidate,
            }
        };

        let default = self.config.default_metric;
        match self.table.get_mut(&key) {
            None => {
                self.table.insert(key, incoming);
            }
            Some(pair) => {
                merge_direction(
                    &mut pair.forward,
                    incoming.forward,
                    default,
                    key.left(),
                    key.right(),
                    diags,
                );
                merge_direction(
                    &mut pair.reverse,
                    incoming.reverse,
                    default,
                    key.right(),
                    key.left(),
                    diags,
                );
            }
        }
    }

    /// Number of distinct links seen so far.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Close the table, flagging links observed in a single direction.
    pub fn finish(self, diags: &mut Diagnostics) -> IgpTable {
        for (key, pair) in &self.table {
            let missing = match (pair.forward, pair.reverse) {
                (Some(_), None) => Some((key.right(), key.left())),
                (None, Some(_)) => Some((key.left(), key.right())),
                _ => None,
            };
            if let Some((from, to)) = missing {
                diags.warn(
                    DiagnosticKind::AsymmetricLink,
                    format!("asymmetric IGP link {key}: direction {from} -> {to} never observed"),
                );
            }
        }
        self.table
    }
}

/// Tighten one directional slot with an incoming metric.
///
/// Disagreements between two real values are warned about; a value equal to
/// the configured default never counts as a conflict. The stored value is
/// always the minimum of the two.
fn merge_direction(
    slot: &mut Option<Metric>,
    incoming: Option<Metric>,
    default: Option<Metric>,
    from: &str,
    to: &str,
    diags: &mut Diagnostics,
) {
    let Some(new) = incoming else {
        return;
    };
    match *slot {
        None => *slot = Some(new),
        Some(old) => {
            if old != new && Some(old) != default && Some(new) != default {
                diags.warn(
                    DiagnosticKind::ConflictingObservation,
                    format!(
                        "IGP direction {from} -> {to} carries metrics {old} and {new}, keeping {}",
                        old.min(new)
                    ),
                );
            }
            *slot = Some(old.min(new));
        }
    }
}
