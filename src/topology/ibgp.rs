//! Label-algebra merge of directed iBGP session observations.

use crate::diagnostics::{DiagnosticKind, Diagnostics};

use super::types::{select_ibgp, IbgpLabel, IbgpTable, LabelPair, LinkKey};

/// Tunables for [`IbgpMerger`], mirroring the CLI surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct IbgpConfig {
    /// Treat every observation as evidence for both directions, filling the
    /// opposite one with the symmetric label.
    pub reverse_ibgp: bool,
}

/// Folds directed `src dst UP|OVER|DOWN` observations into a canonical
/// session table.
///
/// The first observation of a session is stored verbatim; every later one
/// is resolved against the stored pair with [`select_ibgp`], so a `Down`
/// label survives only while its session is observed exactly once.
/// Disagreements between set labels are warned about before resolving to
/// the label least constraining route spread.
#[derive(Debug, Default)]
pub struct IbgpMerger {
    config: IbgpConfig,
    table: IbgpTable,
}

impl IbgpMerger {
    pub fn new(config: IbgpConfig) -> Self {
        IbgpMerger {
            config,
            table: IbgpTable::new(),
        }
    }

    /// Merge one directed observation into the table.
    ///
    /// The token is validated before the endpoints, so a bad label on a
    /// self-looping line reports [`DiagnosticKind::InvalidLabel`] rather than
    /// [`DiagnosticKind::SelfLoop`]. Either failure drops the record.
    pub fn ingest(&mut self, src: &str, dst: &str, token: &str, diags: &mut Diagnostics) {
        let label = match IbgpLabel::from_token(token) {
            Ok(label) => label,
            Err(err) => {
                diags.warn(DiagnosticKind::InvalidLabel, format!("ignoring iBGP record: {err}"));
                return;
            }
        };
        let (key, swapped) = match LinkKey::canonical(src, dst) {
            Ok(canonical) => canonical,
            Err(err) => {
                diags.warn(DiagnosticKind::SelfLoop, format!("ignoring iBGP {err}"));
                return;
            }
        };

        let reverse_candidate = if self.config.reverse_ibgp {
            label.symmetric()
        } else {
            IbgpLabel::Unset
        };
        let incoming = if swapped {
            LabelPair {
                forward: reverse_candidate,
                reverse: label,
            }
        } else {
            LabelPair {
                forward: label,
                reverse: reverse_candidate,
            }
        };

        match self.table.get_mut(&key) {
            None => {
                self.table.insert(key, incoming);
            }
            Some(pair) => {
                merge_label(
                    &mut pair.forward,
                    incoming.forward,
                    key.left(),
                    key.right(),
                    diags,
                );
                merge_label(
                    &mut pair.reverse,
                    incoming.reverse,
                    key.right(),
                    key.left(),
                    diags,
                );
            }
        }
    }

    /// Number of distinct sessions seen so far.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Close the table, flagging unresolved directions and sessions whose
    /// ends both claim to be a reflection client of the other.
    pub fn finish(self, diags: &mut Diagnostics) -> IbgpTable {
        for (key, pair) in &self.table {
            if !pair.forward.is_set() {
                diags.warn(
                    DiagnosticKind::AsymmetricSession,
                    format!(
                        "asymmetric iBGP session {key}: direction {} -> {} never observed",
                        key.left(),
                        key.right()
                    ),
                );
            }
            if !pair.reverse.is_set() {
                diags.warn(
                    DiagnosticKind::AsymmetricSession,
                    format!(
                        "asymmetric iBGP session {key}: direction {} -> {} never observed",
                        key.right(),
                        key.left()
                    ),
                );
            }
            if pair.forward == IbgpLabel::Up && pair.reverse == IbgpLabel::Up {
                diags.warn(
                    DiagnosticKind::StructuralAnomaly,
                    format!("iBGP session {key}: both ends claim to be a reflection client of the other"),
                );
            }
        }
        self.table
    }
}

/// Resolve one directional slot against an incoming label.
///
/// The resolution runs on every remerge, agreeing operands included, so a
/// stored or duplicated `Down` normalizes to `Over`; an `Unset` operand
/// never displaces a set one. Only disagreements between two set labels
/// are warned about.
fn merge_label(
    slot: &mut IbgpLabel,
    incoming: IbgpLabel,
    from: &str,
    to: &str,
    diags: &mut Diagnostics,
) {
    let resolved = select_ibgp(*slot, incoming);
    if slot.is_set() && incoming.is_set() && *slot != incoming {
        diags.warn(
            DiagnosticKind::ConflictingObservation,
            format!(
                "iBGP direction {from} -> {to} labelled both {} and {incoming}, keeping {resolved}",
                *slot
            ),
        );
    }
    *slot = resolved;
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn merge(observations: &[(&str, &str, &str)], config: IbgpConfig) -> (IbgpTable, Diagnostics) {
        let mut diags = Diagnostics::new();
        let mut merger = IbgpMerger::new(config);
        for (src, dst, token) in observations {
            merger.ingest(src, dst, token, &mut diags);
        }
        (merger.finish(&mut diags), diags)
    }

    fn session(table: &IbgpTable, a: &str, b: &str) -> LabelPair {
        let (key, _) = LinkKey::canonical(a, b).unwrap();
        table[&key]
    }

    #[test]
    fn reverse_inference_fills_the_symmetric_label() {
        let config = IbgpConfig { reverse_ibgp: true };
        let (table, diags) = merge(&[("b", "a", "UP")], config);

        assert_eq!(
            session(&table, "a", "b"),
            LabelPair {
                forward: IbgpLabel::Down,
                reverse: IbgpLabel::Up,
            }
        );
        assert_eq!(diags.count_of(DiagnosticKind::AsymmetricSession), 0);
    }

    #[test]
    fn explicit_reverse_observations_fill_both_slots() {
        let (table, diags) = merge(&[("a", "b", "UP"), ("b", "a", "OVER")], IbgpConfig::default());

        assert_eq!(
            session(&table, "a", "b"),
            LabelPair {
                forward: IbgpLabel::Up,
                reverse: IbgpLabel::Over,
            }
        );
        assert_eq!(diags.count_of(DiagnosticKind::ConflictingObservation), 0);
        assert_eq!(diags.count_of(DiagnosticKind::StructuralAnomaly), 0);
    }

    #[test]
    fn a_single_down_observation_is_kept_verbatim() {
        let (table, _) = merge(&[("a", "b", "DOWN")], IbgpConfig::default());

        assert_eq!(session(&table, "a", "b").forward, IbgpLabel::Down);
    }

    #[test]
    fn remerging_normalizes_a_stored_down_label() {
        let (table, diags) = merge(&[("a", "b", "DOWN"), ("b", "a", "UP")], IbgpConfig::default());

        assert_eq!(
            session(&table, "a", "b"),
            LabelPair {
                forward: IbgpLabel::Over,
                reverse: IbgpLabel::Up,
            }
        );
        assert_eq!(diags.count_of(DiagnosticKind::ConflictingObservation), 0);
    }

    #[test]
    fn agreeing_down_duplicates_resolve_to_over() {
        let (table, diags) = merge(&[("a", "b", "DOWN"), ("a", "b", "DOWN")], IbgpConfig::default());

        assert_eq!(session(&table, "a", "b").forward, IbgpLabel::Over);
        assert_eq!(diags.count_of(DiagnosticKind::ConflictingObservation), 0);
    }

    #[test]
    fn agreeing_up_duplicates_merge_silently() {
        let (table, diags) = merge(&[("a", "b", "UP"), ("a", "b", "UP")], IbgpConfig::default());

        assert_eq!(session(&table, "a", "b").forward, IbgpLabel::Up);
        assert_eq!(diags.count_of(DiagnosticKind::ConflictingObservation), 0);
    }

    #[test]
    fn conflicting_labels_resolve_to_the_least_constraining() {
        let (table, diags) = merge(&[("a", "b", "OVER"), ("a", "b", "UP")], IbgpConfig::default());

        assert_eq!(session(&table, "a", "b").forward, IbgpLabel::Up);
        assert_eq!(diags.count_of(DiagnosticKind::ConflictingObservation), 1);
    }

    #[test]
    fn merge_is_order_independent() {
        let observations = [("a", "b", "DOWN"), ("b", "a", "UP"), ("a", "b", "OVER")];

        let tables: Vec<IbgpTable> = observations
            .iter()
            .permutations(observations.len())
            .map(|order| {
                let mut diags = Diagnostics::new();
                let mut merger = IbgpMerger::new(IbgpConfig::default());
                for (src, dst, token) in order {
                    merger.ingest(src, dst, token, &mut diags);
                }
                merger.finish(&mut diags)
            })
            .collect();

        for table in &tables[1..] {
            assert_eq!(table, &tables[0]);
        }
    }

    #[test]
    fn invalid_tokens_are_skipped() {
        let (table, diags) = merge(&[("a", "b", "SIDEWAYS")], IbgpConfig::default());

        assert!(table.is_empty());
        assert_eq!(diags.count_of(DiagnosticKind::InvalidLabel), 1);
    }

    #[test]
    fn the_label_is_validated_before_the_endpoints() {
        let (table, diags) = merge(&[("a", "a", "WRONG")], IbgpConfig::default());

        assert!(table.is_empty());
        assert_eq!(diags.count_of(DiagnosticKind::InvalidLabel), 1);
        assert_eq!(diags.count_of(DiagnosticKind::SelfLoop), 0);
    }

    #[test]
    fn self_loops_never_create_entries() {
        let (table, diags) = merge(&[("a", "a", "UP")], IbgpConfig::default());

        assert!(table.is_empty());
        assert_eq!(diags.count_of(DiagnosticKind::SelfLoop), 1);
    }

    #[test]
    fn mutual_clients_are_a_structural_anomaly() {
        let (table, diags) = merge(&[("a", "b", "UP"), ("b", "a", "UP")], IbgpConfig::default());

        assert_eq!(
            session(&table, "a", "b"),
            LabelPair {
                forward: IbgpLabel::Up,
                reverse: IbgpLabel::Up,
            }
        );
        assert_eq!(diags.count_of(DiagnosticKind::StructuralAnomaly), 1);
        assert_eq!(diags.count_of(DiagnosticKind::AsymmetricSession), 0);
    }

    #[test]
    fn mutual_clients_with_reverse_inference_also_conflict() {
        let config = IbgpConfig { reverse_ibgp: true };
        let (table, diags) = merge(&[("a", "b", "UP"), ("b", "a", "UP")], config);

        assert_eq!(
            session(&table, "a", "b"),
            LabelPair {
                forward: IbgpLabel::Up,
                reverse: IbgpLabel::Up,
            }
        );
        assert_eq!(diags.count_of(DiagnosticKind::ConflictingObservation), 2);
        assert_eq!(diags.count_of(DiagnosticKind::StructuralAnomaly), 1);
    }

    #[test]
    fn one_sided_sessions_are_flagged_at_finish() {
        let (_, diags) = merge(&[("a", "b", "OVER")], IbgpConfig::default());

        assert_eq!(diags.count_of(DiagnosticKind::AsymmetricSession), 1);
        let entry = diags
            .entries()
            .iter()
            .find(|d| d.kind == DiagnosticKind::AsymmetricSession)
            .unwrap();
        assert!(entry.message.contains("b -> a"));
    }
}
