//! Writes repaired topology files and the optional JSON run report.

use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::topology::{ConsistencyResult, IbgpTable, IgpTable, PrefixTable, RepairedTopology};

/// Append the repair suffix to the full file name, so `topo.igp` becomes
/// `topo.igp.fixed`.
pub fn fixed_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".fixed");
    PathBuf::from(name)
}

fn write_records<T: fmt::Display>(path: &Path, records: &[T]) -> Result<()> {
    info!("Writing {}", path.display());
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        writeln!(writer, "{record}")
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write the three `.fixed` files next to their inputs, one tab-separated
/// record per line.
pub fn write_fixed_files(
    repaired: &RepairedTopology,
    igp_path: &Path,
    ibgp_path: &Path,
    prefixes_path: &Path,
) -> Result<()> {
    write_records(&fixed_path(igp_path), &repaired.igp)?;
    write_records(&fixed_path(ibgp_path), &repaired.ibgp)?;
    write_records(&fixed_path(prefixes_path), &repaired.prefixes)?;
    Ok(())
}

/// Summary of one validation run, serialized by `--report`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TopologyReport {
    pub igp_links: usize,
    pub ibgp_sessions: usize,
    pub asbrs: usize,
    pub prefixes: usize,
    pub consistent: bool,
    pub ibgp_not_igp: Vec<String>,
    pub igp_not_ibgp: Vec<String>,
    pub asbr_not_bgp: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TopologyReport {
    pub fn new(
        igp: &IgpTable,
        ibgp: &IbgpTable,
        prefixes: &PrefixTable,
        violations: &ConsistencyResult,
        diags: &Diagnostics,
    ) -> Self {
        TopologyReport {
            igp_links: igp.len(),
            ibgp_sessions: ibgp.len(),
            asbrs: prefixes.len(),
            prefixes: prefixes.values().map(|set| set.len()).sum(),
            consistent: violations.consistent(),
            ibgp_not_igp: violations.ibgp_not_igp.iter().cloned().collect(),
            igp_not_ibgp: violations.igp_not_ibgp.iter().cloned().collect(),
            asbr_not_bgp: violations.asbr_not_bgp.iter().cloned().collect(),
            diagnostics: diags.entries().to_vec(),
        }
    }
}

/// Serialize the run report as pretty-printed JSON.
pub fn write_json_report(report: &TopologyReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    info!("JSON report written to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::topology::{IgpRecord, PrefixRecord};

    #[test]
    fn the_suffix_is_appended_to_the_full_name() {
        assert_eq!(fixed_path(Path::new("a/b.txt")), PathBuf::from("a/b.txt.fixed"));
        assert_eq!(fixed_path(Path::new("topo")), PathBuf::from("topo.fixed"));
    }

    #[test]
    fn fixed_files_hold_one_record_per_line() {
        let dir = TempDir::new().unwrap();
        let igp_path = dir.path().join("topo.igp");
        let ibgp_path = dir.path().join("topo.ibgp");
        let prefixes_path = dir.path().join("topo.prefixes");

        let repaired = RepairedTopology {
            igp: vec![
                IgpRecord {
                    src: "a".to_string(),
                    dst: "b".to_string(),
                    metric: 5,
                },
                IgpRecord {
                    src: "b".to_string(),
                    dst: "a".to_string(),
                    metric: 7,
                },
            ],
            ibgp: Vec::new(),
            prefixes: vec![PrefixRecord {
                asbr: "a".to_string(),
                prefix: "10.0.0.0/24".parse().unwrap(),
            }],
        };

        write_fixed_files(&repaired, &igp_path, &ibgp_path, &prefixes_path).unwrap();

        let igp = fs::read_to_string(fixed_path(&igp_path)).unwrap();
        assert_eq!(igp, "a\tb\t5\nb\ta\t7\n");
        let ibgp = fs::read_to_string(fixed_path(&ibgp_path)).unwrap();
        assert_eq!(ibgp, "");
        let prefixes = fs::read_to_string(fixed_path(&prefixes_path)).unwrap();
        assert_eq!(prefixes, "a\t10.0.0.0/24\n");
    }

    #[test]
    fn reports_round_trip_through_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");

        let report = TopologyReport {
            igp_links: 2,
            ibgp_sessions: 1,
            asbrs: 1,
            prefixes: 3,
            consistent: false,
            ibgp_not_igp: vec!["d".to_string()],
            igp_not_ibgp: Vec::new(),
            asbr_not_bgp: Vec::new(),
            diagnostics: Vec::new(),
        };

        write_json_report(&report, &path).unwrap();

        let parsed: TopologyReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.igp_links, 2);
        assert_eq!(parsed.prefixes, 3);
        assert!(!parsed.consistent);
        assert_eq!(parsed.ibgp_not_igp, vec!["d".to_string()]);
    }
}
