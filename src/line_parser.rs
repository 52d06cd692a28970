//! Fixed-grammar tokenizers and loaders for the topology input files.
//!
//! One record per line, whitespace separated. A trailing carriage return is
//! stripped before matching, so CRLF files behave like LF ones. Empty lines
//! are skipped and anything that fails its grammar is reported as a
//! malformed line and dropped, so a single bad record never aborts a run.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use color_eyre::eyre::{Context, Result};
use ipnet::Ipv4Net;
use log::warn;
use regex::Regex;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::topology::{IbgpMerger, IgpMerger, Metric, PrefixCollector};

/// Compiled line grammars, one per input kind.
///
/// All patterns are anchored at the start of the line; text trailing the
/// matched tokens is tolerated.
pub struct LinePatterns {
    /// Match: "src dst 10"
    pub igp: Regex,
    /// Match: "src dst UP" (the label itself is checked by the merge engine)
    pub ibgp: Regex,
    /// Match: "asbr 10.1.0.0/24"
    pub prefix: Regex,
    /// Match: a bare router name
    pub hostname: Regex,
}

impl LinePatterns {
    pub fn new() -> Self {
        Self {
            igp: Regex::new(r"^(\w+)\s+(\w+)\s+(\d+)").expect("Invalid igp regex"),
            ibgp: Regex::new(r"^(\w+)\s+(\w+)\s+(\w+)").expect("Invalid ibgp regex"),
            prefix: Regex::new(r"^(\w+)\s+(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}/\d{1,2})")
                .expect("Invalid prefix regex"),
            hostname: Regex::new(r"^\w+$").expect("Invalid hostname regex"),
        }
    }
}

/// Global patterns instance
pub static PATTERNS: LazyLock<LinePatterns> = LazyLock::new(LinePatterns::new);

fn malformed(path: &Path, line_number: usize, line: &str, diags: &mut Diagnostics) {
    diags.warn(
        DiagnosticKind::MalformedLine,
        format!("{}:{line_number}: ignored line [{line}]", path.display()),
    );
}

/// Feed every parsable line of an IGP file into the merger.
///
/// Returns the number of records handed to the merge engine. A metric too
/// large for [`Metric`] counts as a malformed line.
pub fn load_igp_file(
    path: &Path,
    merger: &mut IgpMerger,
    diags: &mut Diagnostics,
) -> Result<usize> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open IGP file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut records = 0;
    for (index, line_result) in reader.lines().enumerate() {
        let raw = line_result.with_context(|| format!("Failed to read {}", path.display()))?;
        let line = raw.strip_suffix('\r').unwrap_or(&raw);
        if line.is_empty() {
            continue;
        }
        let Some(caps) = PATTERNS.igp.captures(line) else {
            malformed(path, index + 1, line, diags);
            continue;
        };
        let metric = match caps[3].parse::<Metric>() {
            Ok(metric) => metric,
            Err(_) => {
                malformed(path, index + 1, line, diags);
                continue;
            }
        };
        merger.ingest(&caps[1], &caps[2], metric, diags);
        records += 1;
    }
    Ok(records)
}

/// Feed every parsable line of an iBGP file into the merger.
///
/// The third token is captured loosely here; the merge engine rejects
/// anything that is not `UP`, `OVER` or `DOWN` with its own diagnostic.
pub fn load_ibgp_file(
    path: &Path,
    merger: &mut IbgpMerger,
    diags: &mut Diagnostics,
) -> Result<usize> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open iBGP file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut records = 0;
    for (index, line_result) in reader.lines().enumerate() {
        let raw = line_result.with_context(|| format!("Failed to read {}", path.display()))?;
        let line = raw.strip_suffix('\r').unwrap_or(&raw);
        if line.is_empty() {
            continue;
        }
        let Some(caps) = PATTERNS.ibgp.captures(line) else {
            malformed(path, index + 1, line, diags);
            continue;
        };
        merger.ingest(&caps[1], &caps[2], &caps[3], diags);
        records += 1;
    }
    Ok(records)
}

/// Feed every parsable line of a prefix-origin file into the collector.
///
/// The prefix must both match the dotted-quad grammar and parse as a real
/// IPv4 network, so `300.0.0.0/24` or a `/33` length are malformed lines.
pub fn load_prefix_file(
    path: &Path,
    collector: &mut PrefixCollector,
    diags: &mut Diagnostics,
) -> Result<usize> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open prefix file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut records = 0;
    for (index, line_result) in reader.lines().enumerate() {
        let raw = line_result.with_context(|| format!("Failed to read {}", path.display()))?;
        let line = raw.strip_suffix('\r').unwrap_or(&raw);
        if line.is_empty() {
            continue;
        }
        let Some(caps) = PATTERNS.prefix.captures(line) else {
            malformed(path, index + 1, line, diags);
            continue;
        };
        let prefix: Ipv4Net = match caps[2].parse() {
            Ok(prefix) => prefix,
            Err(err) => {
                diags.warn(
                    DiagnosticKind::MalformedLine,
                    format!(
                        "{}:{}: invalid prefix [{}]: {err}",
                        path.display(),
                        index + 1,
                        &caps[2]
                    ),
                );
                continue;
            }
        };
        collector.ingest(&caps[1], prefix);
        records += 1;
    }
    Ok(records)
}

/// Load one router name per line, deduplicated and sorted.
///
/// Empty lines are skipped; a line that is not a bare name is logged and
/// ignored.
pub fn load_asbr_names(path: &Path) -> Result<BTreeSet<String>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open ASBR file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut names = BTreeSet::new();
    for (index, line_result) in reader.lines().enumerate() {
        let raw = line_result.with_context(|| format!("Failed to read {}", path.display()))?;
        let line = raw.strip_suffix('\r').unwrap_or(&raw);
        if line.is_empty() {
            continue;
        }
        if !PATTERNS.hostname.is_match(line) {
            warn!("{}:{}: not a router name, ignored", path.display(), index + 1);
            continue;
        }
        names.insert(line.to_string());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::topology::{IbgpConfig, IgpConfig};

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn igp_lines_feed_the_merger() {
        let file = temp_file("a b 10\nb a 20\n\nc d 5\n");
        let mut merger = IgpMerger::new(IgpConfig::default());
        let mut diags = Diagnostics::new();

        let records = load_igp_file(file.path(), &mut merger, &mut diags).unwrap();

        assert_eq!(records, 3);
        assert_eq!(merger.len(), 2);
        assert!(diags.is_empty());
    }

    #[test]
    fn malformed_igp_lines_are_reported_and_skipped() {
        let file = temp_file("a b 10\nnot a metric\na b\n  indented 1 2\n");
        let mut merger = IgpMerger::new(IgpConfig::default());
        let mut diags = Diagnostics::new();

        let records = load_igp_file(file.path(), &mut merger, &mut diags).unwrap();

        assert_eq!(records, 1);
        assert_eq!(diags.count_of(DiagnosticKind::MalformedLine), 3);
    }

    #[test]
    fn oversized_metrics_are_malformed() {
        let file = temp_file("a b 4294967296\n");
        let mut merger = IgpMerger::new(IgpConfig::default());
        let mut diags = Diagnostics::new();

        let records = load_igp_file(file.path(), &mut merger, &mut diags).unwrap();

        assert_eq!(records, 0);
        assert_eq!(diags.count_of(DiagnosticKind::MalformedLine), 1);
    }

    #[test]
    fn trailing_text_after_the_tokens_is_tolerated() {
        let file = temp_file("a b 10 core link\n");
        let mut merger = IgpMerger::new(IgpConfig::default());
        let mut diags = Diagnostics::new();

        let records = load_igp_file(file.path(), &mut merger, &mut diags).unwrap();

        assert_eq!(records, 1);
        assert!(diags.is_empty());
    }

    #[test]
    fn crlf_lines_parse_cleanly() {
        let file = temp_file("a b 10\r\n\r\nb a 20\r\n");
        let mut merger = IgpMerger::new(IgpConfig::default());
        let mut diags = Diagnostics::new();

        let records = load_igp_file(file.path(), &mut merger, &mut diags).unwrap();

        assert_eq!(records, 2);
        assert_eq!(merger.len(), 1);
        assert!(diags.is_empty());
    }

    #[test]
    fn ibgp_labels_are_checked_by_the_engine() {
        let file = temp_file("a b UP\nb a SIDEWAYS\n");
        let mut merger = IbgpMerger::new(IbgpConfig::default());
        let mut diags = Diagnostics::new();

        let records = load_ibgp_file(file.path(), &mut merger, &mut diags).unwrap();

        assert_eq!(records, 2);
        assert_eq!(merger.len(), 1);
        assert_eq!(diags.count_of(DiagnosticKind::InvalidLabel), 1);
        assert_eq!(diags.count_of(DiagnosticKind::MalformedLine), 0);
    }

    #[test]
    fn prefix_lines_are_validated_semantically() {
        let file = temp_file("asbr1 10.0.0.0/24\nasbr2 300.0.0.0/24\nasbr3 10.0.0.0/33\n");
        let mut collector = PrefixCollector::new();
        let mut diags = Diagnostics::new();

        let records = load_prefix_file(file.path(), &mut collector, &mut diags).unwrap();

        assert_eq!(records, 1);
        assert_eq!(collector.len(), 1);
        assert_eq!(diags.count_of(DiagnosticKind::MalformedLine), 2);
    }

    #[test]
    fn missing_files_are_fatal() {
        let mut merger = IgpMerger::new(IgpConfig::default());
        let mut diags = Diagnostics::new();

        let result = load_igp_file(Path::new("/nonexistent/topology.igp"), &mut merger, &mut diags);

        assert!(result.is_err());
    }

    #[test]
    fn asbr_names_are_deduplicated_and_sorted() {
        let file = temp_file("asbr2\nasbr1\n\nasbr1\nnot a name\n");

        let names = load_asbr_names(file.path()).unwrap();

        assert_eq!(
            names,
            BTreeSet::from(["asbr1".to_string(), "asbr2".to_string()])
        );
    }

    #[test]
    fn asbr_names_tolerate_crlf_endings() {
        let file = temp_file("asbr1\r\n\r\nasbr2\r\n");

        let names = load_asbr_names(file.path()).unwrap();

        assert_eq!(
            names,
            BTreeSet::from(["asbr1".to_string(), "asbr2".to_string()])
        );
    }
}
