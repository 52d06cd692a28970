//! `check_topology`: validates and repairs BGP/IGP topology description files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use color_eyre::eyre::Result;
use env_logger::Env;
use log::info;

use topocheck::diagnostics::Diagnostics;
use topocheck::line_parser::{load_ibgp_file, load_igp_file, load_prefix_file};
use topocheck::report::{write_fixed_files, write_json_report, TopologyReport};
use topocheck::topology::{
    check_consistency, repair, IbgpConfig, IbgpMerger, IgpConfig, IgpMerger, Metric,
    PrefixCollector,
};

/// Validates and repairs a BGP/IGP control-plane topology description
#[derive(Parser, Debug)]
#[command(name = "check_topology")]
#[command(author, version, about, long_about = None)]
#[command(allow_negative_numbers = true)]
struct Args {
    /// IGP link-metric file, one "src dst metric" record per line
    filename_igp: PathBuf,

    /// iBGP session file, one "src dst UP|OVER|DOWN" record per line
    filename_ibgp: PathBuf,

    /// Prefix-origin file, one "asbr a.b.c.d/len" record per line
    filename_prefixes: PathBuf,

    /// Infer the reverse direction of IGP observations (any non-zero value)
    #[arg(default_value_t = 0)]
    reverse_igp: i64,

    /// Infer the reverse direction of iBGP observations (any non-zero value)
    #[arg(default_value_t = 0)]
    reverse_ibgp: i64,

    /// Metric merged into inferred reverse IGP directions
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    default_metric: Option<Metric>,

    /// Write a JSON summary of the run to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    // Exit 1 on a bad invocation, 2 on any pipeline failure; clap's own
    // default of 2 for usage errors would collide with the I/O code.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("check_topology: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    let igp_config = IgpConfig {
        reverse_igp: args.reverse_igp != 0,
        default_metric: args.default_metric,
    };
    let ibgp_config = IbgpConfig {
        reverse_ibgp: args.reverse_ibgp != 0,
    };

    let mut diags = Diagnostics::new();

    info!("Reading IGP topology from {}", args.filename_igp.display());
    let mut igp_merger = IgpMerger::new(igp_config);
    let igp_records = load_igp_file(&args.filename_igp, &mut igp_merger, &mut diags)?;
    info!("{igp_records} IGP records over {} links", igp_merger.len());

    info!("Reading iBGP sessions from {}", args.filename_ibgp.display());
    let mut ibgp_merger = IbgpMerger::new(ibgp_config);
    let ibgp_records = load_ibgp_file(&args.filename_ibgp, &mut ibgp_merger, &mut diags)?;
    info!("{ibgp_records} iBGP records over {} sessions", ibgp_merger.len());

    info!("Reading prefix origins from {}", args.filename_prefixes.display());
    let mut collector = PrefixCollector::new();
    let prefix_records = load_prefix_file(&args.filename_prefixes, &mut collector, &mut diags)?;
    info!("{prefix_records} prefix records over {} border routers", collector.len());
    diags.flush_to_log();

    let igp = igp_merger.finish(&mut diags);
    let ibgp = ibgp_merger.finish(&mut diags);
    let prefixes = collector.finish();
    diags.flush_to_log();

    let result = check_consistency(&igp, &ibgp, &prefixes);
    result.emit_diagnostics(&mut diags);
    diags.flush_to_log();
    if result.consistent() {
        info!("Topology is consistent");
    } else {
        info!("Topology is inconsistent; repaired files drop the offending records");
    }

    let repaired = repair(&igp, &ibgp, &prefixes, &result, &mut diags);
    diags.flush_to_log();

    write_fixed_files(
        &repaired,
        &args.filename_igp,
        &args.filename_ibgp,
        &args.filename_prefixes,
    )?;

    if let Some(report_path) = &args.report {
        let report = TopologyReport::new(&igp, &ibgp, &prefixes, &result, &diags);
        write_json_report(&report, report_path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["check_topology", "topo.igp", "topo.ibgp", "topo.prefixes"]);

        assert_eq!(args.filename_igp, PathBuf::from("topo.igp"));
        assert_eq!(args.filename_ibgp, PathBuf::from("topo.ibgp"));
        assert_eq!(args.filename_prefixes, PathBuf::from("topo.prefixes"));
        assert_eq!(args.reverse_igp, 0);
        assert_eq!(args.reverse_ibgp, 0);
        assert_eq!(args.default_metric, None);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_reverse_flags_accept_any_integer() {
        let args = Args::parse_from([
            "check_topology",
            "topo.igp",
            "topo.ibgp",
            "topo.prefixes",
            "1",
            "-7",
        ]);

        assert_ne!(args.reverse_igp, 0);
        assert_ne!(args.reverse_ibgp, 0);
    }

    #[test]
    fn test_missing_positionals_are_an_invocation_error() {
        let err = Args::try_parse_from(["check_topology", "topo.igp"]).unwrap_err();
        assert!(!matches!(
            err.kind(),
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
        ));
    }

    #[test]
    fn test_default_metric_must_be_at_least_one() {
        assert!(Args::try_parse_from([
            "check_topology",
            "topo.igp",
            "topo.ibgp",
            "topo.prefixes",
            "--default-metric",
            "0",
        ])
        .is_err());

        let args = Args::parse_from([
            "check_topology",
            "topo.igp",
            "topo.ibgp",
            "topo.prefixes",
            "--default-metric",
            "10",
        ]);
        assert_eq!(args.default_metric, Some(10));
    }
}
