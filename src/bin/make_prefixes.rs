//! Prefix-origin file generator for simulation inputs.
//!
//! Assigns fresh /24 prefixes to groups of border routers, either one group
//! per combination of a given size or by random sampling, and prints
//! `asbr<TAB>prefix` lines directly consumable by `check_topology`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use topocheck::line_parser::load_asbr_names;
use topocheck::prefix_gen::{generate_all_groups, generate_random_groups, PrefixGroup};

#[derive(Parser)]
#[command(name = "make_prefixes")]
#[command(about = "Generates ASBR prefix-origin files for topology simulations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// File holding one border-router name per line
    #[arg(long)]
    asbr_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// One prefix per combination of `group_size` border routers
    All {
        /// Number of routers originating each prefix
        group_size: usize,
    },

    /// Randomly sampled originating groups
    Random {
        /// Number of prefixes to generate
        num_prefixes: usize,

        /// Number of routers originating each prefix
        group_size: usize,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let asbrs = load_asbr_names(&cli.asbr_file)?;
    log::info!(
        "Loaded {} border routers from {}",
        asbrs.len(),
        cli.asbr_file.display()
    );

    let groups = match cli.command {
        Commands::All { group_size } => generate_all_groups(&asbrs, group_size)?,
        Commands::Random {
            num_prefixes,
            group_size,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            generate_random_groups(&asbrs, num_prefixes, group_size, &mut rng)?
        }
    };
    log::info!("Generated {} prefix groups", groups.len());

    print_groups(&groups);
    Ok(())
}

/// One `asbr<TAB>prefix` line per originating router, a blank line between
/// groups.
fn print_groups(groups: &[PrefixGroup]) {
    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            println!();
        }
        for asbr in &group.asbrs {
            println!("{asbr}\t{}", group.prefix);
        }
    }
}
