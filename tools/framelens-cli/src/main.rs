//! FrameLens CLI: offline driver for the classification core.
//!
//! Usage:
//!   framelens replay <TRACE>     Feed a JSONL trace through a frame engine
//!   framelens scan <DUMP>        Search a raw memory dump for camera matrices
//!   framelens synth <OUT>        Write a synthetic dump with a known camera
//!   framelens config             Show (or save) the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use framelens_engine::EngineConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "framelens",
    about = "Render-pipeline heuristics for frame generation and upscaling",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $FRAMELENS_CONFIG or the XDG location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded trace and print the final state
    Replay {
        /// Path to the JSONL trace
        trace: PathBuf,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan a raw little-endian memory dump for a camera pair
    Scan {
        /// Path to the dump
        dump: PathBuf,

        /// Override the scan strides in bytes, coarsest first
        #[arg(long, value_delimiter = ',')]
        stride: Vec<usize>,

        /// Byte range START:END to treat as unreadable (repeatable)
        #[arg(long, value_parser = commands::scan::parse_range)]
        unreadable: Vec<(usize, usize)>,
    },

    /// Write a synthetic memory dump containing one camera pair
    Synth {
        /// Output file
        output: PathBuf,

        /// Dump size in bytes
        #[arg(long, default_value = "65536")]
        size: usize,

        /// Byte offset of the view matrix
        #[arg(long, default_value = "4096")]
        offset: usize,

        /// Store the matrices transposed
        #[arg(long)]
        column_major: bool,

        /// Sub-pixel jitter in NDC units, written into the projection
        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        jitter: Option<Vec<f32>>,
    },

    /// Show the effective configuration
    Config {
        /// Write it back to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => EngineConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    framelens_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Replay { trace, json } => commands::replay::run(&config, trace, json),
        Commands::Scan {
            dump,
            stride,
            unreadable,
        } => commands::scan::run(&config, dump, stride, unreadable),
        Commands::Synth {
            output,
            size,
            offset,
            column_major,
            jitter,
        } => {
            let jitter = jitter.map(|j| (j[0], j[1]));
            commands::synth::run(output, size, offset, column_major, jitter)
        }
        Commands::Config { save } => commands::config::run(&config, cli.config, save),
    }
}
