//! reharm - build chord progressions by stacking substitutions
//!
//! The whole session travels as a token: every command but `new`, `rules`
//! and `config` reads it from `--session` (or `REHARM_SESSION`), and every
//! command that edits the session prints the tree and the next token.
//!
//! Subcommands:
//! - `reharm new [--key C] [--scale major] [--chord C [--token maj7]]`
//! - `reharm add <root> [token]`
//! - `reharm select <id>`
//! - `reharm sub <id> <type>`
//! - `reharm collapse <id>`
//! - `reharm show`
//! - `reharm offer <id>`
//! - `reharm rules`
//! - `reharm config`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reharmconf::ReharmConfig;
use tracing_subscriber::EnvFilter;

mod codec;
mod commands;
mod render;

#[derive(Parser)]
#[command(name = "reharm")]
#[command(about = "Reharmonize chord progressions with V-I, ii-V and tritone substitutions")]
#[command(version)]
struct Cli {
    /// Config file used instead of ./reharm.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session token printed by the previous command
    #[arg(long, env = "REHARM_SESSION", global = true, hide_env_values = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new session
    New {
        /// Tonic of the key (e.g., C, Bb, F#)
        #[arg(short, long)]
        key: Option<String>,

        /// Scale quality: major or minor
        #[arg(short, long)]
        scale: Option<String>,

        /// Root of a first chord to add
        #[arg(short, long)]
        chord: Option<String>,

        /// Chord token for --chord (e.g., maj7, m7, 7)
        #[arg(short, long, requires = "chord")]
        token: Option<String>,
    },

    /// Append a chord to the progression
    Add {
        /// Chord root (e.g., D, Eb)
        root: String,

        /// Chord token (e.g., m7); defaults to `defaults.chord`
        token: Option<String>,
    },

    /// Select a node
    Select { id: String },

    /// Apply a substitution to a node
    Sub {
        id: String,

        /// Substitution type: V-I, ii-V or tritone
        #[arg(value_name = "TYPE")]
        kind: String,
    },

    /// Collapse a substitution group back to one chord
    Collapse { id: String },

    /// Print the progression tree
    Show,

    /// Describe a node and list the substitutions it qualifies for
    Offer { id: String },

    /// List the known substitutions
    Rules,

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = ReharmConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    // logs go to stderr so stdout stays a clean tree + token
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.telemetry.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(files = ?sources.files, env = ?sources.env_overrides, "config loaded");

    let session = cli.session.as_deref();
    let output = match cli.command {
        Commands::New {
            key,
            scale,
            chord,
            token,
        } => commands::new(
            &config,
            key.as_deref(),
            scale.as_deref(),
            chord.as_deref(),
            token.as_deref(),
        )?,
        Commands::Add { root, token } => {
            let mut session = commands::open(session, &config)?;
            commands::add(&mut session, &config, &root, token.as_deref())?
        }
        Commands::Select { id } => {
            let mut session = commands::open(session, &config)?;
            commands::select(&mut session, &id)?
        }
        Commands::Sub { id, kind } => {
            let mut session = commands::open(session, &config)?;
            commands::substitute(&mut session, &id, &kind)?
        }
        Commands::Collapse { id } => {
            let mut session = commands::open(session, &config)?;
            commands::collapse(&mut session, &id)?
        }
        Commands::Show => commands::show(&commands::open(session, &config)?),
        Commands::Offer { id } => commands::offer(&commands::open(session, &config)?, &id)?,
        Commands::Rules => commands::rules(),
        Commands::Config => commands::config(&config, &sources)?,
    };

    print!("{output}");
    Ok(())
}
