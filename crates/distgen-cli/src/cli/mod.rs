//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

use distgen_core::domain::MissingVariablePolicy;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "distgen",
    bin_name = "distgen",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Generate a network-specific MerkleDistributor contract from a template",
    long_about = "Renders the MerkleDistributor contract template for a target network \
                  and writes the resulting Solidity source.",
    after_help = "EXAMPLES:\n\
        \x20 distgen\n\
        \x20 distgen --network rinkeby\n\
        \x20 distgen -t contracts/MerkleDistributor.template -o build/MerkleDistributor.sol\n\
        \x20 distgen --network testnet -D token=0x7Fc66500c84A76Ad7e9c93437bFc5Ac33E2DDaE9\n\
        \x20 distgen --network goerli --dry-run",
)]
pub struct Cli {
    /// Flags available on every invocation.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// What to render and where to write it.
    #[command(flatten)]
    pub generate: GenerateArgs,
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for a generation run.
///
/// Path and network flags are optional here so that configuration files and
/// environment variables can supply them; see [`crate::config::Defaults`].
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Template to render.
    #[arg(
        short = 't',
        long = "template",
        value_name = "PATH",
        help = "Template path [default: ./contracts/MerkleDistributor.template]"
    )]
    pub template: Option<PathBuf>,

    /// Destination of the rendered contract.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output path [default: ./contracts/MerkleDistributor.sol]"
    )]
    pub output: Option<PathBuf>,

    /// Value bound to `network` in the template.
    #[arg(
        long = "network",
        value_name = "NAME",
        help = "Target network [default: mainnet]"
    )]
    pub network: Option<String>,

    /// Extra template variables.
    #[arg(
        short = 'D',
        long = "define",
        value_name = "KEY=VALUE",
        action = clap::ArgAction::Append,
        help = "Bind an extra template variable (repeatable)"
    )]
    pub defines: Vec<String>,

    /// What to do with placeholders that name unbound variables.
    #[arg(
        long = "on-missing",
        value_name = "POLICY",
        value_enum,
        help = "Policy for unbound variables [default: empty]"
    )]
    pub on_missing: Option<MissingMode>,

    /// Print the rendered contract instead of writing it.
    #[arg(long = "dry-run", help = "Print the rendered output without writing it")]
    pub dry_run: bool,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// CLI spelling of [`MissingVariablePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum MissingMode {
    /// Render unbound variables as empty text and warn.
    Empty,
    /// Keep the placeholder text as written.
    Preserve,
    /// Fail on the first unbound variable.
    Strict,
}

impl From<MissingMode> for MissingVariablePolicy {
    fn from(mode: MissingMode) -> Self {
        match mode {
            MissingMode::Empty => Self::Empty,
            MissingMode::Preserve => Self::Preserve,
            MissingMode::Strict => Self::Strict,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
