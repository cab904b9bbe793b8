use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "trimerge",
    about = "Three-way reconciliation of hierarchical bibliographic records",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum Preset {
    /// The full bibliographic policy tables
    Bibliographic,
    /// Engine defaults only (no per-field overrides)
    Plain,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge three versions of a record and report conflicts
    Merge(MergeArgs),
    /// List the operation names accepted by --fallback and --list-op
    Ops,
}

#[derive(Args)]
pub struct MergeArgs {
    /// Common-ancestor version of the record
    pub root: PathBuf,
    /// Curated version
    pub head: PathBuf,
    /// Incoming version
    pub update: PathBuf,

    /// Policy preset
    #[arg(long, default_value = "bibliographic")]
    pub preset: Preset,

    /// Engine-wide fallback for divergent fields
    #[arg(long, default_value = "FALLBACK_KEEP_HEAD")]
    pub fallback: String,

    /// Engine-wide list unification operation
    #[arg(long, default_value = "KEEP_UPDATE_AND_HEAD_ENTITIES_HEAD_FIRST")]
    pub list_op: String,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Print only the conflict list
    #[arg(long)]
    pub conflicts_only: bool,
}
