use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bdb", about = "BeaconDB storage inspector", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a chain configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Show the bucket table
    Buckets,
    /// Inspect encoded blocks
    #[command(subcommand)]
    Block(BlockCommand),
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Load a config file (or the mainnet preset) and print its fork schedule
    Check(ConfigCheckArgs),
}

#[derive(Args)]
pub struct ConfigCheckArgs {
    pub path: Option<PathBuf>,
    /// Use the minimal preset when no path is given
    #[arg(long)]
    pub minimal: bool,
}

#[derive(Subcommand)]
pub enum BlockCommand {
    /// Decode a hex-encoded signed block, choosing the fork from its slot
    Inspect(BlockInspectArgs),
}

#[derive(Args)]
pub struct BlockInspectArgs {
    /// Chain config used to resolve the fork (mainnet preset if omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// File holding the block bytes as hex
    pub file: PathBuf,
}
