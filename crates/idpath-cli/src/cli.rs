use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "idpath",
    about = "idpath: compact byte identifiers and hierarchical addresses",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with [generator] and [container] sections
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate unique random ids
    Generate(GenerateArgs),
    /// Parse and describe an id
    Id(IdArgs),
    /// Parse and describe an address
    Address(AddressArgs),
    /// Check whether one address contains another as a run of ids
    Contains(ContainsArgs),
    /// Check whether one address is a byte prefix of another
    Prefix(PrefixArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Id size in bytes (overrides the config)
    #[arg(short, long)]
    pub size: Option<u8>,
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,
    /// Print the braced, hyphenated form
    #[arg(long)]
    pub fancy: bool,
}

#[derive(Args)]
pub struct IdArgs {
    pub text: String,
}

#[derive(Args)]
pub struct AddressArgs {
    pub text: String,
    /// Treat the input as the hex-encoded raw buffer
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args)]
pub struct ContainsArgs {
    pub haystack: String,
    pub needle: String,
}

#[derive(Args)]
pub struct PrefixArgs {
    pub partial: String,
    pub full: String,
}
