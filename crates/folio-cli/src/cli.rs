use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use folio_store::Format;

#[derive(Parser)]
#[command(
    name = "folio",
    about = "folio — inspect and edit a file-backed document store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML store configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store root directory (overrides the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Record format: binary or json (overrides the config file)
    #[arg(long, global = true)]
    pub format: Option<Format>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the store root if it does not exist
    Init(InitArgs),
    /// Write a JSON value to a document
    Put(PutArgs),
    /// Print a document's record
    Get(GetArgs),
    /// List the documents of a collection
    Ls(LsArgs),
    /// Delete a document or collection and everything beneath it
    Rm(RmArgs),
}

#[derive(Args)]
pub struct InitArgs {}

#[derive(Args)]
pub struct PutArgs {
    /// Document path, e.g. fish/redfish
    pub path: String,
    /// JSON text of the record
    pub value: String,
}

#[derive(Args)]
pub struct GetArgs {
    /// Document path; empty for the root document
    #[arg(default_value = "")]
    pub path: String,
}

#[derive(Args)]
pub struct LsArgs {
    /// Collection path, e.g. fish or fish/redfish/fins
    pub path: String,
    #[arg(long, default_value_t = 0)]
    pub start: usize,
    /// Exclusive upper bound; 0 means no bound
    #[arg(long, default_value_t = 0)]
    pub end: usize,
}

#[derive(Args)]
pub struct RmArgs {
    pub path: String,
}
