use crate::commands::Commands;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Terminal client for the parley chat server")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Server URL (auto-discovered from server.json, or specify manually)
    #[arg(long, global = true)]
    pub(crate) server: Option<String>,

    /// Directory holding state.json (defaults to the user data directory)
    #[arg(long, global = true)]
    pub(crate) state_dir: Option<PathBuf>,
}
