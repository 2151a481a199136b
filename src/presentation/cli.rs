use crate::domain::models::ExecutionMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gopro-connect")]
#[command(version, about = "Bring GoPro cameras onto dedicated Wi-Fi interfaces")]
pub struct Cli {
    /// Settings file (default: <config dir>/gopro-connect/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Activate, associate and verify the selected cameras
    Connect(ConnectArgs),

    /// Probe each camera's HTTP API once, without changing anything
    Status {
        /// Device ids (default: all configured devices)
        ids: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a settings template
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Device ids, in the order to connect them
    pub ids: Vec<String>,

    /// Connect every configured device
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,

    /// One camera after another
    #[arg(long, conflicts_with = "concurrent")]
    pub sequential: bool,

    /// All cameras at once (each needs its own interface)
    #[arg(long)]
    pub concurrent: bool,

    /// Give up on the whole run after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl ConnectArgs {
    /// Flag wins over the configured mode
    pub fn mode(&self, configured: ExecutionMode) -> ExecutionMode {
        if self.concurrent {
            ExecutionMode::Concurrent
        } else if self.sequential {
            ExecutionMode::Sequential
        } else {
            configured
        }
    }
}
