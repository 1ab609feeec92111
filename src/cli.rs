use clap::{Parser, Subcommand};
use ledgerd::ledger::Status;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ledgerd")]
#[command(about = "Ledger storage node and maintenance commands", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $LEDGERD_CONFIG or config/ledgerd.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ledger server; holds the storage root until stopped
    Start(StartArgs),
    /// Unjoin the node from a channel. The node must be offline.
    Unjoin(ChannelArgs),
    /// Set the status of a ledger (recovery tooling). The node must be offline.
    UpdateStatus(UpdateStatusArgs),
    /// List active ledgers. The node must be offline.
    List,
}

#[derive(clap::Args, Debug)]
pub struct StartArgs {
    /// Address to bind the HTTP server to (overrides server.bind_addr)
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct ChannelArgs {
    /// Channel to act on
    #[arg(short = 'c', long = "channelID")]
    pub channel_id: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateStatusArgs {
    #[command(flatten)]
    pub channel: ChannelArgs,

    /// New status: ACTIVE, UNDER_CONSTRUCTION or UNDER_DELETION
    #[arg(long)]
    pub status: Status,
}
