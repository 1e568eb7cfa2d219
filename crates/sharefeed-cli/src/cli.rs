use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sharefeed_types::StorageMode;

#[derive(Parser)]
#[command(
    name = "sharefeed",
    about = "ShareFeed: capture pages and links into shared feeds",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the local store; overrides the config file
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

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
    /// Share a page, link, selection, or image
    Share(ShareArgs),
    /// List shares, newest first
    List(ListArgs),
    /// Show one share
    Show(ShowArgs),
    /// Delete a share
    Delete(DeleteArgs),
    /// Show the storage mode and whether the remote conductor is reachable
    Status,
    /// Show or change the storage mode
    Mode(ModeArgs),
    /// Forget the cached remote availability
    Reset,
    /// Show or change the remote connection settings
    Settings(SettingsArgs),
    /// Run the local HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct ShareArgs {
    /// URL of the page being shared
    pub url: String,
    #[arg(short, long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Share this selected text from the page
    #[arg(long, conflicts_with_all = ["link", "image"])]
    pub selection: Option<String>,
    /// Share a link found on the page instead of the page itself
    #[arg(long, conflicts_with = "image")]
    pub link: Option<String>,
    /// Share an image found on the page
    #[arg(long)]
    pub image: Option<String>,
    #[arg(long)]
    pub favicon: Option<String>,
    #[arg(short, long)]
    pub feed: Option<String>,
    /// Repeatable
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(short, long)]
    pub feed: Option<String>,
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,
    /// Only shares older than this timestamp (milliseconds)
    #[arg(long)]
    pub after: Option<u64>,
    /// Keep running and print the feed whenever it changes
    #[arg(short, long)]
    pub watch: bool,
    /// Poll interval for --watch, in seconds
    #[arg(long, default_value_t = 5)]
    pub interval: u64,
    /// Read the built-in sample feed instead of a real backend
    #[arg(long)]
    pub demo: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub id: String,
}

#[derive(Args)]
pub struct ModeArgs {
    /// local, remote, or auto; omit to print the current mode
    pub mode: Option<StorageMode>,
}

#[derive(Args)]
pub struct SettingsArgs {
    #[arg(long)]
    pub admin_port: Option<u16>,
    #[arg(long)]
    pub app_port: Option<u16>,
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,
    #[arg(long)]
    pub disable: bool,
}

impl SettingsArgs {
    /// The enable flag to store, if either switch was given.
    pub fn enabled(&self) -> Option<bool> {
        match (self.enable, self.disable) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Args)]
pub struct ServeArgs {
    /// Overrides the configured bind address
    #[arg(long)]
    pub bind: Option<std::net::SocketAddr>,
}
