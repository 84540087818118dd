use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "post-series", version, about = "Manage ordered post series")]
pub struct Cli {
    #[arg(long, global = true, help = "Config file (defaults to ./post_series.toml if present)")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "SQLite database file")]
    pub db: Option<PathBuf>,
    #[arg(long, global = true, help = "Log level: trace|debug|info|warn|error")]
    pub log_level: Option<String>,
    #[arg(long, global = true, help = "Directory for rolling log files")]
    pub log_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a content item.
    AddItem {
        title: String,
        #[arg(long, default_value = "draft")]
        status: String,
    },
    /// List items, optionally by status, one page at a time.
    ListItems {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Change an item's title.
    Rename { item_id: i64, title: String },
    /// Publish an item.
    Publish { item_id: i64 },
    /// Move an item to trash; its series link and part number are kept.
    Trash { item_id: i64 },
    /// Show the capabilities granted by the configuration.
    Capabilities,
    /// Create a series from a display name.
    CreateSeries { name: String },
    /// List every series by name.
    ListSeries,
    /// Put an item in a series, or clear it with no `--series`.
    Assign {
        item_id: i64,
        #[arg(long)]
        series: Option<i64>,
    },
    /// Set an item's part number, or remove it with no value.
    SetPart { item_id: i64, part: Option<i64> },
    /// Show the ordered parts of a series.
    Parts {
        series_id: i64,
        #[arg(long, help = "Item being edited; listed even if not yet a member")]
        current: Option<i64>,
        #[arg(long, conflicts_with = "current", help = "Published items only")]
        published: bool,
    },
    /// Number items 1..N in the given order.
    Reorder {
        #[arg(value_delimiter = ',', num_args = 1.., required = true)]
        ids: Vec<i64>,
    },
    /// Show the editor panel state for one item.
    Panel { item_id: i64 },
    /// Print the request token for an action in the configured session.
    Nonce { action: String },
    /// Handle JSON requests from stdin, one per line.
    Dispatch,
    /// Print the core version.
    Version,
}
