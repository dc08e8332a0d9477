//! Command-line surface of the `listsweep` binary.

use std::path::PathBuf;

use clap::Parser;
use listsweep_core::Mode;
use listsweep_engine::DEFAULT_JOB_KEY;

use crate::platform::logging::LogDestination;

/// Sweep the accounts you follow into a collection and/or unfollow them,
/// within the remote's rate limits. Interrupted runs resume from a checkpoint.
#[derive(Parser, Debug, Clone)]
#[command(name = "listsweep", version, about)]
pub struct Cli {
    /// What to do with each followed account: add-only, remove-only or both
    #[arg(long, env = "LISTSWEEP_MODE", default_value = "both")]
    pub mode: Mode,

    /// Collection that accounts are added to
    #[arg(long, env = "LISTSWEEP_TARGET")]
    pub target: Option<String>,

    /// Create a collection with this name when no target is given or saved
    #[arg(long, conflicts_with = "target")]
    pub create_collection: Option<String>,

    /// Description for a newly created collection
    #[arg(long, requires = "create_collection")]
    pub description: Option<String>,

    /// Make a newly created collection private
    #[arg(long, requires = "create_collection")]
    pub private: bool,

    /// Bearer token for the remote API
    #[arg(long, env = "LISTSWEEP_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Root URL of the remote API; overrides the settings file
    #[arg(long, env = "LISTSWEEP_BASE_URL")]
    pub base_url: Option<String>,

    /// Optional RON settings file with quota windows and timeouts
    #[arg(long, env = "LISTSWEEP_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Directory holding the checkpoint file
    #[arg(long, env = "LISTSWEEP_STATE_DIR", default_value = ".")]
    pub state_dir: PathBuf,

    /// Name of the checkpoint file, without extension
    #[arg(long, default_value = DEFAULT_JOB_KEY)]
    pub job_key: String,

    /// Entities requested per page; overrides the settings file
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Ignore any saved checkpoint and start over
    #[arg(long)]
    pub fresh: bool,

    /// Delete the saved checkpoint and exit
    #[arg(long, conflicts_with = "fresh")]
    pub reset: bool,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log_destination: LogDestination,

    /// Log file used by the `file` and `both` destinations
    #[arg(long, default_value = "listsweep.log")]
    pub log_file: PathBuf,

    /// More log output; repeat for trace level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
