//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gesture Control - Drive desktop automation with held hand gestures
#[derive(Parser, Debug)]
#[command(name = "gesturectl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the gesture control loop
    Run {
        /// Read landmark frames from a JSON-lines file ("-" for stdin)
        /// instead of spawning the configured estimator
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Disable the terminal status line
        #[arg(long)]
        no_preview: bool,

        /// Log actions instead of synthesizing input
        #[arg(long)]
        dry_run: bool,

        /// Profile store to use instead of the configured one
        #[arg(short, long)]
        profiles: Option<PathBuf>,
    },

    /// Register a gesture template from a captured frame
    Register {
        /// Gesture name
        #[arg(short, long)]
        name: String,

        /// File whose first line is a landmark frame in JSON
        #[arg(short, long)]
        frame: PathBuf,

        /// Action to map the gesture to (e.g. "hotkey:ctrl+c")
        #[arg(short, long)]
        action: Option<String>,

        /// Profile scope for the action
        #[arg(short, long, default_value = "GLOBAL")]
        scope: String,
    },

    /// Map a registered gesture to an action
    Map {
        /// Gesture name
        #[arg(short, long)]
        gesture: String,

        /// Action in tag:payload form
        #[arg(short, long)]
        action: String,

        /// Profile scope
        #[arg(short, long, default_value = "GLOBAL")]
        scope: String,
    },

    /// Remove a mapping, keeping the template
    Unmap {
        /// Gesture name
        #[arg(short, long)]
        gesture: String,

        /// Profile scope
        #[arg(short, long, default_value = "GLOBAL")]
        scope: String,
    },

    /// List gestures and mappings
    List {
        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Delete a gesture mapping, and its template once nothing maps it
    Delete {
        /// Gesture name
        name: String,

        /// Profile scope
        #[arg(short, long, default_value = "GLOBAL")]
        scope: String,
    },

    /// View or modify engine settings stored with the profiles
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View or reset configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Show current settings
    Show,

    /// Set a setting value
    Set {
        /// Setting key (e.g., "hold_time", "threshold", "trackpad_mode")
        key: String,

        /// Value to set
        value: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether `--source` names stdin
    pub fn is_stdin(source: &std::path::Path) -> bool {
        source.as_os_str() == "-"
    }
}
