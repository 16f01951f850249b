//! CLI command definitions
//!
//! Defines the clap subcommands for the scenario runner CLI.

use clap::Subcommand;
use std::path::PathBuf;

use crate::strategy::StrategyKind;

#[derive(Subcommand)]
pub enum Commands {
    /// Load scenario files and check every step without a browser
    Validate {
        /// Scenario files (.json, .yaml or .yml)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Environment whose validation chain to apply (default: from config)
        #[arg(long)]
        env: Option<String>,
    },

    /// Show the strategy, validators and observers a run would use
    Plan {
        /// Environment preset (default: from config)
        #[arg(long)]
        env: Option<String>,

        /// Strategy preset, overriding the environment's
        #[arg(long, value_enum)]
        strategy: Option<StrategyKind>,
    },

    /// List every supported action with its category and fields
    Actions,
}
