use clap::{Parser, Subcommand};
use counselor_types::{Theme, DEFAULT_BACKEND_URL};
use std::path::PathBuf;

/// CLI arguments for counselor
#[derive(Parser, Debug)]
#[command(name = "counselor")]
#[command(about = "Your Career Counselor - friendly career guidance & roadmaps")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the chat backend
    #[arg(long, env = "COUNSELOR_BACKEND_URL", default_value = DEFAULT_BACKEND_URL, value_name = "URL")]
    pub backend_url: String,

    /// Key-value store file holding profile and theme (default: ~/.counselor/store.json)
    #[arg(long, env = "COUNSELOR_STORE", value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start an interactive chat (default)
    Chat,

    /// Show the exchanges the backend stored for a user
    History {
        /// User to look up (default: the profile name, or Guest)
        #[arg(long)]
        user: Option<String>,
    },

    /// Show, set or clear the stored profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Show or set the theme
    Theme {
        /// light or dark
        theme: Option<Theme>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProfileAction {
    /// Print the stored profile
    Show,

    /// Overwrite the stored profile
    Set {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        education: String,
        #[arg(long, default_value = "")]
        interests: String,
    },

    /// Remove the stored profile (sign out)
    Clear,
}
