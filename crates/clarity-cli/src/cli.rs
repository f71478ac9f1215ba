use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clarity_core::config::PersistenceMode;
use clarity_core::models::SortKey;
use clarity_core::TaskFilter;

#[derive(Parser)]
#[command(name = "clarity")]
#[command(about = "Manage your Clarity to-do list from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name (backend URL, persistence mode, stored login)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Wait until the backend answers its health check
    Health {
        /// Keep re-checking in the background until Ctrl-C
        #[arg(long)]
        watch: bool,
    },
    /// List tasks
    #[command(alias = "ls")]
    List {
        /// Completion filter
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        /// Case-insensitive title search
        #[arg(short, long)]
        search: Option<String>,
        /// Sort order (stored order when omitted)
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a task
    #[command(alias = "new")]
    Add {
        /// Task description
        description: Vec<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        /// Mark the task completed on creation
        #[arg(long)]
        completed: bool,
    },
    /// Flip the completion state of a task
    Toggle {
        /// Task ID
        id: String,
    },
    /// Edit a task
    Edit {
        /// Task ID
        id: String,
        /// New description
        #[arg(long)]
        title: Option<String>,
        /// New due date (YYYY-MM-DD); an empty value clears it in local mode
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        /// New completion state
        #[arg(long, value_name = "BOOL")]
        completed: Option<bool>,
    },
    /// Delete a task after confirmation
    #[command(alias = "rm")]
    Delete {
        /// Task ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Sign up, log in and manage the stored token
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for TaskFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => Self::All,
            FilterArg::Active => Self::Active,
            FilterArg::Completed => Self::Completed,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortArg {
    /// Newest first
    Created,
    /// Earliest due date first
    Due,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Created => Self::Created,
            SortArg::Due => Self::DueDate,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum PersistenceArg {
    /// Keep tasks in a local file only
    Local,
    /// Store tasks on the backend
    Remote,
}

impl From<PersistenceArg> for PersistenceMode {
    fn from(value: PersistenceArg) -> Self {
        match value {
            PersistenceArg::Local => Self::Local,
            PersistenceArg::Remote => Self::Remote,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// Backend base URL
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Where tasks are stored
        #[arg(long, value_enum)]
        persistence: Option<PersistenceArg>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved configuration
    Show,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account
    Signup {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "USERNAME")]
        username: String,
        /// Display name
        #[arg(long, value_name = "NAME")]
        name: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Log in and store the token in the keychain
    Login {
        /// Username or email
        #[arg(long, value_name = "USERNAME_OR_EMAIL")]
        identifier: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show whether the profile holds a token
    Status,
    /// Clear the stored token
    Logout,
}
