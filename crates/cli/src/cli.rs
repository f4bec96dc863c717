use std::path::PathBuf;
use std::str::FromStr;

use clap::{value_parser, Args, Parser, Subcommand};

use crate::model::{Criterion, Priority, SortKey, TaskColor};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskdeck",
    version,
    about = "Manage your tasks on a remote task API from the terminal.",
    after_help = "Examples:\n  taskdeck signup --name Ada --email ada@example.com\n  taskdeck add Renew passport --due fri --priority 4 --color red\n  taskdeck list --filter overdue --sort due-date-asc\n  taskdeck toggle 3f2a"
)]
pub struct Cli {
    /// Override the data directory (defaults to platform-specific app dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the task API
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Authorization scheme sent before the token ("none" sends the bare token) [env: TASKDECK_AUTH_SCHEME]
    #[arg(long, value_name = "SCHEME", global = true)]
    pub auth_scheme: Option<String>,

    /// Request timeout in seconds (0 disables it)
    #[arg(long, value_name = "SECONDS", default_value_t = 30, value_parser = value_parser!(u64), global = true)]
    pub timeout: u64,

    /// Tracing filter (e.g. "warn", "debug"); RUST_LOG takes precedence
    #[arg(long = "log", value_name = "DIRECTIVE", default_value = "warn", global = true)]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Sign in with an existing account
    Login(LoginArgs),
    /// Create an account and sign in
    Signup(SignupArgs),
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List tasks (default command)
    List(ListArgs),
    /// Show one task in detail
    Show(IdArgs),
    /// Create a task
    Add(AddArgs),
    /// Change fields of a task
    Edit(EditArgs),
    /// Flip a task between completed and pending
    Toggle(IdArgs),
    /// Delete a task
    Delete(IdArgs),
    /// Show task counts
    Stats(StatsArgs),
}

impl Default for CliCommand {
    fn default() -> Self {
        CliCommand::List(ListArgs::default())
    }
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    /// Read from stdin when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SignupArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    /// Read from stdin when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(long, value_enum, default_value_t = Criterion::All)]
    pub filter: Criterion,

    #[arg(long, value_enum, default_value_t = SortKey::CreatedDesc)]
    pub sort: SortKey,

    /// Print the tasks as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct IdArgs {
    /// Task id or a unique prefix of it
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Task title
    #[arg(value_name = "TITLE", required = true)]
    pub title: Vec<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Priority from 1 (lowest) to 5 (highest)
    #[arg(long, value_parser = Priority::from_str)]
    pub priority: Option<Priority>,

    /// Color name or hex value (gray, red, orange, yellow, green, blue, purple, pink)
    #[arg(long, value_parser = TaskColor::from_str)]
    pub color: Option<TaskColor>,

    /// Due date (ISO e.g. 2024-12-24, today, +3d, fri)
    #[arg(long = "due", value_name = "DATE")]
    pub due: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Task id or a unique prefix of it
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    #[arg(long)]
    pub clear_description: bool,

    #[arg(long, value_parser = Priority::from_str)]
    pub priority: Option<Priority>,

    #[arg(long, value_parser = TaskColor::from_str)]
    pub color: Option<TaskColor>,

    #[arg(long = "due", value_name = "DATE", conflicts_with = "clear_due")]
    pub due: Option<String>,

    #[arg(long)]
    pub clear_due: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct StatsArgs {
    #[arg(long)]
    pub json: bool,
}
