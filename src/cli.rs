use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fazenda")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative infrastructure: reconcile resources, then configure the host", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Provider state file (defaults to the user state directory)
    #[arg(long, global = true, env = "FAZENDA_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show provider state vs the declared resources
    Status(StatusArgs),

    /// Preview what apply would change
    Plan(PlanArgs),

    /// Converge provider state to the declared resources
    Apply(ApplyArgs),

    /// Execute playbook steps against a host, gated on readiness
    Run(RunArgs),

    /// Apply, then run the playbook against the provisioned host
    Up(UpArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct StatusArgs {
    /// Resources declaration file
    #[arg(short = 'f', long, default_value = "infra.toml")]
    pub resources: PathBuf,

    /// Machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct PlanArgs {
    /// Resources declaration file
    #[arg(short = 'f', long, default_value = "infra.toml")]
    pub resources: PathBuf,

    /// Machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// Resources declaration file
    #[arg(short = 'f', long, default_value = "infra.toml")]
    pub resources: PathBuf,

    /// Show what would change without touching the provider
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Playbook file
    #[arg(short = 'p', long, default_value = "steps.toml")]
    pub playbook: PathBuf,

    /// Connect to this address instead of the one recorded in state
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(clap::Args)]
pub struct UpArgs {
    /// Resources declaration file
    #[arg(short = 'f', long, default_value = "infra.toml")]
    pub resources: PathBuf,

    /// Playbook file
    #[arg(short = 'p', long, default_value = "steps.toml")]
    pub playbook: PathBuf,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}
