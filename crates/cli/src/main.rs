// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use gc_cli::config::{ConfigProvider, FileConfigProvider};
use gc_core::{ApplicationId, CaseId};

#[derive(Parser)]
#[command(name = "gridctl", version, about = "GridCompute admin CLI and agent process")]
struct Cli {
    /// This machine's identity. Defaults to $GRIDCOMPUTE_MACHINE or $HOSTNAME.
    #[arg(long, global = true)]
    machine: Option<String>,

    /// This user's identity. Defaults to $GRIDCOMPUTE_USER or $USER.
    #[arg(long, global = true)]
    user: Option<String>,

    /// Overrides the pointer-file lookup (for tests and non-standard layouts).
    #[arg(long, global = true)]
    pointer_file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the long-running agent loop for this machine.
    Agent {
        #[command(subcommand)]
        command: AgentCommand,
    },
    /// One-shot case submission.
    Submit {
        #[arg(long)]
        application: String,
        /// Passed verbatim to the adapter's `send` step.
        user_selection: String,
    },
    /// Summary for this machine/user.
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Inspect or pull a specific case.
    Case {
        #[command(subcommand)]
        command: CaseCommand,
    },
}

#[derive(Subcommand)]
enum AgentCommand {
    /// Run the poll/claim, heartbeat, reclamation, and retrieval loops
    /// until SIGINT/SIGTERM.
    Run {
        #[arg(long, default_value_t = gc_cli::startup::DEFAULT_CAPACITY)]
        capacity: usize,
    },
}

#[derive(Subcommand)]
enum CaseCommand {
    /// Print the status projection for a case.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Explicitly pull a processed case's result now, rather than waiting
    /// for the next retrieval-duty scan.
    Receive { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gc_cli::logging::init();
    let cli = Cli::parse();

    let (machine, user) = FileConfigProvider::resolve_identity(cli.machine, cli.user)?;
    let mut provider = FileConfigProvider::new(machine, user);
    if let Some(pointer_file) = cli.pointer_file {
        provider = provider.with_pointer_file(pointer_file);
    }

    match cli.command {
        Command::Agent { command: AgentCommand::Run { capacity } } => {
            gc_cli::commands::agent::run(&provider, capacity).await?;
        }
        Command::Submit { application, user_selection } => {
            gc_cli::commands::submit::run(&provider, ApplicationId::from(application.as_str()), &user_selection)
                .await?;
        }
        Command::Status { json } => {
            gc_cli::commands::status::run(&provider, json).await?;
        }
        Command::Case { command: CaseCommand::Show { id, json } } => {
            gc_cli::commands::case::show(&provider, &CaseId::from_string(&id), json).await?;
        }
        Command::Case { command: CaseCommand::Receive { id } } => {
            gc_cli::commands::case::receive(&provider, &CaseId::from_string(&id)).await?;
        }
    }

    Ok(())
}
