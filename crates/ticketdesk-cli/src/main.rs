use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Verdict;

#[derive(Parser)]
#[command(name = "ticketdesk")]
#[command(about = "Ticketdesk CLI - support tickets from the terminal", long_about = None)]
struct Cli {
    /// Use this directory instead of the platform config directory
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Revoke the session and clear stored credentials
    Logout,
    /// List your tickets
    Tickets,
    /// Show one ticket with its pipeline and available actions
    Show { id: String },
    /// Ticket counts by status
    Counts {
        /// Restrict to one status ("all" for every status)
        #[arg(long)]
        state: Option<String>,
    },
    /// Submit a new ticket
    Create {
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "servicenow")]
        source: String,
        /// Client-side ticket id; generated when omitted
        #[arg(long)]
        sys_id: Option<String>,
    },
    /// Answer whether the resolution helped
    Feedback {
        id: String,
        #[arg(value_enum)]
        verdict: Verdict,
    },
    /// Provide the additional information a ticket is waiting for
    MoreInfo { id: String, text: String },
    /// Open the live conversation for a ticket
    Chat { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TICKETDESK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = commands::App::load(cli.config_dir.as_deref())?;

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&app, &email, password).await?,
        Commands::Register { email, password } => {
            commands::auth::register(&app, &email, password).await?
        }
        Commands::Logout => commands::auth::logout(&app).await?,
        Commands::Tickets => commands::tickets::list(&app).await?,
        Commands::Show { id } => commands::tickets::show(&app, &id).await?,
        Commands::Counts { state } => commands::tickets::counts(&app, state.as_deref()).await?,
        Commands::Create {
            description,
            source,
            sys_id,
        } => commands::tickets::create(&app, description, source, sys_id).await?,
        Commands::Feedback { id, verdict } => {
            commands::tickets::feedback(&app, &id, verdict.into()).await?
        }
        Commands::MoreInfo { id, text } => commands::tickets::more_info(&app, &id, &text).await?,
        Commands::Chat { id } => commands::chat::run(&app, &id).await?,
    }

    Ok(())
}
