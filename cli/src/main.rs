mod client;
mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::client::ApiClient;
use crate::commands::{
    cmd_dashboard, cmd_delete, cmd_edit, cmd_history, cmd_log, cmd_login, cmd_logout,
    cmd_profile_set, cmd_profile_show, cmd_register, cmd_status,
};
use sip_core::db::Database;

#[derive(Parser)]
#[command(
    name = "sip",
    version,
    about = "A simple water tracker CLI",
    long_about = "\n\n  ███████╗██╗██████╗
  ██╔════╝██║██╔══██╗
  ███████╗██║██████╔╝
  ╚════██║██║██╔═══╝
  ███████║██║██║
  ╚══════╝╚═╝╚═╝
   stay hydrated.
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account on the server
    Register {
        /// Display name
        name: String,
        /// Email address (used to log in)
        email: String,
        /// Password (min 8 characters; prompted if omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log in and save a session token
    Login {
        /// Email address
        email: String,
        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Revoke the session and forget the saved token
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a drink
    Log {
        /// Amount (e.g. "500", "500ml", "0.5l")
        quantity: String,
        /// Drink type (coffee does not count toward your goal)
        #[arg(short, long, default_value = "water")]
        drink: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show today's progress, streak and the last 7 days
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List logged drinks, newest first
    History {
        /// Limit to the most recent N records
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a logged drink
    Edit {
        /// Record ID to edit
        id: i64,
        /// New amount (e.g. "500", "500ml", "0.5l")
        #[arg(short, long)]
        quantity: Option<String>,
        /// New drink type
        #[arg(short, long)]
        drink: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a logged drink
    Delete {
        /// Record ID to delete
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that the API server is reachable
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or update your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3400")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show your profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update profile fields
    Set {
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Age in years
        #[arg(long)]
        age: Option<i64>,
        /// Weight in kilograms
        #[arg(long)]
        weight: Option<f64>,
        /// Daily goal in liters
        #[arg(long)]
        goal: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn public_client() -> Result<ApiClient> {
    ApiClient::new(config::api_url()?, None)
}

fn session_client() -> Result<ApiClient> {
    let session = config::require_session()?;
    ApiClient::new(config::api_url()?, Some(session.token))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Register {
            name,
            email,
            password,
            json,
        } => cmd_register(&public_client()?, &name, &email, password, json).await,
        Commands::Login {
            email,
            password,
            json,
        } => cmd_login(&public_client()?, &email, password, json).await,
        Commands::Logout { json } => cmd_logout(&session_client()?, json).await,
        Commands::Log {
            quantity,
            drink,
            json,
        } => cmd_log(&session_client()?, &quantity, &drink, json).await,
        Commands::Dashboard { json } => cmd_dashboard(session_client()?, json).await,
        Commands::History { limit, json } => cmd_history(&session_client()?, limit, json).await,
        Commands::Edit {
            id,
            quantity,
            drink,
            json,
        } => cmd_edit(&session_client()?, id, quantity.as_deref(), drink, json).await,
        Commands::Delete { id, yes, json } => cmd_delete(&session_client()?, id, yes, json).await,
        Commands::Status { json } => {
            let api_url = config::api_url()?;
            cmd_status(&public_client()?, &api_url, json).await
        }
        Commands::Profile { command } => match command {
            ProfileCommands::Show { json } => cmd_profile_show(&session_client()?, json).await,
            ProfileCommands::Set {
                name,
                age,
                weight,
                goal,
                json,
            } => cmd_profile_set(&session_client()?, name, age, weight, goal, json).await,
        },
        Commands::Serve { port, bind } => {
            let db = Database::open(&config::database_path()?)?;
            server::start_server(db, port, &bind).await
        }
    }
}
