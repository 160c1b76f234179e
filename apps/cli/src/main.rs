//! CareSphere CLI - command-line driver for the CareSphere session gateway
//!
//! Signs in against a CareSphere backend, keeps the session on disk and
//! sends authenticated requests through the gateway, so the refresh and
//! routing behaviour can be exercised without the web front end.

mod commands;
mod config;

use std::path::PathBuf;

use caresphere_core::Role;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{auth, links, request, route, status};

/// CareSphere CLI - session gateway driver
#[derive(Parser, Debug)]
#[command(name = "caresphere-cli", author, version, about = "CareSphere session gateway driver")]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Backend base URL (overrides CARESPHERE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session file (overrides CARESPHERE_SESSION_FILE)
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,

        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Path that sent you to the login screen
        #[arg(long)]
        return_to: Option<String>,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Password confirmation
        #[arg(long)]
        confirm: String,

        /// Account role (patient, doctor)
        #[arg(long, value_parser = parse_role)]
        role: Role,

        /// Doctor specialization
        #[arg(long)]
        specialization: Option<String>,
    },

    /// Sign out and revoke the refresh token
    Logout,

    /// Show the stored session
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send an authenticated request to the backend
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: String,

        /// API path, e.g. /patient/profile
        path: String,

        /// JSON body
        #[arg(long)]
        data: Option<String>,

        /// Query parameter as KEY=VALUE (repeatable)
        #[arg(long = "query")]
        query: Vec<String>,
    },

    /// Show where navigating to a path would take you
    Route {
        /// Portal path, e.g. /doctor/patients
        path: String,
    },

    /// List the sidebar links for the signed-in role
    Links,
}

fn parse_role(s: &str) -> Result<Role, String> {
    Role::parse(s).ok_or_else(|| format!("unknown role '{}' (expected patient or doctor)", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = config::load_config(args.api_url, args.session_file)?;

    // Initialize tracing
    let level = match args.log_level.as_deref().or(config.log_level.as_deref()).unwrap_or("warn") {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let gateway = config::connect(&config)?;

    match args.command {
        Command::Login { email, password, return_to } => {
            auth::login(&gateway, &email, password, return_to.as_deref()).await?;
        }
        Command::Register { name, email, password, confirm, role, specialization } => {
            let form = caresphere_core::RegisterForm {
                name,
                email,
                password,
                confirm_password: confirm,
                role,
                specialization,
            };
            auth::register(&gateway, &form).await?;
        }
        Command::Logout => {
            auth::logout(&gateway).await?;
        }
        Command::Status { json } => {
            status::execute(&gateway, json)?;
        }
        Command::Request { method, path, data, query } => {
            request::execute(&gateway, &method, &path, data.as_deref(), &query).await?;
        }
        Command::Route { path } => {
            route::execute(&gateway, &path);
        }
        Command::Links => {
            links::execute(&gateway);
        }
    }

    Ok(())
}
