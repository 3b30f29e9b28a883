//! Catalog CLI - database migrations and a terminal front end for the API.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! catalog migrate
//!
//! # Create an account and keep the token for later commands
//! export CATALOG_TOKEN=$(catalog signup -e ada@example.com -p hunter22 | jq -r .token)
//!
//! # Manage products
//! catalog products create --title Mug --price 9.5 --category kitchen
//! catalog products list --category kitchen
//! catalog products patch <id> --price 12
//! catalog products categories --select kitchen
//! ```
//!
//! Every API command prints the server's JSON response on stdout. Logs go to
//! stderr (`RUST_LOG`, default `warn`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::products::ProductCommand;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(author, version, about = "Catalog CLI tools")]
struct Cli {
    /// Base URL of the catalog API
    #[arg(
        long,
        global = true,
        env = "CATALOG_SERVER_URL",
        default_value = "http://127.0.0.1:5000"
    )]
    server: String,

    /// Bearer token from `signup` or `login`
    #[arg(long, global = true, env = "CATALOG_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// `PostgreSQL` connection string (falls back to `DATABASE_URL`)
        #[arg(long, env = "CATALOG_DATABASE_URL", hide_env_values = true)]
        database_url: Option<String>,
    },
    /// Create an account and print its token
    Signup {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Display name (defaults to "User")
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Sign in and print a fresh token
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Show the signed-in user
    Profile,
    /// Check that the server is up
    Health,
    /// Manage your products
    Products {
        #[command(subcommand)]
        action: ProductCommand,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs on stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        #[allow(clippy::print_stderr)]
        {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let api = commands::Api {
        server: cli.server,
        token: cli.token,
    };

    match cli.command {
        Commands::Migrate { database_url } => {
            let database_url =
                commands::migrate::database_url(database_url, |key| std::env::var(key).ok())?;
            commands::migrate::run(database_url).await?;
        }
        Commands::Signup {
            email,
            password,
            name,
        } => commands::auth::signup(&api, email, password, name).await?,
        Commands::Login { email, password } => commands::auth::login(&api, email, password).await?,
        Commands::Profile => commands::auth::profile(&api).await?,
        Commands::Health => commands::auth::health(&api).await?,
        Commands::Products { action } => commands::products::run(&api, action).await?,
    }
    Ok(())
}
