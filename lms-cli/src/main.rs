//! lms CLI - run and administer the learning management system
//!
//! - `serve`: run the HTTP server
//! - `user`: create and list accounts without a browser
//! - `config`: inspect and initialise `~/.lms/config.toml`

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "lms",
    author,
    version,
    about = "Learning management system: courses, materials, assignments and grades",
    long_about = "Serve the LMS web application and manage its accounts and configuration. \
                  Settings come from ~/.lms/config.toml (or $LMS_CONFIG), then environment \
                  variables, then command-line flags."
)]
struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Manage user accounts (create, list)
    User(commands::user::UserArgs),
    /// Manage lms configuration (path, show, init)
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so clap's env-backed flags see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::User(args) => commands::run_user(args).await?,
        Commands::Config(args) => config::run_config(args)?,
    }

    Ok(())
}
