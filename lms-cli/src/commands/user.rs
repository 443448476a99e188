//! Account management from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lms_core::models::NewUserForm;
use lms_core::Role;
use lms_server::db::{self, UserRepo};
use sqlx::SqlitePool;

use super::load_config;

#[derive(Parser, Debug)]
pub struct UserArgs {
    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create an account
    Create(CreateArgs),
    /// List accounts
    List(ListArgs),
}

#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Login name (3-32 characters: letters, digits, '_', '.', '-')
    #[arg(long)]
    pub username: String,

    /// Password
    #[arg(long)]
    pub password: String,

    /// Role: admin, instructor or student
    #[arg(long, default_value = "student")]
    pub role: String,

    /// Display name
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only show accounts with this role
    #[arg(long)]
    pub role: Option<String>,
}

pub async fn run_user(args: UserArgs) -> Result<()> {
    let config = load_config(args.database_url)?;
    let pool = db::create_pool(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to open database")?;
    db::migrations::run(&pool)
        .await
        .context("Failed to prepare database schema")?;

    match args.command {
        UserCommands::Create(args) => run_create(&pool, args).await,
        UserCommands::List(args) => run_list(&pool, args).await,
    }
}

async fn run_create(pool: &SqlitePool, args: CreateArgs) -> Result<()> {
    let new_user = NewUserForm {
        username: args.username,
        password: args.password,
        role: args.role,
        name: args.name,
    }
    .validate()?;

    let user = UserRepo::new(pool).create(&new_user).await?;
    tracing::info!(user_id = user.id, role = %user.role, "user created");
    println!("Created {} '{}' (id {})", user.role, user.username, user.id);
    Ok(())
}

async fn run_list(pool: &SqlitePool, args: ListArgs) -> Result<()> {
    let role = args
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()?;

    let users = UserRepo::new(pool).list(role).await?;
    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }

    println!("{:<6} {:<24} {:<12} {}", "ID", "USERNAME", "ROLE", "NAME");
    for user in users {
        println!(
            "{:<6} {:<24} {:<12} {}",
            user.id,
            user.username,
            user.role,
            user.name.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
