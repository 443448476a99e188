use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lms_core::LmsConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show config file path
    Path,
    /// Print the effective config (file, then environment overrides)
    Show,
    /// Write a default config file
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Init(args) => run_init(args),
    }
}

fn run_path() -> Result<()> {
    println!("{}", LmsConfig::config_path().display());
    Ok(())
}

fn run_show() -> Result<()> {
    let mut config = LmsConfig::load()?;
    if let Some(bootstrap) = config.bootstrap.as_mut() {
        bootstrap.admin_password = "********".to_string();
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

fn run_init(args: InitArgs) -> Result<()> {
    let config_path = LmsConfig::config_path();

    // Check if config already exists
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            config_path
        ));
    }

    LmsConfig::default()
        .save_to(&config_path)
        .context("Failed to write default config")?;

    println!("✓ Wrote {}", config_path.display());
    Ok(())
}
