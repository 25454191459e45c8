//! BLEO JWT secret rotation
//!
//! Command-line entry point for operators and cron jobs. Without flags it
//! rotates the signing secret only if the rotation interval has elapsed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use bleo_secrets::config::RotationConfig;
use bleo_secrets::rotation::{RotationManager, RotationState};
use bleo_secrets::store::FileSecretStore;

#[derive(Parser)]
#[command(name = "bleo-rotate")]
#[command(about = "Inspect and rotate the BLEO JWT signing secret", long_about = None)]
#[command(version)]
struct Cli {
    /// Print the rotation status and exit
    #[arg(long, conflicts_with_all = ["check", "force"])]
    status: bool,

    /// Print whether rotation is due and exit
    #[arg(long, conflicts_with = "force")]
    check: bool,

    /// Rotate even if the current secret is not due
    #[arg(long)]
    force: bool,

    /// Secret store file
    #[arg(long, env = "BLEO_SECRET_STORE")]
    store: Option<PathBuf>,

    /// JSON configuration file (defaults to BLEO_JWT_* environment variables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter("bleo_secrets=debug,bleo_rotate=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "bleo_secrets=info".into()),
            )
            .init();
    }

    let config = match &cli.config {
        Some(path) => RotationConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => RotationConfig::from_env().context("Invalid BLEO_JWT_* environment")?,
    };

    let store_path = match cli.store {
        Some(path) => path,
        None => default_store_path()?,
    };
    let store = FileSecretStore::open(&store_path)
        .with_context(|| format!("Failed to open secret store {}", store_path.display()))?;
    let manager = RotationManager::new(config, Arc::new(store))?;

    if cli.status {
        let status = manager.get_status();
        println!("Status:          {}", status.status);
        println!("Rotation count:  {}", display_or_dash(status.rotation_count));
        println!("Last rotation:   {}", display_or_dash(status.last_rotation));
        println!("Next rotation:   {}", display_or_dash(status.next_rotation));
        if let Some(message) = &status.message {
            eprintln!("Error: {}", message);
            return Ok(ExitCode::FAILURE);
        }
        return Ok(ExitCode::SUCCESS);
    }

    if cli.check {
        let status = manager.get_status();
        if status.is_error() {
            println!("Rotation status unknown");
            if let Some(message) = &status.message {
                eprintln!("Error: {}", message);
            }
            return Ok(ExitCode::FAILURE);
        }
        if status.status == RotationState::Due {
            println!("Rotation due");
        } else {
            println!("Rotation not due");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let result = manager.rotate(cli.force);
    println!("{}", result.message);
    if !result.success {
        return Ok(ExitCode::FAILURE);
    }
    println!("Rotation count:  {}", display_or_dash(result.rotation_count));
    println!("Next rotation:   {}", display_or_dash(result.next_rotation));
    if let Some(strength) = result.secret_strength {
        println!("Secret strength: {}", strength);
    }
    Ok(ExitCode::SUCCESS)
}

fn default_store_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("No data directory; pass --store")?;
    Ok(data_dir.join("bleo").join("jwt_secret.json"))
}

fn display_or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
