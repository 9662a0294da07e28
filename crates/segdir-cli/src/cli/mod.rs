//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use segdir_core::config;

mod commands;

#[derive(Parser)]
#[command(name = "segdir")]
#[command(version)]
#[command(about = "Browse a directory of segments in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show a manifest in the directory view (built-in sample if omitted)
    Show {
        /// Manifest file (TOML with [[segment]] tables)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Title shown above the marks strip
        #[arg(long)]
        title: Option<String>,
    },
    /// Validate a manifest and print what the directory would mount
    Check {
        /// Manifest file (TOML with [[segment]] tables)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print a fresh config generated from the built-in defaults
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        None => commands::show::run(&load_config()?, None, None).await,
        Some(Commands::Show { file, title }) => {
            commands::show::run(&load_config()?, file.as_deref(), title).await
        }
        Some(Commands::Check { file }) => commands::check::run(&load_config()?, &file),
        // Config subcommands must work even when the config file is broken.
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}

fn load_config() -> Result<config::Config> {
    config::Config::load().context("load config")
}
