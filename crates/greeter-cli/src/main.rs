// Greeter
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod tui;

use crate::commands::CommandContext;
use crate::config::GreeterConfig;
use crate::tui::run_tui;
use anyhow::Result;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// CLI for the greeter dApp
#[derive(Parser, Debug)]
#[command(name = "greeter", about = "Greet the chain and read back who said hello")]
pub struct Cli {
    /// Path to configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Data directory location (overrides $GREETER_DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for configuration inspection and update
#[derive(Subcommand, Debug)]
#[command(about = "Inspect or update CLI configuration")]
pub enum ConfigCommands {
    /// Show current effective configuration
    Show,
    /// Update a configuration key to a new value
    Set { key: String, value: String },
}

/// Subcommands for the local development chain
#[derive(Subcommand, Debug)]
#[command(about = "Inspect or reset the development chain")]
pub enum DevCommands {
    /// List dev accounts, marking the selected one
    Accounts,
    /// Clear every submitted name and rewind the block height
    Reset,
}

/// Top-level commands for greeter
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive TUI
    Run,

    /// Submit a name to the contract
    Greet {
        /// Name to greet
        name: String,
    },

    /// Read back the submitted names
    Names {
        /// Read a single entry by position
        #[arg(long)]
        index: Option<u64>,

        /// Print the list as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Display wallet and contract status
    Status,

    /// Inspect or update configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Development chain operations
    Dev {
        #[command(subcommand)]
        command: DevCommands,
    },
}

fn init_logging(config: &GreeterConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if to_file {
        std::fs::create_dir_all(&config.data_dir)?;
        let file = OpenOptions::new().create(true).append(true).open(config.log_file())?;
        tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = GreeterConfig::resolve_config(cli.config, cli.data_dir)?;

    // The TUI owns the terminal, so its logs go to a file
    init_logging(&config, matches!(cli.command, Commands::Run))?;

    // Configuration commands run before the wallet is set up
    if let Commands::Config { command } = cli.command {
        return commands::config::handle_config_command(&config, command);
    }

    // Create command context
    let ctx = CommandContext::new(config)?;

    dispatch(ctx, cli.command)
}

fn dispatch(ctx: CommandContext, command: Commands) -> Result<()> {
    match command {
        Commands::Run => {
            run_tui(ctx)?;
        }
        Commands::Greet { name } => {
            commands::greet::submit_greeting(&ctx, &name)?;
        }
        Commands::Names { index, json } => {
            commands::names::show_names(&ctx, index, json)?;
        }
        Commands::Status => {
            commands::status::show_status(&ctx)?;
        }
        Commands::Config { command } => {
            commands::config::handle_config_command(&ctx.config, command)?;
        }
        Commands::Dev { command } => {
            commands::dev::handle_dev_command(&ctx, command)?;
        }
    }

    Ok(())
}
