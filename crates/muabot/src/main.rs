// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Muabot - a Facebook Messenger sales chatbot.
//!
//! This is the binary entry point: webhook server plus the administrative
//! commands for accounts and the product catalog.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod account;
mod doctor;
mod offer;
mod serve;
mod status;

/// Muabot - a Facebook Messenger sales chatbot.
#[derive(Parser, Debug)]
#[command(name = "muabot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server.
    Serve,
    /// Show server health and storage counts.
    Status {
        /// Output machine-readable JSON.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Run diagnostic checks against config, database and the Graph API.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Manage connected Facebook pages.
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },
    /// Manage the product catalog shown in Messenger.
    Offer {
        #[command(subcommand)]
        command: offer::OfferCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration before any command runs.
    let config = match muabot_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            muabot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        Some(Commands::Account { command }) => account::run(&config, command).await,
        Some(Commands::Offer { command }) => offer::run(&config, command).await,
        None => {
            println!("muabot: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
