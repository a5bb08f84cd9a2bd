// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `muabot account` subcommands.
//!
//! Page accounts are created administratively: there is no sign-up flow.
//! `add` stores the page with its access token in `draft` status, `test`
//! verifies the token against the Graph API and records the outcome.

use clap::Subcommand;
use muabot_config::model::MuabotConfig;
use muabot_core::{Account, AccountStatus, MuabotError};
use muabot_graph::GraphClient;
use muabot_storage::queries::accounts;
use muabot_storage::Database;

/// Account management subcommands.
#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// Register a Facebook page with its access token.
    Add {
        /// Numeric page id the webhook will receive deliveries for.
        #[arg(long)]
        page_id: String,
        /// Display name of the page.
        #[arg(long)]
        name: String,
        /// Page access token used for outbound sends.
        #[arg(long)]
        access_token: String,
        /// Owning tenant.
        #[arg(long, default_value_t = 1)]
        tenant: i64,
    },
    /// List registered pages.
    List,
    /// Test the Graph connection; tests every account when no id is given.
    Test {
        /// Account id to test.
        id: Option<i64>,
    },
}

/// Run a `muabot account` subcommand.
pub async fn run(config: &MuabotConfig, command: AccountCommands) -> Result<(), MuabotError> {
    let db = Database::open_from_config(&config.storage).await?;
    let result = dispatch(config, &db, command).await;
    db.close().await?;
    result
}

async fn dispatch(
    config: &MuabotConfig,
    db: &Database,
    command: AccountCommands,
) -> Result<(), MuabotError> {
    match command {
        AccountCommands::Add {
            page_id,
            name,
            access_token,
            tenant,
        } => {
            let account =
                accounts::create_account(db, tenant, &page_id, &name, &access_token).await?;
            println!(
                "account {} created for page {} ({}), status {}",
                account.id, account.page_id, account.name, account.status
            );
            println!("run `muabot account test {}` to verify the token", account.id);
            Ok(())
        }
        AccountCommands::List => {
            let list = accounts::list_accounts(db).await?;
            if list.is_empty() {
                println!("no accounts registered (muabot account add)");
                return Ok(());
            }
            println!("{:<4} {:<16} {:<24} {:<10} active", "id", "page_id", "name", "status");
            for account in &list {
                println!(
                    "{:<4} {:<16} {:<24} {:<10} {}",
                    account.id, account.page_id, account.name, account.status, account.active
                );
            }
            Ok(())
        }
        AccountCommands::Test { id } => {
            let targets: Vec<Account> = match id {
                Some(id) => match accounts::get_account(db, id).await? {
                    Some(account) => vec![account],
                    None => {
                        return Err(MuabotError::Internal(format!("no account with id {id}")));
                    }
                },
                None => accounts::list_accounts(db).await?,
            };
            if targets.is_empty() {
                println!("no accounts registered (muabot account add)");
                return Ok(());
            }

            let graph = GraphClient::new(&config.facebook)?;
            for account in &targets {
                match graph
                    .get_page_info(&account.page_id, &account.access_token)
                    .await
                {
                    Ok(info) => {
                        accounts::update_status(db, account.id, AccountStatus::Connected).await?;
                        println!("account {}: connected ({})", account.id, info.name);
                    }
                    Err(e) => {
                        accounts::update_status(db, account.id, AccountStatus::Error).await?;
                        println!("account {}: error ({e})", account.id);
                    }
                }
            }
            Ok(())
        }
    }
}
