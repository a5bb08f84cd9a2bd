// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `muabot offer` subcommands.
//!
//! The catalog shown in Messenger is managed here: `add` creates a product
//! and surfaces it as an offer, `list` prints what customers currently see.

use clap::Subcommand;
use muabot_chatbot::replies;
use muabot_config::model::MuabotConfig;
use muabot_core::{MuabotError, QUICK_REPLY_TITLE_MAX};
use muabot_storage::queries::offers;
use muabot_storage::Database;

/// Catalog management subcommands.
#[derive(Subcommand, Debug)]
pub enum OfferCommands {
    /// Add a product and surface it through Messenger.
    Add {
        /// Product name, shown in the list and on order lines.
        #[arg(long)]
        name: String,
        /// List price in whole VND; 0 means "price on request".
        #[arg(long)]
        price: i64,
        /// Quick-reply button label; falls back to the product name.
        #[arg(long)]
        caption: Option<String>,
        /// Position in the product list; appended after the last offer
        /// when omitted.
        #[arg(long)]
        sequence: Option<i64>,
        /// Owning tenant.
        #[arg(long, default_value_t = 1)]
        tenant: i64,
    },
    /// List catalog offers for a tenant.
    List {
        #[arg(long, default_value_t = 1)]
        tenant: i64,
    },
}

/// Run a `muabot offer` subcommand.
pub async fn run(config: &MuabotConfig, command: OfferCommands) -> Result<(), MuabotError> {
    let db = Database::open_from_config(&config.storage).await?;
    let result = dispatch(&db, command).await;
    db.close().await?;
    result
}

async fn dispatch(db: &Database, command: OfferCommands) -> Result<(), MuabotError> {
    match command {
        OfferCommands::Add {
            name,
            price,
            caption,
            sequence,
            tenant,
        } => {
            if let Some(ref caption) = caption {
                if caption.chars().count() > QUICK_REPLY_TITLE_MAX {
                    return Err(MuabotError::Config(format!(
                        "caption exceeds {QUICK_REPLY_TITLE_MAX} characters"
                    )));
                }
            }

            let sequence = match sequence {
                Some(s) => s,
                None => next_sequence(db, tenant).await?,
            };

            let product = offers::create_product(db, &name, price).await?;
            let offer = offers::create_offer(
                db,
                tenant,
                product.id,
                sequence,
                caption.as_deref(),
                true,
            )
            .await?;
            println!(
                "offer {} created: {} at {} (sequence {})",
                offer.id,
                offer.product_name,
                replies::price_label(offer.list_price),
                offer.sequence
            );
            Ok(())
        }
        OfferCommands::List { tenant } => {
            let list = offers::list_offers(db, tenant).await?;
            if list.is_empty() {
                println!("no offers for tenant {tenant} (muabot offer add)");
                return Ok(());
            }
            println!(
                "{:<4} {:<6} {:<24} {:<12} active",
                "id", "seq", "product", "price"
            );
            for offer in &list {
                println!(
                    "{:<4} {:<6} {:<24} {:<12} {}",
                    offer.id,
                    offer.sequence,
                    offer.product_name,
                    replies::price_label(offer.list_price),
                    offer.active
                );
            }
            Ok(())
        }
    }
}

/// Sequence value placing a new offer after every existing one.
async fn next_sequence(db: &Database, tenant: i64) -> Result<i64, MuabotError> {
    let list = offers::list_offers(db, tenant).await?;
    Ok(list.iter().map(|o| o.sequence).max().unwrap_or(0) + 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_with_db(dir: &tempfile::TempDir) -> MuabotConfig {
        let mut config = MuabotConfig::default();
        config.storage.database_path =
            dir.path().join("offers.db").to_string_lossy().to_string();
        config
    }

    #[tokio::test]
    async fn add_creates_product_and_offer() {
        let dir = tempdir().unwrap();
        let config = config_with_db(&dir);

        run(
            &config,
            OfferCommands::Add {
                name: "Cà phê sữa đá".to_string(),
                price: 29000,
                caption: None,
                sequence: None,
                tenant: 1,
            },
        )
        .await
        .unwrap();

        let db = Database::open_from_config(&config.storage).await.unwrap();
        let list = offers::list_offers(&db, 1).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].product_name, "Cà phê sữa đá");
        assert_eq!(list[0].list_price, 29000);
        assert_eq!(list[0].sequence, 10);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn omitted_sequence_appends_after_last() {
        let dir = tempdir().unwrap();
        let config = config_with_db(&dir);

        for name in ["Cà phê", "Trà sữa"] {
            run(
                &config,
                OfferCommands::Add {
                    name: name.to_string(),
                    price: 25000,
                    caption: None,
                    sequence: None,
                    tenant: 1,
                },
            )
            .await
            .unwrap();
        }

        let db = Database::open_from_config(&config.storage).await.unwrap();
        let list = offers::list_offers(&db, 1).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].sequence, 20);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn oversized_caption_is_rejected() {
        let dir = tempdir().unwrap();
        let config = config_with_db(&dir);

        let result = run(
            &config,
            OfferCommands::Add {
                name: "Trà".to_string(),
                price: 10000,
                caption: Some("một cái tên dài hơn hai mươi ký tự".to_string()),
                sequence: None,
                tenant: 1,
            },
        )
        .await;

        assert!(matches!(result, Err(MuabotError::Config(_))));
    }
}
