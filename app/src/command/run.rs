use crate::command::CommandStrategy;
use checkvis_config::Config;
use checkvis_core::{AssociationRepo, CaseLookup};
use checkvis_scraper::PageScraper;
use checkvis_store::AssociationStore;
use checkvis_telegram::{SharedRouter, TelegramBot};
use std::sync::Arc;
use tracing::{error, info};

/// Strategy for running the Telegram bot.
///
/// A missing or unreadable token file is logged and ends the command
/// without starting the transport.
#[derive(Debug, Clone, Copy)]
pub struct RunStrategy;

impl CommandStrategy for RunStrategy {
    type Input = Config;

    async fn execute(&self, config: Self::Input) -> anyhow::Result<()> {
        let token = match config.telegram.read_token() {
            Ok(token) => token,
            Err(e) => {
                error!("{e:#}");
                error!("Bot token not found. Exiting.");
                return Ok(());
            }
        };

        info!("Starting Telegram bot...");
        info!("Database path: {}", config.database.path.display());

        let store: Arc<dyn AssociationRepo> =
            Arc::new(AssociationStore::open(&config.database.path).await?);
        let scraper: Arc<dyn CaseLookup> = Arc::new(PageScraper::new(&config.scraper)?);

        let bot = TelegramBot::new(token, SharedRouter::new(store, scraper));
        bot.run().await?;

        Ok(())
    }
}
