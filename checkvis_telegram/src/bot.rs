use crate::{Command, Result};
use checkvis_core::{AssociationRepo, CaseLookup, CommandRouter, Reply, Request};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;

/// Router over type-erased storage and lookup, shared by all handler tasks.
pub type SharedRouter = CommandRouter<Arc<dyn AssociationRepo>, Arc<dyn CaseLookup>>;

/// Telegram long-poll front end for the command router
#[derive(Clone)]
pub struct TelegramBot {
    /// Teloxide bot instance
    pub bot: Bot,
    router: Arc<SharedRouter>,
    /// Own username, learned from `getMe`; used to filter `/cmd@other_bot`
    username: String,
}

impl TelegramBot {
    #[must_use]
    pub fn new(token: String, router: SharedRouter) -> Self {
        Self {
            bot: Bot::new(token),
            router: Arc::new(router),
            username: String::new(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Route one request on behalf of `user_id`.
    pub async fn handle(&self, user_id: i64, request: Request) -> Option<Reply> {
        self.router.route(user_id, request).await
    }

    /// Check the token against the Telegram API and remember our username.
    async fn connect(&mut self) -> Result<()> {
        let me = self.bot.get_me().await?;
        self.username = me.user.username.clone().unwrap_or_default();
        info!(
            "Connected to Telegram API: @{} (id: {})",
            if self.username.is_empty() {
                "no username"
            } else {
                self.username.as_str()
            },
            me.user.id
        );
        Ok(())
    }

    /// Run the bot until Ctrl+C.
    pub async fn run(mut self) -> Result<()> {
        use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
        use teloxide::dptree;
        use teloxide::types::Update;

        self.connect().await?;
        self.bot.set_my_commands(Command::bot_commands()).await?;

        let bot = self.bot.clone();

        let schema = dptree::entry().branch(Update::filter_message().endpoint({
            let bot_clone = self.clone();
            move |msg: Message| {
                let bot_clone = bot_clone.clone();
                async move { crate::handler::handle_message(bot_clone, msg).await }
            }
        }));

        info!("Telegram bot is running. Press Ctrl+C to stop.");

        Dispatcher::builder(bot, schema)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
