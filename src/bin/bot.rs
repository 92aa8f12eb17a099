use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;

use remind_me::commands::{ActionOutcome, ReminderService};
use remind_me::core::{Config, SystemClock};
use remind_me::delivery::discord::parse_control_id;
use remind_me::delivery::DiscordGateway;
use remind_me::features::categories::{CategoryClassifier, CategoryConfig};

struct Handler {
    service: Arc<ReminderService>,
}

impl Handler {
    async fn handle_component(
        &self,
        ctx: &Context,
        component: &MessageComponentInteraction,
    ) -> Result<()> {
        let outcome = match parse_control_id(&component.data.custom_id) {
            Some((action, reminder_id)) => {
                let chat_id = component.channel_id.0 as i64;
                let outcome = self
                    .service
                    .on_inbound_action(chat_id, &reminder_id, action)
                    .await;
                debug!("Button {action} on {reminder_id} in {chat_id}: {outcome:?}");
                outcome
            }
            None => {
                warn!("Unknown component id: {}", component.data.custom_id);
                ActionOutcome::NotFound
            }
        };

        component
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message.content(outcome.message()).ephemeral(true)
                    })
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, _ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        self.service
            .on_inbound_text(msg.channel_id.0 as i64, &msg.content)
            .await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::MessageComponent(component) = interaction {
            if let Err(e) = self.handle_component(&ctx, &component).await {
                error!(
                    "Error handling component interaction '{}': {}",
                    component.data.custom_id, e
                );
            }
        }
    }
}

fn load_classifier(path: &str) -> Result<CategoryClassifier> {
    let config = match CategoryConfig::load(path) {
        Ok(config) => {
            info!(
                "📄 Loaded {} categories from {path}",
                config.categories.len()
            );
            config
        }
        Err(e) => {
            if std::path::Path::new(path).exists() {
                error!("❌ Failed to load categories from {path}: {e}");
            } else {
                info!("📄 No categories file at {path} - using built-in categories");
            }
            CategoryConfig::default()
        }
    };
    Ok(CategoryClassifier::new(config)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting reminder bot...");

    let classifier = load_classifier(&config.categories_config_path)?;

    // The gateway needs its own HTTP handle before the client exists
    let http = Arc::new(Http::new(&config.discord_token));
    let gateway = Arc::new(DiscordGateway::new(http));
    let service = Arc::new(ReminderService::new(
        gateway,
        Arc::new(SystemClock),
        classifier,
    )?);

    let handler = Handler {
        service: service.clone(),
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    let result = client.start().await;
    service.scheduler().shutdown().await;

    if let Err(why) = result {
        error!("Gateway connection failed: {why:?}");
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Network connectivity issues");
        error!("  - Discord API outage");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
