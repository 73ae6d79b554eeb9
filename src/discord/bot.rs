//! Discord bot setup and event handling.
//!
//! Translates gateway interactions into dispatcher invocations and owns
//! slash-command registration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serenity::async_trait;
use serenity::builder::{
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage,
};
use serenity::http::Http;
use serenity::model::application::{Command as ApplicationCommand, CommandInteraction, Interaction};
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::model::mention::Mentionable;
use serenity::prelude::*;

use tracing::{error, info, warn};

use crate::common::error::{GatewayError, GatewayResult};
use crate::config::DiscordConfig;
use crate::discord::commands::{self, BatchKind, ParsedCommand};
use crate::discord::dispatcher::{
    Command, CommandDispatcher, Followup, Invocation, Reply, Responder,
};

/// Discord event handler backing the bot.
pub struct LearnBot {
    dispatcher: Arc<CommandDispatcher>,
    /// Guild to register commands against; global registration when unset.
    guild_id: Option<u64>,
    /// Client used to fetch uploaded filter files.
    attachment_client: reqwest::Client,
    /// Registration is logged once even if the gateway reconnects.
    synced: AtomicBool,
}

impl LearnBot {
    pub fn new(dispatcher: Arc<CommandDispatcher>, guild_id: Option<u64>) -> Self {
        Self {
            dispatcher,
            guild_id,
            attachment_client: reqwest::Client::new(),
            synced: AtomicBool::new(false),
        }
    }

    /// Fetch the contents of an uploaded filter file.
    async fn fetch_attachment(&self, url: &str) -> reqwest::Result<String> {
        self.attachment_client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl EventHandler for LearnBot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Logged on as {}", ready.user.name);
        info!("Connected to {} guild(s)", ready.guilds.len());

        let registrations = commands::registrations();
        let result = match self.guild_id {
            Some(id) => {
                GuildId::new(id)
                    .set_commands(&ctx.http, registrations)
                    .await
            }
            None => ApplicationCommand::set_global_commands(&ctx.http, registrations).await,
        };

        match result {
            Ok(registered) => {
                if !self.synced.swap(true, Ordering::SeqCst) {
                    info!("Registered {} slash commands", registered.len());
                }
            }
            Err(e) => error!("Failed to register slash commands: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(interaction) = interaction else {
            return;
        };

        let Some(guild_id) = interaction.guild_id else {
            respond_private(
                &ctx.http,
                &interaction,
                "This command can only be used in a server.",
            )
            .await;
            return;
        };

        let Some(parsed) = commands::parse(&interaction) else {
            warn!("Unknown command interaction: {}", interaction.data.name);
            return;
        };

        let command = match parsed {
            ParsedCommand::Ready(command) => command,
            ParsedCommand::NeedsAttachment { kind, url } => {
                match self.fetch_attachment(&url).await {
                    Ok(contents) => match kind {
                        BatchKind::Add => Command::AddFilterBatch { contents },
                        BatchKind::Remove => Command::RemoveFilterBatch { contents },
                    },
                    Err(e) => {
                        warn!("Failed to fetch filter file attachment: {}", e);
                        respond_private(
                            &ctx.http,
                            &interaction,
                            "Could not read the attached file. Please try again.",
                        )
                        .await;
                        return;
                    }
                }
            }
        };

        let invoker_is_admin = interaction
            .member
            .as_ref()
            .and_then(|member| member.permissions)
            .map(|permissions| permissions.administrator())
            .unwrap_or(false);

        info!(
            "Slash command '{}' triggered by {} in guild {}",
            interaction.data.name, interaction.user.name, guild_id
        );

        let invocation = Invocation {
            guild_id: guild_id.get(),
            channel_id: interaction.channel_id.get(),
            user_mention: interaction.user.mention().to_string(),
            invoker_is_admin,
            command,
        };

        let responder = Box::new(InteractionResponder {
            http: ctx.http.clone(),
            interaction,
        });

        self.dispatcher.dispatch(invocation, responder).await;
    }
}

/// Send a one-off ephemeral reply outside the dispatcher flow.
async fn respond_private(http: &Http, interaction: &CommandInteraction, text: &str) {
    let message = CreateInteractionResponseMessage::new()
        .content(text)
        .ephemeral(true);
    if let Err(e) = interaction
        .create_response(http, CreateInteractionResponse::Message(message))
        .await
    {
        warn!("Failed to respond to interaction: {}", e);
    }
}

/// Responder bound to one slash-command interaction.
struct InteractionResponder {
    http: Arc<Http>,
    interaction: CommandInteraction,
}

#[async_trait]
impl Responder for InteractionResponder {
    async fn send_initial(self: Box<Self>, reply: Reply) -> GatewayResult<Box<dyn Followup>> {
        let mut message = CreateInteractionResponseMessage::new().content(reply.text);
        if reply.ephemeral {
            message = message.ephemeral(true);
        }

        self.interaction
            .create_response(&self.http, CreateInteractionResponse::Message(message))
            .await
            .map_err(GatewayError::RespondFailed)?;

        Ok(Box::new(InteractionFollowup {
            http: self.http,
            interaction: self.interaction,
        }))
    }
}

/// Follow-up handle for the deferred `learn` result.
struct InteractionFollowup {
    http: Arc<Http>,
    interaction: CommandInteraction,
}

#[async_trait]
impl Followup for InteractionFollowup {
    async fn send(self: Box<Self>, text: String) -> GatewayResult<()> {
        self.interaction
            .create_followup(
                &self.http,
                CreateInteractionResponseFollowup::new().content(text),
            )
            .await
            .map(|_| ())
            .map_err(GatewayError::RespondFailed)
    }
}

/// Build the serenity client with the bot's event handler attached.
pub async fn build_client(
    config: &DiscordConfig,
    dispatcher: Arc<CommandDispatcher>,
) -> serenity::Result<Client> {
    // Slash commands arrive without privileged intents; GUILDS keeps the
    // channel cache populated for name resolution.
    let intents = GatewayIntents::GUILDS;

    Client::builder(&config.token, intents)
        .event_handler(LearnBot::new(dispatcher, config.guild_id))
        .await
}
