// ==================== DISCORD ADAPTER ====================
// serenity handles the gateway session, auth and rendering.
// This file only translates between serenity types and the Platform seam.

use crate::{
    commands::{CommandHandlers, Invocation, IDENTIFIER_OPTION, TEXT_PREFIX},
    config::{Config, SyncScope},
    platform::{Caller, CommandSpec, Platform, Reply, ReplyBody, ReplyTarget, Visibility},
    utils::AppError,
};
use async_trait::async_trait;
use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, CreateMessage,
};
use serenity::client::{Client, Context, EventHandler};
use serenity::http::Http;
use serenity::model::application::{Command, CommandInteraction, CommandOptionType, Interaction};
use serenity::model::channel::Message;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::id::{ApplicationId, ChannelId, GuildId, InteractionId};
use std::num::NonZeroU64;
use std::sync::Arc;

const LISTING_COLOUR: u32 = 0x00ff00;

// Discord message limits; a message breaking any of them is rejected whole.
const MAX_EMBED_FIELDS: usize = 25;
const MAX_EMBEDS_PER_MESSAGE: usize = 10;
const MAX_MESSAGE_EMBED_CHARS: usize = 6000;
const MAX_FIELD_NAME_CHARS: usize = 256;
const MAX_FIELD_VALUE_CHARS: usize = 1024;

pub struct DiscordPlatform {
    http: Arc<Http>,
    guild_id: GuildId,
    sync: SyncScope,
}

impl DiscordPlatform {
    pub fn new(token: &str, guild_id: NonZeroU64, sync: SyncScope) -> Self {
        Self {
            http: Arc::new(Http::new(token)),
            guild_id: GuildId::new(guild_id.get()),
            sync,
        }
    }

    /// Command registration and lookup need the application id, which is
    /// only known once the gateway session is ready.
    pub fn bind_application(&self, application_id: ApplicationId) {
        self.http.set_application_id(application_id);
    }
}

#[async_trait]
impl Platform for DiscordPlatform {
    async fn send_response(&self, target: &ReplyTarget, reply: Reply) -> Result<(), AppError> {
        log::debug!("💬 Reply ({:?}): {}", reply.visibility, reply.render_text());

        match target {
            ReplyTarget::Interaction { id, token } => {
                let ephemeral = reply.visibility == Visibility::Private;
                let message = CreateInteractionResponseMessage::new().ephemeral(ephemeral);

                let (message, rest) = match reply.body {
                    ReplyBody::Text(text) => (message.content(text), Vec::new()),
                    ReplyBody::Listing { title, entries } => {
                        let mut pages = listing_pages(&title, &entries).into_iter();
                        let first = pages.next().unwrap_or_default();
                        (message.embeds(render_page(first)), pages.collect())
                    }
                };

                let response = CreateInteractionResponse::Message(message);
                self.http
                    .create_interaction_response(InteractionId::new(*id), token, &response, Vec::new())
                    .await?;

                // The interaction takes one response; further pages are follow-ups.
                for page in rest {
                    let followup = CreateInteractionResponseFollowup::new()
                        .ephemeral(ephemeral)
                        .embeds(render_page(page));
                    self.http
                        .create_followup_message(token, &followup, Vec::new())
                        .await?;
                }
            }
            ReplyTarget::Channel { id } => {
                // Channel messages are always visible to everyone.
                let channel = ChannelId::new(*id);
                match reply.body {
                    ReplyBody::Text(text) => {
                        channel
                            .send_message(&self.http, CreateMessage::new().content(text))
                            .await?;
                    }
                    ReplyBody::Listing { title, entries } => {
                        for page in listing_pages(&title, &entries) {
                            channel
                                .send_message(&self.http, CreateMessage::new().embeds(render_page(page)))
                                .await?;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn register_commands(&self, commands: &[CommandSpec]) -> Result<usize, AppError> {
        let builders: Vec<CreateCommand> = commands.iter().map(command_builder).collect();

        let registered = match self.sync {
            SyncScope::Guild => {
                log::info!("🏠 Synchronizing slash commands to guild {}", self.guild_id);
                self.guild_id.set_commands(&self.http, builders).await?
            }
            SyncScope::Global => {
                log::info!("🌍 Synchronizing global slash commands");
                Command::set_global_commands(&self.http, builders).await?
            }
        };

        Ok(registered.len())
    }

    async fn fetch_registered_commands(&self, scope: u64) -> Result<Vec<String>, AppError> {
        let guild = NonZeroU64::new(scope)
            .map(|id| GuildId::new(id.get()))
            .ok_or_else(|| AppError::Platform("Scope id must be non-zero".to_string()))?;

        let commands = guild.get_commands(&self.http).await?;
        Ok(commands.into_iter().map(|c| c.name).collect())
    }
}

fn command_builder(spec: &CommandSpec) -> CreateCommand {
    let command = CreateCommand::new(spec.name).description(spec.description);
    match spec.option {
        Some(option) => command.add_option(
            CreateCommandOption::new(CommandOptionType::String, option.name, option.description)
                .required(true)
                .max_length(option.max_length),
        ),
        None => command,
    }
}

/// Embed content before it is turned into a serenity builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct EmbedPart {
    title: Option<String>,
    fields: Vec<(String, String)>,
}

/// Embeds for one message.
type ListingPage = Vec<EmbedPart>;

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push('…');
    out
}

/// Name/value as shown in the embed, cut to the field limits. Stored
/// data is never touched; older entries may predate the option limit.
fn listing_field(name: &str, value: &str) -> (String, String) {
    let name = if name.is_empty() { "\u{200b}" } else { name };
    let value = format!("`{}`", truncate_chars(value, MAX_FIELD_VALUE_CHARS - 2));
    (truncate_chars(name, MAX_FIELD_NAME_CHARS), value)
}

/// Splits a listing over as many messages as needed. Every entry lands in
/// exactly one field; the title goes on the first embed only.
fn listing_pages(title: &str, entries: &[(String, String)]) -> Vec<ListingPage> {
    let title = truncate_chars(title, MAX_FIELD_NAME_CHARS);
    let mut pages = Vec::new();
    let mut page_chars = title.chars().count();
    let mut page: ListingPage = vec![EmbedPart {
        title: Some(title),
        fields: Vec::new(),
    }];

    for (name, value) in entries {
        let field = listing_field(name, value);
        let cost = field.0.chars().count() + field.1.chars().count();

        let embed_full = page.last().map_or(true, |e| e.fields.len() >= MAX_EMBED_FIELDS);
        let page_full = embed_full && page.len() >= MAX_EMBEDS_PER_MESSAGE;

        if page_chars + cost > MAX_MESSAGE_EMBED_CHARS || page_full {
            pages.push(std::mem::take(&mut page));
            page.push(EmbedPart::default());
            page_chars = 0;
        } else if embed_full {
            page.push(EmbedPart::default());
        }

        if let Some(embed) = page.last_mut() {
            embed.fields.push(field);
        }
        page_chars += cost;
    }

    pages.push(page);
    pages
}

fn render_page(page: ListingPage) -> Vec<CreateEmbed> {
    page.into_iter()
        .map(|part| {
            let embed = CreateEmbed::new().colour(LISTING_COLOUR);
            let embed = match part.title {
                Some(title) => embed.title(title),
                None => embed,
            };
            part.fields
                .into_iter()
                .fold(embed, |embed, (name, value)| embed.field(name, value, false))
        })
        .collect()
}

fn interaction_caller(command: &CommandInteraction) -> Caller {
    let display_name = match &command.member {
        Some(member) => member.display_name().to_string(),
        None => command.user.display_name().to_string(),
    };

    Caller {
        user_id: command.user.id.to_string(),
        display_name,
    }
}

pub struct DiscordEventHandler {
    handlers: Arc<CommandHandlers<DiscordPlatform>>,
}

impl DiscordEventHandler {
    pub fn new(handlers: Arc<CommandHandlers<DiscordPlatform>>) -> Self {
        Self { handlers }
    }
}

#[async_trait]
impl EventHandler for DiscordEventHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        log::info!("✅ Logged in as {}", ready.user.name);

        self.handlers.platform().bind_application(ready.application.id);
        self.handlers.register_command_set().await;
    }

    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        let identifier = command
            .data
            .options
            .iter()
            .find(|o| o.name == IDENTIFIER_OPTION)
            .and_then(|o| o.value.as_str());

        let Some(invocation) = Invocation::from_slash(&command.data.name, identifier) else {
            log::warn!("⚠️  Ignoring unknown slash command /{}", command.data.name);
            return;
        };

        let caller = interaction_caller(&command);
        let target = ReplyTarget::Interaction {
            id: command.id.get(),
            token: command.token.clone(),
        };

        if let Err(e) = self.handlers.dispatch(invocation, &caller, &target).await {
            log::error!("❌ /{} failed for {}: {}", command.data.name, caller.user_id, e);
        }
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let Some(invocation) = Invocation::from_text(&msg.content, TEXT_PREFIX) else {
            return;
        };

        let caller = Caller {
            user_id: msg.author.id.to_string(),
            display_name: msg.author.display_name().to_string(),
        };
        let target = ReplyTarget::Channel {
            id: msg.channel_id.get(),
        };

        if let Err(e) = self.handlers.dispatch(invocation, &caller, &target).await {
            log::error!("❌ Text command failed for {}: {}", caller.user_id, e);
        }
    }
}

/// Connects to the gateway and runs until the session ends.
pub async fn run(
    config: &Config,
    handlers: Arc<CommandHandlers<DiscordPlatform>>,
) -> Result<(), AppError> {
    let mut intents = GatewayIntents::non_privileged();
    if config.message_content_intent {
        intents |= GatewayIntents::MESSAGE_CONTENT;
    }

    let mut client = Client::builder(&config.token, intents)
        .event_handler(DiscordEventHandler::new(handlers))
        .await?;

    log::info!("🔌 Connecting to Discord gateway...");
    client.start().await?;

    Ok(())
}
