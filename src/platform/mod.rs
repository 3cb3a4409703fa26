//! Narrow seam between the command handlers and the chat platform.
//!
//! Handlers only ever talk to a [`Platform`]; the Discord client lives
//! behind [`discord::DiscordPlatform`].

pub mod discord;

use crate::utils::AppError;
use async_trait::async_trait;

/// Who invoked a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub display_name: String,
}

/// Where a reply goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Slash command invocation, answered through its interaction token.
    Interaction { id: u64, token: String },
    /// Text command, answered with a message in the channel.
    Channel { id: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only the invoking user sees it.
    Private,
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    Text(String),
    /// Titled list of (name, value) entries.
    Listing {
        title: String,
        entries: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub body: ReplyBody,
    pub visibility: Visibility,
}

impl Reply {
    pub fn private(text: impl Into<String>) -> Self {
        Self {
            body: ReplyBody::Text(text.into()),
            visibility: Visibility::Private,
        }
    }

    pub fn public(text: impl Into<String>) -> Self {
        Self {
            body: ReplyBody::Text(text.into()),
            visibility: Visibility::Public,
        }
    }

    pub fn listing(title: impl Into<String>, entries: Vec<(String, String)>) -> Self {
        Self {
            body: ReplyBody::Listing {
                title: title.into(),
                entries,
            },
            visibility: Visibility::Public,
        }
    }

    /// Plain-text rendering of the reply, for logs.
    pub fn render_text(&self) -> String {
        match &self.body {
            ReplyBody::Text(text) => text.clone(),
            ReplyBody::Listing { title, entries } => {
                let mut out = title.clone();
                for (name, value) in entries {
                    out.push('\n');
                    out.push_str(name);
                    out.push_str(": ");
                    out.push_str(value);
                }
                out
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOptionSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Longest value the platform will accept for this argument.
    pub max_length: u16,
}

/// A slash command as registered with the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Required string argument, if any.
    pub option: Option<CommandOptionSpec>,
}

#[async_trait]
pub trait Platform: Send + Sync {
    async fn send_response(&self, target: &ReplyTarget, reply: Reply) -> Result<(), AppError>;

    /// Returns how many commands the platform accepted.
    async fn register_commands(&self, commands: &[CommandSpec]) -> Result<usize, AppError>;

    async fn fetch_registered_commands(&self, scope: u64) -> Result<Vec<String>, AppError>;
}
