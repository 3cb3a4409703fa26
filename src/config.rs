use crate::utils::AppError;
use std::env;
use std::num::NonZeroU64;
use std::path::PathBuf;

const DEFAULT_DATA_FILE: &str = "embark_data.json";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Where slash commands get registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncScope {
    /// Only the configured guild; changes show up immediately.
    Guild,
    Global,
}

/// Process configuration, built once at startup and passed down.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub guild_id: NonZeroU64,
    pub data_file: PathBuf,
    pub command_sync: SyncScope,
    /// Privileged intent; must also be enabled in the developer portal.
    /// Without it, text commands only reach the bot in DMs and mentions.
    pub message_content_intent: bool,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DISCORD_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Config("DISCORD_BOT_TOKEN is not set".to_string()))?;

        let raw_guild = lookup("DISCORD_GUILD_ID")
            .ok_or_else(|| AppError::Config("DISCORD_GUILD_ID is not set".to_string()))?;
        let guild_id = raw_guild.trim().parse::<NonZeroU64>().map_err(|_| {
            AppError::Config(format!("DISCORD_GUILD_ID must be a non-zero integer, got '{}'", raw_guild))
        })?;

        let data_file = lookup("DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let command_sync = match lookup("COMMAND_SYNC").as_deref().map(str::trim) {
            None | Some("") | Some("guild") => SyncScope::Guild,
            Some("global") => SyncScope::Global,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "COMMAND_SYNC must be 'guild' or 'global', got '{}'",
                    other
                )))
            }
        };

        let message_content_intent = match lookup("MESSAGE_CONTENT_INTENT").as_deref().map(str::trim) {
            None | Some("") => false,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(AppError::Config(format!(
                        "MESSAGE_CONTENT_INTENT must be a boolean, got '{}'",
                        raw
                    )))
                }
            },
        };

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT must be a port number, got '{}'", raw)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            token,
            guild_id,
            data_file,
            command_sync,
            message_content_intent,
            host,
            port,
        })
    }
}
