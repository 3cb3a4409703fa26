use crate::platform::{CommandOptionSpec, CommandSpec};

pub const ADD_ID: &str = "add_id";
pub const LIST_IDS: &str = "list_ids";
pub const REMOVE_ID: &str = "remove_id";
pub const IDENTIFIER_OPTION: &str = "identifier";
/// Keeps every stored ID inside a single listing field.
pub const MAX_IDENTIFIER_LEN: u16 = 1000;

/// Name of the text command, used as `<prefix>debug`.
pub const DEBUG: &str = "debug";
pub const TEXT_PREFIX: &str = "!";

/// Slash commands registered on startup.
pub const SLASH_COMMANDS: [CommandSpec; 3] = [
    CommandSpec {
        name: ADD_ID,
        description: "Add your ID to the list.",
        option: Some(CommandOptionSpec {
            name: IDENTIFIER_OPTION,
            description: "The ID to save",
            max_length: MAX_IDENTIFIER_LEN,
        }),
    },
    CommandSpec {
        name: LIST_IDS,
        description: "Show the list of all registered IDs.",
        option: None,
    },
    CommandSpec {
        name: REMOVE_ID,
        description: "Remove your ID from the list.",
        option: None,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    AddId { identifier: String },
    ListIds,
    RemoveId,
    Debug,
}

impl Invocation {
    /// Maps a slash command name and its `identifier` argument.
    pub fn from_slash(name: &str, identifier: Option<&str>) -> Option<Self> {
        match name {
            ADD_ID => identifier.map(|id| Invocation::AddId {
                identifier: id.to_string(),
            }),
            LIST_IDS => Some(Invocation::ListIds),
            REMOVE_ID => Some(Invocation::RemoveId),
            _ => None,
        }
    }

    /// Maps a chat message such as `!debug`.
    pub fn from_text(content: &str, prefix: &str) -> Option<Self> {
        let command = content.trim().strip_prefix(prefix)?;
        match command.split_whitespace().next() {
            Some(DEBUG) => Some(Invocation::Debug),
            _ => None,
        }
    }
}
