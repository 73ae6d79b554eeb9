//! Slash command definitions and option extraction.

use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::{CommandInteraction, CommandOptionType, ResolvedValue};

use crate::discord::dispatcher::Command;

pub const LEARN: &str = "learn";
pub const ADD_FILTER: &str = "addfilter";
pub const REMOVE_FILTER: &str = "removefilter";
pub const ADD_FILTER_FILE: &str = "addfilterfile";
pub const REMOVE_FILTER_FILE: &str = "removefilterfile";
pub const VIEW_FILTER: &str = "viewfilter";

/// Which batch operation an uploaded file drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Add,
    Remove,
}

/// A recognized invocation, possibly still waiting on its attachment body.
#[derive(Debug, Clone)]
pub enum ParsedCommand {
    Ready(Command),
    /// Batch commands carry their words in an uploaded file; the caller
    /// fetches `url` and builds the final command from its contents.
    NeedsAttachment { kind: BatchKind, url: String },
}

/// The command set registered with Discord.
pub fn registrations() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(LEARN)
            .description("Request to learn a course")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "course",
                    "Description of the course to generate",
                )
                .required(true),
            ),
        CreateCommand::new(ADD_FILTER)
            .description("Add a word to the filter list for this server")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "word", "Word to filter")
                    .required(true),
            ),
        CreateCommand::new(REMOVE_FILTER)
            .description("Remove a word from the filter list for this server")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "word", "Word to unfilter")
                    .required(true),
            ),
        CreateCommand::new(ADD_FILTER_FILE)
            .description("Add comma-separated words from a text file to the filter list")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Attachment,
                    "file",
                    "Text file with comma-separated words",
                )
                .required(true),
            ),
        CreateCommand::new(REMOVE_FILTER_FILE)
            .description("Remove comma-separated words from a text file from the filter list")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Attachment,
                    "file",
                    "Text file with comma-separated words",
                )
                .required(true),
            ),
        CreateCommand::new(VIEW_FILTER)
            .description("View the current filter list for this server"),
    ]
}

/// Map an interaction to a known command, extracting its options.
///
/// Returns `None` for unknown command names or missing required options
/// (neither occurs for commands registered by this process).
pub fn parse(interaction: &CommandInteraction) -> Option<ParsedCommand> {
    match interaction.data.name.as_str() {
        LEARN => Some(ParsedCommand::Ready(Command::Learn {
            course: str_option(interaction, "course")?,
        })),
        ADD_FILTER => Some(ParsedCommand::Ready(Command::AddFilter {
            word: str_option(interaction, "word")?,
        })),
        REMOVE_FILTER => Some(ParsedCommand::Ready(Command::RemoveFilter {
            word: str_option(interaction, "word")?,
        })),
        ADD_FILTER_FILE => Some(ParsedCommand::NeedsAttachment {
            kind: BatchKind::Add,
            url: attachment_url(interaction, "file")?,
        }),
        REMOVE_FILTER_FILE => Some(ParsedCommand::NeedsAttachment {
            kind: BatchKind::Remove,
            url: attachment_url(interaction, "file")?,
        }),
        VIEW_FILTER => Some(ParsedCommand::Ready(Command::ViewFilter)),
        _ => None,
    }
}

fn str_option(interaction: &CommandInteraction, name: &str) -> Option<String> {
    interaction
        .data
        .options()
        .into_iter()
        .find(|option| option.name == name)
        .and_then(|option| match option.value {
            ResolvedValue::String(value) => Some(value.to_string()),
            _ => None,
        })
}

fn attachment_url(interaction: &CommandInteraction, name: &str) -> Option<String> {
    interaction
        .data
        .options()
        .into_iter()
        .find(|option| option.name == name)
        .and_then(|option| match option.value {
            ResolvedValue::Attachment(attachment) => Some(attachment.url.clone()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_all_commands() {
        let names: Vec<String> = registrations()
            .iter()
            .map(|command| {
                // CreateCommand does not expose its name; round-trip through
                // the serialized form Discord receives.
                let value = serde_json::to_value(command).unwrap();
                value["name"].as_str().unwrap().to_string()
            })
            .collect();

        assert_eq!(
            names,
            vec![
                LEARN,
                ADD_FILTER,
                REMOVE_FILTER,
                ADD_FILTER_FILE,
                REMOVE_FILTER_FILE,
                VIEW_FILTER,
            ]
        );
    }
}
