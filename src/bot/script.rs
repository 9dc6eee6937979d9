//! Scripted bot replies and command parsing

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

pub const GREETING: &str =
    "Hi, I'm Matthew, I'm here to check our knowledge. For more instructions, please type 'help'.";
pub const THANKS: &str = "Thanks for adding new question into my memory.";
pub const FAREWELL: &str = "I guess you are tired, let's finish...";
pub const NOT_FOUND: &str = "Question was not found...";
pub const FALLBACK: &str = "Sorry, I can not response...";

/// Commands listed by `help`: (command, description)
pub const HELP_ENTRIES: &[(&str, &str)] = &[
    (
        "new: [new info]",
        "Adds new information to your Matthew's memory.",
    ),
    ("question", "Returns ramdomly selected question."),
    (
        "finish",
        "Concludes interview mode after assessing your knowledge and clean the chat.",
    ),
];

static NEW_QUESTION: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^new:\s*(.+)$").ok());

/// A chat line authored by the bot
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BotReply {
    pub author: &'static str,
    pub msg: String,
}

impl BotReply {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            author: "bot",
            msg: msg.into(),
        }
    }
}

/// What a raw chat line asks the bot to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Greet,
    Help,
    Finish,
    /// `new: <question>`
    Remember(String),
    /// `question`
    Ask,
    Unknown,
}

impl BotCommand {
    pub fn parse(cmd: &str) -> Self {
        match cmd {
            "" => return BotCommand::Greet,
            "help" => return BotCommand::Help,
            "finish" => return BotCommand::Finish,
            "question" => return BotCommand::Ask,
            _ => {}
        }

        let question = NEW_QUESTION
            .as_ref()
            .and_then(|re| re.captures(cmd))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|q| !q.is_empty());

        match question {
            Some(q) => BotCommand::Remember(q),
            None => BotCommand::Unknown,
        }
    }
}

/// The `help` text: one entry per command, separated by blank lines
pub fn help_text() -> String {
    HELP_ENTRIES
        .iter()
        .map(|(command, describe)| format!("#$%Command ==> {}#$%Description ==> {}", command, describe))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Reply for commands that need no stored data
pub fn scripted_reply(command: &BotCommand) -> Option<BotReply> {
    match command {
        BotCommand::Greet => Some(BotReply::new(GREETING)),
        BotCommand::Help => Some(BotReply::new(help_text())),
        BotCommand::Finish => Some(BotReply::new(FAREWELL)),
        BotCommand::Unknown => Some(BotReply::new(FALLBACK)),
        BotCommand::Remember(_) | BotCommand::Ask => None,
    }
}
