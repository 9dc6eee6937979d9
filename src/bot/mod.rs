//! Quiz bot: scripted chat plus questions remembered per role

pub mod manager;
pub mod script;

pub use manager::{BotError, BotManager};
pub use script::{BotCommand, BotReply};
