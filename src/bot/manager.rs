//! Bot manager: roles and remembered questions per user

use super::script::{scripted_reply, BotCommand, BotReply, NOT_FOUND, THANKS};
use crate::neo4j::models::{BotMessageNode, BotRoleNode};
use crate::neo4j::traits::DocumentStore;
use regex::RegexBuilder;
use std::sync::Arc;
use uuid::Uuid;

/// Errors raised by bot operations
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("role must not be empty")]
    EmptyRole,

    #[error("Error while removing bot's role")]
    RoleNotFound,

    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub struct BotManager {
    store: Arc<dyn DocumentStore>,
}

impl BotManager {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Answer one chat line for `(user, role)`.
    pub async fn message(&self, user: Uuid, cmd: &str, role: &str) -> Result<BotReply, BotError> {
        let command = BotCommand::parse(cmd);
        if let Some(reply) = scripted_reply(&command) {
            return Ok(reply);
        }

        match command {
            BotCommand::Remember(question) => {
                let message = BotMessageNode {
                    id: Uuid::new_v4(),
                    user,
                    msg: question,
                    role: role.to_string(),
                };
                self.store.create_bot_message(&message).await?;
                tracing::debug!(user = %user, role = %role, "Stored bot question");
                Ok(BotReply::new(THANKS))
            }
            BotCommand::Ask => Ok(match self.store.random_bot_message(user, role).await? {
                Some(message) => BotReply::new(message.msg),
                None => BotReply::new(NOT_FOUND),
            }),
            _ => Ok(BotReply::new(super::script::FALLBACK)),
        }
    }

    pub async fn create_role(&self, user: Uuid, role: &str) -> Result<BotRoleNode, BotError> {
        let role = role.trim();
        if role.is_empty() {
            return Err(BotError::EmptyRole);
        }
        let node = BotRoleNode {
            id: Uuid::new_v4(),
            user,
            role: role.to_string(),
        };
        self.store.create_bot_role(&node).await?;
        Ok(node)
    }

    pub async fn list_roles(&self, user: Uuid) -> Result<Vec<BotRoleNode>, BotError> {
        Ok(self.store.list_bot_roles(user).await?)
    }

    /// Roles whose name matches `pattern`, ignoring case
    pub async fn search_roles(
        &self,
        user: Uuid,
        pattern: &str,
    ) -> Result<Vec<BotRoleNode>, BotError> {
        let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        let roles = self.store.list_bot_roles(user).await?;
        Ok(roles.into_iter().filter(|r| re.is_match(&r.role)).collect())
    }

    /// Remove a role and the questions stored under it
    pub async fn remove_role(&self, user: Uuid, id: Uuid) -> Result<BotRoleNode, BotError> {
        self.store
            .delete_bot_role(user, id)
            .await?
            .ok_or(BotError::RoleNotFound)
    }
}
