//! Task manager: daily task board and its archived history

use super::filter::HistoryFilter;
use super::TaskError;
use crate::neo4j::models::{HistoryNode, TaskNode};
use crate::neo4j::traits::DocumentStore;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Number of entries returned when the full history was not requested
pub const RECENT_HISTORY_LIMIT: usize = 10;

/// Upper bound of `storedTime`: a task lives on the board for one day
pub const MAX_STORED_TIME: i64 = 24 * 60 * 60;

/// Request to create a task
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub workspace: String,
    pub task: String,
    pub desc: String,
    #[serde(default)]
    pub stored_time: i64,
    pub priority: String,
    #[serde(default)]
    pub complete: bool,
}

/// Request to update time spent and completion
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub stored_time: i64,
    pub complete: bool,
}

/// How much history to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAmount {
    All,
    Recent,
}

impl HistoryAmount {
    /// `"all"` selects everything; anything else, or nothing, the recent entries.
    pub fn from_query(amount: Option<&str>) -> Self {
        match amount {
            Some("all") => HistoryAmount::All,
            _ => HistoryAmount::Recent,
        }
    }
}

fn check_stored_time(seconds: i64) -> Result<i64, TaskError> {
    if (0..=MAX_STORED_TIME).contains(&seconds) {
        Ok(seconds)
    } else {
        Err(TaskError::StoredTimeOutOfRange)
    }
}

fn required(field: &'static str, value: &str) -> Result<String, TaskError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(TaskError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

pub struct TaskManager {
    store: Arc<dyn DocumentStore>,
}

impl TaskManager {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create_task(&self, author: Uuid, req: NewTask) -> Result<TaskNode, TaskError> {
        check_stored_time(req.stored_time)?;
        let now = Utc::now();
        let task = TaskNode {
            id: Uuid::new_v4(),
            author,
            workspace: required("workspace", &req.workspace)?,
            task: required("task", &req.task)?,
            desc: required("desc", &req.desc)?,
            stored_time: req.stored_time,
            priority: required("priority", &req.priority)?,
            complete: req.complete,
            created_at: now,
            updated_at: now,
        };
        self.store.create_task(&task).await?;
        tracing::debug!(author = %author, task_id = %task.id, "Created task");
        Ok(task)
    }

    /// Tasks of the author, newest first
    pub async fn list_tasks(&self, author: Uuid) -> Result<Vec<TaskNode>, TaskError> {
        Ok(self.store.list_tasks(author).await?)
    }

    pub async fn update_task(
        &self,
        author: Uuid,
        id: Uuid,
        update: TaskUpdate,
    ) -> Result<TaskNode, TaskError> {
        check_stored_time(update.stored_time)?;
        self.store
            .update_task(author, id, update.stored_time, update.complete, Utc::now())
            .await?
            .ok_or(TaskError::NotFound)
    }

    pub async fn delete_task(&self, author: Uuid, id: Uuid) -> Result<TaskNode, TaskError> {
        self.store
            .delete_task(author, id)
            .await?
            .ok_or(TaskError::NotFound)
    }

    /// Archive today's board and return the whole history
    pub async fn finish_day(&self, author: Uuid) -> Result<Vec<HistoryNode>, TaskError> {
        let archived = self.store.archive_tasks(author).await?;
        tracing::info!(author = %author, archived, "Day finished");
        Ok(self.store.list_history(author).await?)
    }

    pub async fn history(
        &self,
        author: Uuid,
        amount: HistoryAmount,
    ) -> Result<Vec<HistoryNode>, TaskError> {
        let mut entries = self.store.list_history(author).await?;
        if amount == HistoryAmount::Recent {
            entries.truncate(RECENT_HISTORY_LIMIT);
        }
        Ok(entries)
    }

    /// History entries matching a single criterion, newest first
    pub async fn filter_history(
        &self,
        author: Uuid,
        filter: &HistoryFilter,
    ) -> Result<Vec<HistoryNode>, TaskError> {
        let entries = self.store.list_history(author).await?;
        Ok(entries.into_iter().filter(|e| filter.matches(e)).collect())
    }
}
