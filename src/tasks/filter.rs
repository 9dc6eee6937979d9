//! History filtering by a single field

use super::TaskError;
use crate::neo4j::models::HistoryNode;
use regex::{Regex, RegexBuilder};

/// One `field=value` criterion over history entries.
///
/// `"1"`/`"0"` select on completion; any other value is a case-insensitive
/// pattern matched against a text field.
#[derive(Debug, Clone)]
pub enum HistoryFilter {
    Workspace(Regex),
    Task(Regex),
    Priority(Regex),
    Complete(bool),
}

impl HistoryFilter {
    pub fn parse(field: &str, value: &str) -> Result<Self, TaskError> {
        let flag = match value {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        };

        match (field, flag) {
            ("complete", Some(b)) => Ok(HistoryFilter::Complete(b)),
            ("complete", None) | ("workspace" | "task" | "priority", Some(_)) => {
                Err(TaskError::KindMismatch {
                    field: field.to_string(),
                    value: value.to_string(),
                })
            }
            ("workspace", None) => Ok(HistoryFilter::Workspace(pattern(value)?)),
            ("task", None) => Ok(HistoryFilter::Task(pattern(value)?)),
            ("priority", None) => Ok(HistoryFilter::Priority(pattern(value)?)),
            _ => Err(TaskError::UnknownField(field.to_string())),
        }
    }

    pub fn matches(&self, entry: &HistoryNode) -> bool {
        match self {
            HistoryFilter::Workspace(re) => re.is_match(&entry.workspace),
            HistoryFilter::Task(re) => re.is_match(&entry.task),
            HistoryFilter::Priority(re) => re.is_match(&entry.priority),
            HistoryFilter::Complete(b) => entry.complete == *b,
        }
    }
}

fn pattern(value: &str) -> Result<Regex, TaskError> {
    Ok(RegexBuilder::new(value).case_insensitive(true).build()?)
}
