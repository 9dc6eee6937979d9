//! Progress statistics computed from a user's history
//!
//! Everything here is a pure function over already-loaded records; the HTTP
//! layer does the loading.

use crate::neo4j::models::{HistoryNode, UserNode};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Number of workspaces reported by [`top_workspaces`]
pub const TOP_WORKSPACES_LIMIT: usize = 10;

/// Completion percentage of one calendar day
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyResult {
    /// `MM/DD`
    pub date: String,
    pub value: f64,
}

/// Journey progress of a user. All fields are `null` without a journey or history.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MyStats {
    /// Share of the journey's days already used, in percent
    pub remaining_days: Option<f64>,
    /// Share of the hour budget already spent, in percent
    pub used_time: Option<f64>,
    /// Hours per remaining day needed to use up the budget
    pub per_day: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkspaceScore {
    pub name: String,
    pub value: f64,
}

fn percent(part: usize, total: usize) -> f64 {
    part as f64 / total as f64 * 100.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group history by UTC day and compute the completion rate of each.
///
/// Days appear in the order they are first met in `history`.
pub fn daily_results(history: &[HistoryNode]) -> Vec<DailyResult> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for entry in history {
        let date = entry.created_at.format("%m/%d").to_string();
        let slot = counts.entry(date.clone()).or_insert_with(|| {
            order.push(date);
            (0, 0)
        });
        slot.1 += 1;
        if entry.complete {
            slot.0 += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|date| {
            let (done, total) = counts.get(&date).copied()?;
            Some(DailyResult {
                value: percent(done, total),
                date,
            })
        })
        .collect()
}

/// Parse a journey end date given either as RFC 3339 or as `YYYY-MM-DD`.
pub fn parse_journey_end(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

/// Journey progress as of `today`.
///
/// The journey starts on the day of the oldest history entry and ends on the
/// user's `journey_duration` date.
pub fn my_stats(user: &UserNode, history: &[HistoryNode], today: NaiveDate) -> MyStats {
    let Some(raw_end) = user.journey_duration.as_deref() else {
        return MyStats::default();
    };
    if user.allocated_time <= 0.0 || history.is_empty() {
        return MyStats::default();
    }
    let Some(end) = parse_journey_end(raw_end) else {
        tracing::warn!(user_id = %user.id, journey = %raw_end, "Unparseable journey end date");
        return MyStats::default();
    };
    let Some(start) = history.iter().map(|h| h.created_at.date_naive()).min() else {
        return MyStats::default();
    };

    let journey_days = (end - start).num_days();
    let days_left = (end - today).num_days();
    let used_days = journey_days - days_left;

    let total_seconds: f64 = history.iter().map(|h| h.stored_time as f64).sum();
    let used_hours = total_seconds / 3600.0;

    MyStats {
        remaining_days: (journey_days != 0)
            .then(|| round2(used_days as f64 / journey_days as f64 * 100.0)),
        used_time: Some(used_hours / user.allocated_time * 100.0),
        per_day: (days_left > 0).then(|| (user.allocated_time - used_hours) / days_left as f64),
    }
}

/// Rank workspaces by time spent, task count and completion rate.
pub fn top_workspaces(history: &[HistoryNode]) -> Vec<WorkspaceScore> {
    struct Tally {
        stored: f64,
        tasks: usize,
        done: usize,
    }

    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for entry in history {
        let tally = tallies.entry(entry.workspace.as_str()).or_insert_with(|| {
            order.push(entry.workspace.as_str());
            Tally {
                stored: 0.0,
                tasks: 0,
                done: 0,
            }
        });
        tally.stored += entry.stored_time as f64;
        tally.tasks += 1;
        if entry.complete {
            tally.done += 1;
        }
    }

    let mut scores: Vec<WorkspaceScore> = order
        .into_iter()
        .filter_map(|name| {
            let t = tallies.get(name)?;
            let value = (t.stored * 0.035
                + t.tasks as f64 * 0.04
                + percent(t.done, t.tasks) * 0.025)
                / 15.0;
            Some(WorkspaceScore {
                name: name.to_string(),
                value,
            })
        })
        .collect();

    scores.sort_by(|a, b| b.value.total_cmp(&a.value));
    scores.truncate(TOP_WORKSPACES_LIMIT);
    scores
}
