//! Task data structure and related functionality.
//!
//! This module defines the core `Task` struct, the listing order shared with the
//! store's `ORDER BY`, and the line-oriented batch-add text format.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A single to-do item as stored in the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub urgency: Urgency,
    pub duration: Duration,
    pub completed: bool,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

impl Task {
    /// Bucket rank of this task, see [`rank`].
    pub fn rank(&self) -> i64 {
        rank(self.urgency, self.duration)
    }

    pub fn attributes(&self) -> Attributes {
        Attributes {
            category: self.category,
            priority: self.priority,
            urgency: self.urgency,
            duration: self.duration,
        }
    }

    /// Ordering used for every list of tasks shown to the user.
    ///
    /// Rank ascending, incomplete before completed, newest first, then higher id first.
    pub fn listing_order(a: &Task, b: &Task) -> Ordering {
        a.rank()
            .cmp(&b.rank())
            .then(a.completed.cmp(&b.completed))
            .then(b.created_time.cmp(&a.created_time))
            .then(b.id.cmp(&a.id))
    }
}

/// Title and description of one entry in a batch insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub title: String,
    pub description: String,
}

impl BatchItem {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Parse batch-add text: one task per line, `title|description`, split on the first `|`.
///
/// Blank lines and lines whose title is blank are dropped.
pub fn parse_batch_text(text: &str) -> Vec<BatchItem> {
    text.lines()
        .filter_map(|line| {
            let (title, description) = match line.split_once('|') {
                Some((title, description)) => (title.trim(), description.trim()),
                None => (line.trim(), ""),
            };
            if title.is_empty() {
                None
            } else {
                Some(BatchItem::new(title, description))
            }
        })
        .collect()
}
