//! Enumerations and field types for task categorisation.
//!
//! This module defines the structured attributes attached to every task (category,
//! priority, urgency and duration) together with their storage codes, display labels
//! and the urgency/duration rank that drives list ordering.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Life area a task belongs to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[default]
    Uncategorized,
    Work,
    Personal,
    Study,
    Family,
    Health,
    Entertainment,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Uncategorized,
        Category::Work,
        Category::Personal,
        Category::Study,
        Category::Family,
        Category::Health,
        Category::Entertainment,
    ];

    /// Label written to the `category` column.
    pub fn label(self) -> &'static str {
        match self {
            Category::Uncategorized => "Uncategorized",
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Study => "Study",
            Category::Family => "Family",
            Category::Health => "Health",
            Category::Entertainment => "Entertainment",
        }
    }

    /// Parse a stored label, falling back to `Uncategorized` for anything unknown.
    pub fn from_label(s: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .unwrap_or_default()
    }
}

/// Importance of a task.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn code(self) -> i64 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Priority::Medium,
            3 => Priority::High,
            _ => Priority::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

/// Time pressure of a task. Urgent work sorts first.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    #[default]
    NotUrgent,
    Normal,
    Urgent,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::NotUrgent, Urgency::Normal, Urgency::Urgent];

    pub fn code(self) -> i64 {
        match self {
            Urgency::NotUrgent => 1,
            Urgency::Normal => 2,
            Urgency::Urgent => 3,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Urgency::Normal,
            3 => Urgency::Urgent,
            _ => Urgency::NotUrgent,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Urgency::NotUrgent => "Not Urgent",
            Urgency::Normal => "Normal",
            Urgency::Urgent => "Urgent",
        }
    }
}

/// Expected effort horizon of a task. Short work sorts first within an urgency.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Duration {
    ShortTerm,
    #[default]
    MidTerm,
    LongTerm,
}

impl Duration {
    pub const ALL: [Duration; 3] = [Duration::ShortTerm, Duration::MidTerm, Duration::LongTerm];

    pub fn code(self) -> i64 {
        match self {
            Duration::ShortTerm => 1,
            Duration::MidTerm => 2,
            Duration::LongTerm => 3,
        }
    }

    /// Unknown codes fall back to `MidTerm`, the column default.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Duration::ShortTerm,
            3 => Duration::LongTerm,
            _ => Duration::MidTerm,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Duration::ShortTerm => "Short Term",
            Duration::MidTerm => "Mid Term",
            Duration::LongTerm => "Long Term",
        }
    }
}

/// Bucket rank of an urgency/duration pair, 0 (urgent, short) through 8 (not urgent, long).
///
/// Must stay in step with `RANK_SQL` in `db.rs`.
pub fn rank(urgency: Urgency, duration: Duration) -> i64 {
    (3 - urgency.code()) * 3 + (duration.code() - 1)
}

/// Shared attribute set applied to every row of a batch insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub category: Category,
    pub priority: Priority,
    pub urgency: Urgency,
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_buckets_in_order() {
        let mut ranks = Vec::new();
        for u in [Urgency::Urgent, Urgency::Normal, Urgency::NotUrgent] {
            for d in Duration::ALL {
                ranks.push(rank(u, d));
            }
        }
        assert_eq!(ranks, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_codes_round_trip_and_fall_back() {
        for p in Priority::ALL {
            assert_eq!(Priority::from_code(p.code()), p);
        }
        assert_eq!(Urgency::from_code(0), Urgency::NotUrgent);
        assert_eq!(Duration::from_code(42), Duration::MidTerm);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::from_label("work"), Category::Work);
        assert_eq!(Category::from_label(" Health "), Category::Health);
        assert_eq!(Category::from_label("Gardening"), Category::Uncategorized);
        assert_eq!(Category::default().label(), "Uncategorized");
    }

    #[test]
    fn test_defaults_match_column_defaults() {
        let attrs = Attributes::default();
        assert_eq!(attrs.category, Category::Uncategorized);
        assert_eq!(attrs.priority.code(), 1);
        assert_eq!(attrs.urgency.code(), 1);
        assert_eq!(attrs.duration.code(), 2);
    }
}
