//! Task model consumed by the scorer and the suggestion pipeline.
//!
//! Tasks are owned by whatever stores them; the engine only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::TaskCategory;

/// Explicit priority set by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
    Urgent,
}

impl PriorityLevel {
    pub fn name(self) -> &'static str {
        match self {
            PriorityLevel::None => "none",
            PriorityLevel::Low => "low",
            PriorityLevel::Medium => "medium",
            PriorityLevel::High => "high",
            PriorityLevel::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,

    /// Optional due date (UTC).
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,

    #[serde(default)]
    pub priority: PriorityLevel,

    pub created_at: DateTime<Utc>,

    /// Seconds.
    #[serde(default)]
    pub estimated_duration: Option<i64>,

    #[serde(default)]
    pub category: TaskCategory,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            due: None,
            priority: PriorityLevel::None,
            created_at,
            estimated_duration: None,
            category: TaskCategory::Uncategorized,
        }
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }

    pub fn with_priority(mut self, priority: PriorityLevel) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_duration_secs(mut self, seconds: i64) -> Self {
        self.estimated_duration = Some(seconds);
        self
    }

    pub fn with_duration_minutes(self, minutes: i64) -> Self {
        self.with_duration_secs(minutes * 60)
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }
}
