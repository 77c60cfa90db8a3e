//! Feedback events recorded on every suggestion interaction.
//!
//! The log is append-only and owned by the caller. Every action tag belongs to
//! exactly one of three classes (positive, skip, snooze); the extractor only
//! ever looks at the class and, for skips, the reason.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::category::TaskCategory;
use crate::time::TimeBucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    StartedImmediately,
    ViewedDetails,
    NotRelevant,
    WrongTime,
    NeedsFocus,
    #[serde(rename = "snooze_1h")]
    Snooze1Hour,
    SnoozeEvening,
    SnoozeTomorrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionClass {
    Positive,
    Skip,
    Snooze,
}

/// Why a suggestion was skipped. Declaration order is the tie-break order
/// for skip hotspots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    WrongTime,
    NeedsFocus,
    NotRelevant,
}

impl SkipReason {
    /// Phrase used in prompt context lines.
    pub fn phrase(self) -> &'static str {
        match self {
            SkipReason::WrongTime => "wrong time",
            SkipReason::NeedsFocus => "needs focus",
            SkipReason::NotRelevant => "not relevant",
        }
    }
}

impl FeedbackAction {
    pub const ALL: [FeedbackAction; 8] = [
        FeedbackAction::StartedImmediately,
        FeedbackAction::ViewedDetails,
        FeedbackAction::NotRelevant,
        FeedbackAction::WrongTime,
        FeedbackAction::NeedsFocus,
        FeedbackAction::Snooze1Hour,
        FeedbackAction::SnoozeEvening,
        FeedbackAction::SnoozeTomorrow,
    ];

    pub fn class(self) -> ActionClass {
        match self {
            FeedbackAction::StartedImmediately | FeedbackAction::ViewedDetails => ActionClass::Positive,
            FeedbackAction::NotRelevant | FeedbackAction::WrongTime | FeedbackAction::NeedsFocus => {
                ActionClass::Skip
            }
            FeedbackAction::Snooze1Hour | FeedbackAction::SnoozeEvening | FeedbackAction::SnoozeTomorrow => {
                ActionClass::Snooze
            }
        }
    }

    pub fn skip_reason(self) -> Option<SkipReason> {
        match self {
            FeedbackAction::NotRelevant => Some(SkipReason::NotRelevant),
            FeedbackAction::WrongTime => Some(SkipReason::WrongTime),
            FeedbackAction::NeedsFocus => Some(SkipReason::NeedsFocus),
            _ => None,
        }
    }

    /// Wire tag, as used in the log and on the command line.
    pub fn tag(self) -> &'static str {
        match self {
            FeedbackAction::StartedImmediately => "started_immediately",
            FeedbackAction::ViewedDetails => "viewed_details",
            FeedbackAction::NotRelevant => "not_relevant",
            FeedbackAction::WrongTime => "wrong_time",
            FeedbackAction::NeedsFocus => "needs_focus",
            FeedbackAction::Snooze1Hour => "snooze_1h",
            FeedbackAction::SnoozeEvening => "snooze_evening",
            FeedbackAction::SnoozeTomorrow => "snooze_tomorrow",
        }
    }
}

impl FromStr for FeedbackAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.tag() == norm)
            .ok_or_else(|| anyhow::anyhow!("unknown feedback action: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub task_id: String,
    pub action: FeedbackAction,
    pub timestamp: DateTime<Utc>,
    /// Score the task had when it was suggested.
    pub original_score: f64,
    pub category: TaskCategory,
    /// Local hour-of-day, 0..=23.
    pub hour: u8,
}

impl FeedbackEvent {
    pub fn new(
        task_id: impl Into<String>,
        action: FeedbackAction,
        category: TaskCategory,
        hour: u8,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            action,
            timestamp,
            original_score: 0.0,
            category,
            hour,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.original_score = score;
        self
    }

    pub fn bucket(&self) -> TimeBucket {
        TimeBucket::from_hour(u32::from(self.hour))
    }

    pub fn class(&self) -> ActionClass {
        self.action.class()
    }
}
