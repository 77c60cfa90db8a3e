//! Completion-pattern snapshot.
//!
//! The snapshot is owned and persisted outside the engine and updated each
//! time a task completes (`record_completion` returns the next version). The
//! signal extractor only ever borrows it.
//!
//! Per-slot counts are keyed by the composite string `"<categoryOrdinal>_<hour>"`
//! so the persisted form stays stable; `CompletionKey` is the typed view.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::category::TaskCategory;
use crate::time::TimeBucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompletionKey {
    pub category: TaskCategory,
    pub hour: u8,
}

impl CompletionKey {
    pub fn new(category: TaskCategory, hour: u8) -> Self {
        Self { category, hour }
    }

    pub fn bucket(&self) -> TimeBucket {
        TimeBucket::from_hour(u32::from(self.hour))
    }
}

impl fmt::Display for CompletionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category.ordinal(), self.hour)
    }
}

impl FromStr for CompletionKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ordinal, hour) = s
            .split_once('_')
            .ok_or_else(|| anyhow::anyhow!("completion key without separator: {s}"))?;
        let ordinal = canonical_u8(ordinal).ok_or_else(|| anyhow::anyhow!("bad category ordinal in key: {s}"))?;
        let hour = canonical_u8(hour).ok_or_else(|| anyhow::anyhow!("bad hour in key: {s}"))?;
        if hour > 23 {
            anyhow::bail!("hour out of range in key: {s}");
        }
        let category = TaskCategory::from_ordinal(ordinal)
            .ok_or_else(|| anyhow::anyhow!("unknown category ordinal in key: {s}"))?;
        Ok(Self { category, hour })
    }
}

/// Plain decimal as `Display` writes it: digits only, no sign, no leading zero.
fn canonical_u8(s: &str) -> Option<u8> {
    let digits_only = !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits_only || (s.len() > 1 && s.starts_with('0')) {
        return None;
    }
    s.parse().ok()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionPatterns {
    /// Bumped on every recorded completion.
    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub last_completed_category: Option<TaskCategory>,

    #[serde(default)]
    pub last_completed_at: Option<DateTime<Utc>>,

    /// `"<categoryOrdinal>_<hour>"` -> completions.
    #[serde(default)]
    pub category_hour_counts: BTreeMap<String, u32>,

    /// Days from Monday (0) to Sunday (6) -> completions.
    #[serde(default)]
    pub day_of_week_counts: BTreeMap<u8, u32>,

    /// Running mean over completions that reported a duration.
    #[serde(default)]
    pub average_duration_minutes: Option<f64>,

    #[serde(default)]
    pub duration_samples: u32,
}

impl CompletionPatterns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Well-formed entries; malformed keys are skipped.
    pub fn entries(&self) -> impl Iterator<Item = (CompletionKey, u32)> + '_ {
        self.category_hour_counts.iter().filter_map(|(k, v)| match k.parse::<CompletionKey>() {
            Ok(key) => Some((key, *v)),
            Err(e) => {
                log::debug!("dropping completion key: {e}");
                None
            }
        })
    }

    pub fn count(&self, key: CompletionKey) -> u32 {
        self.category_hour_counts
            .get(&key.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Next snapshot after one more completion.
    ///
    /// `local_hour` and `weekday` are in the user's timezone; the caller
    /// derives them (see `crate::time::local_hour`).
    pub fn record_completion(
        &self,
        category: TaskCategory,
        completed_at: DateTime<Utc>,
        local_hour: u8,
        weekday: Weekday,
        duration_minutes: Option<f64>,
    ) -> Self {
        let mut next = self.clone();
        next.version += 1;
        next.last_completed_category = Some(category);
        next.last_completed_at = Some(completed_at);

        let key = CompletionKey::new(category, local_hour.min(23)).to_string();
        *next.category_hour_counts.entry(key).or_insert(0) += 1;

        let day = weekday.num_days_from_monday() as u8;
        *next.day_of_week_counts.entry(day).or_insert(0) += 1;

        if let Some(minutes) = duration_minutes.filter(|m| m.is_finite() && *m >= 0.0) {
            let n = f64::from(next.duration_samples);
            let prev = next.average_duration_minutes.unwrap_or(0.0);
            next.average_duration_minutes = Some((prev * n + minutes) / (n + 1.0));
            next.duration_samples += 1;
        }

        next
    }
}
