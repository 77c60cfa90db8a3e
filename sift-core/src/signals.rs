//! Behavioral signals: confidence-gated summaries of how the user reacts to
//! suggestions.
//!
//! `extract_signals` folds the feedback log and a completion-pattern snapshot
//! into an immutable `BehavioralSignals`. Every signal has a support gate;
//! below it the field is simply absent. Nothing here is persisted; callers
//! recompute on demand and discard stale values.
//!
//! Ranking rules (all deterministic):
//! - time preference: dominant bucket among positive events, earlier bucket on ties
//! - category affinity: net score DESC, support DESC, category ordinal ASC
//! - snooze hotspot: count DESC, category ordinal ASC, bucket ASC
//! - skip hotspots: count DESC, category ordinal ASC, reason ASC
//! - completion peak: count DESC, category ordinal ASC, bucket ASC

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::TaskCategory;
use crate::feedback::{ActionClass, FeedbackEvent, SkipReason};
use crate::patterns::CompletionPatterns;
use crate::time::TimeBucket;

/// Gates for each signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalThresholds {
    /// Events needed to leave cold start without a completion peak.
    pub cold_start_events: usize,
    pub time_preference_support: u32,
    pub time_preference_share: f64,
    pub affinity_net_score: i32,
    pub affinity_support: u32,
    /// Gate on the total snooze count, not on any single group.
    pub snooze_total: u32,
    pub skip_hotspot_count: u32,
    pub completion_peak_count: u32,
    /// Ignore events older than this many days before `now`. `None` keeps
    /// the whole log.
    pub lookback_days: Option<u32>,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            cold_start_events: 10,
            time_preference_support: 6,
            time_preference_share: 0.40,
            affinity_net_score: 2,
            affinity_support: 3,
            snooze_total: 4,
            skip_hotspot_count: 3,
            completion_peak_count: 4,
            lookback_days: None,
        }
    }
}

pub const MAX_AFFINITIES: usize = 2;
pub const MAX_SKIP_HOTSPOTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePreference {
    pub bucket: TimeBucket,
    /// Positive events considered.
    pub support: u32,
    /// Fraction of `support` that fell in `bucket`.
    pub share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAffinity {
    pub category: TaskCategory,
    pub net_score: i32,
    pub support: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnoozeHotspot {
    pub category: TaskCategory,
    pub bucket: TimeBucket,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReasonHotspot {
    pub reason: SkipReason,
    pub category: TaskCategory,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionPeak {
    pub category: TaskCategory,
    pub bucket: TimeBucket,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralSignals {
    pub total_events: usize,
    pub is_cold_start: bool,
    pub time_preference: Option<TimePreference>,
    /// At most `MAX_AFFINITIES` entries.
    pub category_affinity: Vec<CategoryAffinity>,
    pub snooze_hotspot: Option<SnoozeHotspot>,
    /// At most `MAX_SKIP_HOTSPOTS` entries.
    pub skip_reason_hotspots: Vec<SkipReasonHotspot>,
    pub completion_peak: Option<CompletionPeak>,
}

impl BehavioralSignals {
    /// True when at least one individual signal qualified.
    pub fn has_any_signal(&self) -> bool {
        self.time_preference.is_some()
            || !self.category_affinity.is_empty()
            || self.snooze_hotspot.is_some()
            || !self.skip_reason_hotspots.is_empty()
            || self.completion_peak.is_some()
    }
}

pub fn extract_signals(
    events: &[FeedbackEvent],
    patterns: &CompletionPatterns,
    now: DateTime<Utc>,
) -> BehavioralSignals {
    extract_signals_with(events, patterns, now, &SignalThresholds::default())
}

pub fn extract_signals_with(
    events: &[FeedbackEvent],
    patterns: &CompletionPatterns,
    now: DateTime<Utc>,
    thresholds: &SignalThresholds,
) -> BehavioralSignals {
    let window: Vec<&FeedbackEvent> = match thresholds.lookback_days {
        Some(days) => {
            let since = now - Duration::days(i64::from(days));
            events.iter().filter(|e| e.timestamp >= since).collect()
        }
        None => events.iter().collect(),
    };

    let total_events = window.len();
    let completion_peak = completion_peak(patterns, thresholds);
    let is_cold_start = total_events < thresholds.cold_start_events && completion_peak.is_none();

    let signals = BehavioralSignals {
        total_events,
        is_cold_start,
        time_preference: time_preference(&window, thresholds),
        category_affinity: category_affinity(&window, thresholds),
        snooze_hotspot: snooze_hotspot(&window, thresholds),
        skip_reason_hotspots: skip_reason_hotspots(&window, thresholds),
        completion_peak,
    };

    log::debug!(
        "extracted signals: events={} cold_start={} time_pref={} affinities={} snooze={} skips={} peak={}",
        signals.total_events,
        signals.is_cold_start,
        signals.time_preference.is_some(),
        signals.category_affinity.len(),
        signals.snooze_hotspot.is_some(),
        signals.skip_reason_hotspots.len(),
        signals.completion_peak.is_some(),
    );

    signals
}

fn time_preference(events: &[&FeedbackEvent], t: &SignalThresholds) -> Option<TimePreference> {
    let mut per_bucket: BTreeMap<TimeBucket, u32> = BTreeMap::new();
    let mut support = 0u32;
    for e in events.iter().filter(|e| e.class() == ActionClass::Positive) {
        *per_bucket.entry(e.bucket()).or_insert(0) += 1;
        support += 1;
    }

    if support < t.time_preference_support {
        return None;
    }

    // Iteration is in bucket order, so `>` keeps the earlier bucket on ties.
    let mut best: Option<(TimeBucket, u32)> = None;
    for (bucket, count) in per_bucket {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((bucket, count)),
        }
    }

    let (bucket, count) = best?;
    let share = f64::from(count) / f64::from(support);
    if share < t.time_preference_share {
        log::debug!("time preference below share gate: {bucket} {share:.2}");
        return None;
    }

    Some(TimePreference { bucket, support, share })
}

fn category_affinity(events: &[&FeedbackEvent], t: &SignalThresholds) -> Vec<CategoryAffinity> {
    // category -> (positive, skip)
    let mut tallies: BTreeMap<TaskCategory, (u32, u32)> = BTreeMap::new();
    for e in events {
        match e.class() {
            ActionClass::Positive => tallies.entry(e.category).or_insert((0, 0)).0 += 1,
            ActionClass::Skip => tallies.entry(e.category).or_insert((0, 0)).1 += 1,
            ActionClass::Snooze => {}
        }
    }

    let mut out: Vec<CategoryAffinity> = tallies
        .into_iter()
        .map(|(category, (positive, skip))| CategoryAffinity {
            category,
            net_score: 2 * positive as i32 - 2 * skip as i32,
            support: positive + skip,
        })
        .filter(|a| a.net_score >= t.affinity_net_score && a.support >= t.affinity_support)
        .collect();

    out.sort_by(|a, b| {
        b.net_score
            .cmp(&a.net_score)
            .then_with(|| b.support.cmp(&a.support))
            .then_with(|| a.category.cmp(&b.category))
    });
    out.truncate(MAX_AFFINITIES);
    out
}

fn snooze_hotspot(events: &[&FeedbackEvent], t: &SignalThresholds) -> Option<SnoozeHotspot> {
    let mut groups: BTreeMap<(TaskCategory, TimeBucket), u32> = BTreeMap::new();
    let mut total = 0u32;
    for e in events.iter().filter(|e| e.class() == ActionClass::Snooze) {
        *groups.entry((e.category, e.bucket())).or_insert(0) += 1;
        total += 1;
    }

    if total < t.snooze_total {
        return None;
    }

    // Keys iterate in (ordinal, bucket) order; strict `>` keeps the first on ties.
    let mut best: Option<SnoozeHotspot> = None;
    for ((category, bucket), count) in groups {
        if best.is_none_or(|b| count > b.count) {
            best = Some(SnoozeHotspot { category, bucket, count });
        }
    }
    best
}

fn skip_reason_hotspots(events: &[&FeedbackEvent], t: &SignalThresholds) -> Vec<SkipReasonHotspot> {
    let mut groups: BTreeMap<(SkipReason, TaskCategory), u32> = BTreeMap::new();
    for e in events {
        match e.action.skip_reason() {
            Some(reason @ (SkipReason::WrongTime | SkipReason::NeedsFocus)) => {
                *groups.entry((reason, e.category)).or_insert(0) += 1;
            }
            _ => {}
        }
    }

    let mut out: Vec<SkipReasonHotspot> = groups
        .into_iter()
        .filter(|(_, count)| *count >= t.skip_hotspot_count)
        .map(|((reason, category), count)| SkipReasonHotspot { reason, category, count })
        .collect();

    out.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.reason.cmp(&b.reason))
    });
    out.truncate(MAX_SKIP_HOTSPOTS);
    out
}

fn completion_peak(patterns: &CompletionPatterns, t: &SignalThresholds) -> Option<CompletionPeak> {
    let mut groups: BTreeMap<(TaskCategory, TimeBucket), u32> = BTreeMap::new();
    for (key, count) in patterns.entries() {
        let slot = groups.entry((key.category, key.bucket())).or_insert(0);
        // counts come from an external snapshot
        *slot = slot.saturating_add(count);
    }

    let mut best: Option<CompletionPeak> = None;
    for ((category, bucket), count) in groups {
        if best.is_none_or(|b| count > b.count) {
            best = Some(CompletionPeak { category, bucket, count });
        }
    }

    best.filter(|p| p.count >= t.completion_peak_count)
}
