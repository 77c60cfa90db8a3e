//! Render `BehavioralSignals` as a short context block for the reorder prompt.
//!
//! The block is empty whenever there is nothing trustworthy to say: during
//! cold start, and when history is sufficient but no single signal qualified.
//! Callers only have to check for an empty string.

use crate::signals::BehavioralSignals;

pub fn to_prompt_string(signals: &BehavioralSignals) -> String {
    if signals.is_cold_start || !signals.has_any_signal() {
        return String::new();
    }

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(
        "User behavior (from {} interactions):",
        signals.total_events
    ));

    if let Some(pref) = &signals.time_preference {
        lines.push(format!(
            "- Engages with suggestions most in the {} ({}% of {} positive interactions)",
            pref.bucket,
            percent(pref.share),
            pref.support
        ));
    }

    for a in &signals.category_affinity {
        lines.push(format!(
            "- Responds well to {} tasks (net +{} over {} interactions)",
            a.category.display_name(),
            a.net_score,
            a.support
        ));
    }

    if let Some(s) = &signals.snooze_hotspot {
        lines.push(format!(
            "- Often snoozed {} tasks suggested in the {} ({} times)",
            s.category.display_name(),
            s.bucket,
            s.count
        ));
    }

    for h in &signals.skip_reason_hotspots {
        lines.push(format!(
            "- Skips {} tasks as {} ({} times)",
            h.category.display_name(),
            h.reason.phrase(),
            h.count
        ));
    }

    if let Some(p) = &signals.completion_peak {
        lines.push(format!(
            "- Completes {} tasks most often in the {} ({} completions); treat as a hint and keep any move within 2 positions",
            p.category.display_name(),
            p.bucket,
            p.count
        ));
    }

    lines.join("\n")
}

/// 0.8 -> 80
fn percent(share: f64) -> u32 {
    (share * 100.0).round().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::TaskCategory;
    use crate::feedback::SkipReason;
    use crate::signals::{
        CategoryAffinity, CompletionPeak, SkipReasonHotspot, SnoozeHotspot, TimePreference,
    };
    use crate::time::TimeBucket;

    fn base(total_events: usize, is_cold_start: bool) -> BehavioralSignals {
        BehavioralSignals {
            total_events,
            is_cold_start,
            time_preference: None,
            category_affinity: vec![],
            snooze_hotspot: None,
            skip_reason_hotspots: vec![],
            completion_peak: None,
        }
    }

    #[test]
    fn cold_start_renders_nothing() {
        let mut s = base(4, true);
        s.time_preference = Some(TimePreference { bucket: TimeBucket::Morning, support: 6, share: 1.0 });
        assert_eq!(to_prompt_string(&s), "");
    }

    #[test]
    fn warm_without_signals_renders_nothing() {
        assert_eq!(to_prompt_string(&base(25, false)), "");
    }

    #[test]
    fn renders_every_signal_in_order() {
        let mut s = base(42, false);
        s.time_preference = Some(TimePreference { bucket: TimeBucket::Morning, support: 10, share: 0.8 });
        s.category_affinity = vec![
            CategoryAffinity { category: TaskCategory::Work, net_score: 6, support: 5 },
            CategoryAffinity { category: TaskCategory::Learning, net_score: 4, support: 3 },
        ];
        s.snooze_hotspot = Some(SnoozeHotspot { category: TaskCategory::Health, bucket: TimeBucket::Evening, count: 4 });
        s.skip_reason_hotspots = vec![
            SkipReasonHotspot { reason: SkipReason::WrongTime, category: TaskCategory::Errands, count: 3 },
            SkipReasonHotspot { reason: SkipReason::NeedsFocus, category: TaskCategory::Work, count: 3 },
        ];
        s.completion_peak = Some(CompletionPeak { category: TaskCategory::Work, bucket: TimeBucket::Morning, count: 6 });

        let out = to_prompt_string(&s);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].contains("42 interactions"));
        assert!(lines[1].contains("morning") && lines[1].contains("80%"));
        assert!(lines[2].contains("Work"));
        assert!(lines[3].contains("Learning"));
        assert!(lines[4].contains("snoozed") && lines[4].contains("Health"));
        assert!(lines[5].contains("wrong time") && lines[5].contains("Errands"));
        assert!(lines[6].contains("needs focus") && lines[6].contains("Work"));
        let last = lines[7];
        assert!(last.contains("Completes"));
        assert!(last.contains("Work"));
        assert!(last.contains("morning"));
        assert!(last.contains("within 2 positions"));
    }

    #[test]
    fn peak_only_renders_header_and_peak() {
        let mut s = base(0, false);
        s.completion_peak = Some(CompletionPeak { category: TaskCategory::Home, bucket: TimeBucket::Night, count: 4 });
        let out = to_prompt_string(&s);
        assert_eq!(out.lines().count(), 2);
        assert!(out.starts_with("User behavior (from 0 interactions):"));
        assert!(out.contains("Completes Home tasks most often in the night"));
    }
}
