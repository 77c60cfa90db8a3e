use chrono::{DateTime, Duration, TimeZone, Utc};
use sift_core::{
    BehavioralSignals, CompletionPatterns, FeedbackAction, FeedbackEvent, OrderingSource,
    PriorityLevel, ReorderProvider, SuggestionEngine, SuggestionPolicy, Task, TaskCategory,
    TimeBucket, extract_signals, finish_suggestion, is_permutation, max_displacement,
    prepare_suggestion, to_prompt_string,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap()
}

fn backlog() -> Vec<Task> {
    let now = now();
    vec![
        Task::new("inbox", "Clear inbox", now - Duration::days(2))
            .with_duration_minutes(5)
            .with_category(TaskCategory::Work),
        Task::new("taxes", "File quarterly taxes", now - Duration::days(20))
            .with_due(now - Duration::hours(3))
            .with_priority(PriorityLevel::High)
            .with_category(TaskCategory::Finance),
        Task::new("gym", "Book gym class", now - Duration::days(5))
            .with_due(now + Duration::hours(30))
            .with_category(TaskCategory::Health),
        Task::new("course", "Finish module 4", now - Duration::days(9))
            .with_duration_minutes(90)
            .with_priority(PriorityLevel::Medium)
            .with_category(TaskCategory::Learning),
        Task::new("groceries", "Order groceries", now)
            .with_due(now + Duration::days(10))
            .with_category(TaskCategory::Shopping),
        Task::new("report", "Draft Q1 report", now - Duration::days(1))
            .with_due(now + Duration::hours(10))
            .with_priority(PriorityLevel::Urgent)
            .with_category(TaskCategory::Work),
    ]
}

fn history() -> Vec<FeedbackEvent> {
    let at = now() - Duration::days(1);
    let mut log = Vec::new();
    for i in 0..8 {
        log.push(FeedbackEvent::new(format!("w{i}"), FeedbackAction::StartedImmediately, TaskCategory::Work, 9, at));
    }
    for i in 0..2 {
        log.push(FeedbackEvent::new(format!("p{i}"), FeedbackAction::ViewedDetails, TaskCategory::Personal, 14, at));
    }
    for i in 0..4 {
        log.push(FeedbackEvent::new(format!("s{i}"), FeedbackAction::SnoozeEvening, TaskCategory::Health, 18, at));
    }
    for i in 0..3 {
        log.push(FeedbackEvent::new(format!("k{i}"), FeedbackAction::NeedsFocus, TaskCategory::Learning, 16, at));
    }
    log
}

struct Fixed(&'static str);

impl ReorderProvider for Fixed {
    fn propose(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(self.0.to_string())
    }
}

#[test]
fn signals_and_context_from_history() {
    let mut patterns = CompletionPatterns::new();
    patterns.category_hour_counts.insert("1_9".to_string(), 6);

    let signals: BehavioralSignals = extract_signals(&history(), &patterns, now());
    assert!(!signals.is_cold_start);
    assert_eq!(signals.total_events, 17);

    let pref = signals.time_preference.unwrap();
    assert_eq!(pref.bucket, TimeBucket::Morning);
    assert_eq!(pref.support, 10);
    assert!((pref.share - 0.8).abs() < 1e-9);

    assert_eq!(signals.category_affinity[0].category, TaskCategory::Work);
    assert_eq!(signals.snooze_hotspot.unwrap().bucket, TimeBucket::Evening);
    assert_eq!(signals.skip_reason_hotspots.len(), 1);
    assert_eq!(signals.completion_peak.unwrap().count, 6);

    let ctx = to_prompt_string(&signals);
    assert!(ctx.contains("17 interactions"));
    assert!(ctx.contains("80%"));
    assert!(ctx.contains("snoozed"));
    assert!(ctx.contains("needs focus"));
    assert!(ctx.contains("within 2 positions"));
}

#[test]
fn adversarial_reply_is_bounded() {
    let engine = SuggestionEngine::new(SuggestionPolicy { max_displacement: 1, ..SuggestionPolicy::default() });
    let provider = Fixed("Absolutely! My ranking: {\"order\": [6, 6, 0, -2, 5, 100, 4], \"note\": \"trust me\"}");
    let s = engine.suggest(&provider, &backlog(), &history(), &CompletionPatterns::new(), now());

    assert_eq!(s.source, OrderingSource::Proposal);
    assert!(is_permutation(&s.permutation));
    assert!(max_displacement(&s.permutation) <= 1);
    assert_eq!(s.task_ids.len(), 6);

    let mut ids = s.task_ids.clone();
    ids.sort();
    let mut expected: Vec<String> = backlog().into_iter().map(|t| t.id).collect();
    expected.sort();
    assert_eq!(ids, expected);
}

#[test]
fn timeout_path_uses_baseline() {
    let prepared = prepare_suggestion(&backlog(), &[], &CompletionPatterns::new(), now(), SuggestionPolicy::default());
    assert!(prepared.context.is_empty());

    let s = finish_suggestion(&prepared, None);
    assert_eq!(s.source, OrderingSource::Baseline);
    // overdue taxes first, then the urgent report due today
    assert_eq!(s.task_ids[0], "taxes");
    assert_eq!(s.task_ids[1], "report");
}
