//! Deterministic priority scoring.
//!
//! `score = due_date + explicit_priority + age + quick_win`, higher means the
//! task is more worth surfacing right now. Every term is a step or piecewise
//! linear function of the task's attributes and the caller-supplied `now`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{PriorityLevel, Task};

/// Per-term scores for one task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub due_date: f64,
    pub explicit_priority: f64,
    pub age: f64,
    pub quick_win: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.due_date + self.explicit_priority + self.age + self.quick_win
    }
}

/// Composite score for `task` at `now`.
pub fn score(task: &Task, now: DateTime<Utc>) -> f64 {
    breakdown(task, now).total()
}

pub fn breakdown(task: &Task, now: DateTime<Utc>) -> ScoreBreakdown {
    ScoreBreakdown {
        due_date: due_date_score(task.due, now),
        explicit_priority: explicit_priority_score(task.priority),
        age: age_score(task.created_at, now),
        quick_win: quick_win_score(task.estimated_duration),
    }
}

/// Overdue tasks jump to the top (40); otherwise the score decays with the
/// number of hours left until the due date, reaching the no-due-date floor (5)
/// a week out.
pub fn due_date_score(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(due) = due else { return 5.0 };

    let hours = (due - now).num_seconds() as f64 / 3600.0;
    if hours < 0.0 {
        40.0
    } else if hours < 2.0 {
        38.0
    } else if hours < 24.0 {
        30.0 + (24.0 - hours) / 24.0 * 8.0
    } else if hours < 48.0 {
        20.0 + (48.0 - hours) / 24.0 * 10.0
    } else if hours < 168.0 {
        10.0 + (168.0 - hours) / 168.0 * 10.0
    } else {
        5.0
    }
}

pub fn explicit_priority_score(priority: PriorityLevel) -> f64 {
    match priority {
        PriorityLevel::None => 0.0,
        PriorityLevel::Low => 5.0,
        PriorityLevel::Medium => 12.0,
        PriorityLevel::High => 20.0,
        PriorityLevel::Urgent => 25.0,
    }
}

pub fn age_score(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let days = (now - created_at).num_seconds() as f64 / 86_400.0;
    if days > 14.0 {
        10.0
    } else if days > 7.0 {
        7.0
    } else if days > 3.0 {
        4.0
    } else {
        2.0
    }
}

/// Short tasks are cheap wins. `estimate_secs` of `None` means unknown.
pub fn quick_win_score(estimate_secs: Option<i64>) -> f64 {
    let Some(secs) = estimate_secs else { return 3.0 };

    let minutes = secs as f64 / 60.0;
    if minutes <= 5.0 {
        10.0
    } else if minutes <= 15.0 {
        8.0
    } else if minutes <= 30.0 {
        5.0
    } else if minutes <= 60.0 {
        2.0
    } else {
        0.0
    }
}

/// A task paired with its score, in baseline order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTask<'a> {
    pub task: &'a Task,
    pub score: ScoreBreakdown,
}

/// Baseline ordering: score descending, ties keep input order.
pub fn rank_tasks(tasks: &[Task], now: DateTime<Utc>) -> Vec<RankedTask<'_>> {
    let mut ranked: Vec<RankedTask<'_>> = tasks
        .iter()
        .map(|task| RankedTask {
            task,
            score: breakdown(task, now),
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.total().total_cmp(&a.score.total()));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn due_date_score_anchor_points() {
        let now = now();
        assert_eq!(due_date_score(None, now), 5.0);
        assert_eq!(due_date_score(Some(now - Duration::minutes(1)), now), 40.0);
        assert_eq!(due_date_score(Some(now - Duration::days(30)), now), 40.0);
        assert_eq!(due_date_score(Some(now), now), 38.0);
        assert_eq!(due_date_score(Some(now + Duration::minutes(119)), now), 38.0);
        assert!(approx(due_date_score(Some(now + Duration::hours(12)), now), 34.0));
        assert!(approx(due_date_score(Some(now + Duration::hours(36)), now), 25.0));
        assert!(approx(due_date_score(Some(now + Duration::hours(84)), now), 15.0));
        assert_eq!(due_date_score(Some(now + Duration::hours(168)), now), 5.0);
        assert_eq!(due_date_score(Some(now + Duration::days(60)), now), 5.0);
    }

    #[test]
    fn due_date_score_never_increases_with_more_time_left() {
        let now = now();
        let mut prev = f64::INFINITY;
        for minutes in (0..=(200 * 60)).step_by(15) {
            let s = due_date_score(Some(now + Duration::minutes(minutes)), now);
            assert!(s <= prev, "score rose at +{minutes}min: {prev} -> {s}");
            prev = s;
        }
    }

    #[test]
    fn explicit_priority_is_strictly_increasing() {
        let levels = [
            PriorityLevel::None,
            PriorityLevel::Low,
            PriorityLevel::Medium,
            PriorityLevel::High,
            PriorityLevel::Urgent,
        ];
        let scores: Vec<f64> = levels.iter().map(|p| explicit_priority_score(*p)).collect();
        assert_eq!(scores, vec![0.0, 5.0, 12.0, 20.0, 25.0]);
        assert!(scores.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn age_and_quick_win_steps() {
        let now = now();
        assert_eq!(age_score(now, now), 2.0);
        assert_eq!(age_score(now - Duration::days(3), now), 2.0);
        assert_eq!(age_score(now - Duration::days(4), now), 4.0);
        assert_eq!(age_score(now - Duration::days(8), now), 7.0);
        assert_eq!(age_score(now - Duration::days(15), now), 10.0);

        assert_eq!(quick_win_score(None), 3.0);
        assert_eq!(quick_win_score(Some(5 * 60)), 10.0);
        assert_eq!(quick_win_score(Some(15 * 60)), 8.0);
        assert_eq!(quick_win_score(Some(30 * 60)), 5.0);
        assert_eq!(quick_win_score(Some(60 * 60)), 2.0);
        assert_eq!(quick_win_score(Some(61 * 60)), 0.0);
    }

    #[test]
    fn score_is_plain_sum() {
        let now = now();
        let t = Task::new("t1", "file taxes", now - Duration::days(10))
            .with_due(now - Duration::hours(1))
            .with_priority(PriorityLevel::High)
            .with_duration_minutes(10);
        // 40 + 20 + 7 + 8
        assert_eq!(score(&t, now), 75.0);
    }

    #[test]
    fn rank_is_stable_on_ties() {
        let now = now();
        let tasks = vec![
            Task::new("a", "first", now),
            Task::new("b", "urgent", now).with_priority(PriorityLevel::Urgent),
            Task::new("c", "second", now),
        ];
        let ids: Vec<&str> = rank_tasks(&tasks, now).iter().map(|r| r.task.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
