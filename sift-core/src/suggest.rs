//! Suggestion pipeline: baseline ranking, behavior context, and safe
//! application of a proposed reorder.
//!
//! One cycle is split in two so the inference call can happen anywhere
//! (blocking or async, with or without a timeout):
//!
//! 1. `prepare_suggestion` ranks tasks, extracts signals and builds the prompt.
//! 2. `finish_suggestion` takes the raw reply (or `None` on failure/timeout),
//!    sanitizes and clamps it, and returns the final ordering.
//!
//! The baseline ordering is always a valid answer; a missing or unusable reply
//! simply yields it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feedback::FeedbackEvent;
use crate::patterns::CompletionPatterns;
use crate::permutation::{clamp_permutation_greedy, sanitize_permutation};
use crate::prompt_context::to_prompt_string;
use crate::reply::parse_proposed_order;
use crate::scoring::{ScoreBreakdown, rank_tasks};
use crate::signals::{BehavioralSignals, SignalThresholds, extract_signals_with};
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuggestionPolicy {
    /// How far a proposal may move any task from its baseline slot.
    pub max_displacement: usize,
    /// Only the top `max_tasks` baseline tasks are sent for reordering;
    /// the tail keeps baseline order.
    pub max_tasks: usize,
    pub thresholds: SignalThresholds,
}

impl Default for SuggestionPolicy {
    fn default() -> Self {
        Self {
            max_displacement: 2,
            max_tasks: 20,
            thresholds: SignalThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub task_id: String,
    pub title: String,
    pub score: ScoreBreakdown,
}

/// Everything produced before the inference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedSuggestion {
    /// All tasks, score descending.
    pub baseline: Vec<BaselineEntry>,
    pub signals: BehavioralSignals,
    /// Behavior block; empty during cold start or with no qualifying signal.
    pub context: String,
    pub prompt: String,
    pub policy: SuggestionPolicy,
}

impl PreparedSuggestion {
    /// Number of leading baseline tasks the prompt asks to reorder.
    pub fn window(&self) -> usize {
        self.baseline.len().min(self.policy.max_tasks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingSource {
    /// No usable reply; baseline order.
    Baseline,
    /// Reply applied after sanitize + clamp.
    Proposal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Final task order.
    pub task_ids: Vec<String>,
    /// Applied permutation of the reordered window, 1-based over the baseline.
    pub permutation: Vec<usize>,
    pub source: OrderingSource,
}

pub fn prepare_suggestion(
    tasks: &[Task],
    events: &[FeedbackEvent],
    patterns: &CompletionPatterns,
    now: DateTime<Utc>,
    policy: SuggestionPolicy,
) -> PreparedSuggestion {
    let baseline: Vec<BaselineEntry> = rank_tasks(tasks, now)
        .into_iter()
        .map(|r| BaselineEntry {
            task_id: r.task.id.clone(),
            title: r.task.title.clone(),
            score: r.score,
        })
        .collect();

    let signals = extract_signals_with(events, patterns, now, &policy.thresholds);
    let context = to_prompt_string(&signals);

    let window = baseline.len().min(policy.max_tasks);
    let prompt = build_reorder_prompt(&baseline[..window], &context, policy.max_displacement);

    PreparedSuggestion {
        baseline,
        signals,
        context,
        prompt,
        policy,
    }
}

pub fn build_reorder_prompt(baseline: &[BaselineEntry], context: &str, max_displacement: usize) -> String {
    let mut prompt = String::new();
    prompt.push_str("Reorder these tasks so the best one to do next comes first.\n\n");
    prompt.push_str("Tasks (current order, most urgent first):\n");
    for (i, entry) in baseline.iter().enumerate() {
        prompt.push_str(&format!("{}. {} (score {:.1})\n", i + 1, entry.title, entry.score.total()));
    }
    prompt.push('\n');

    if !context.is_empty() {
        prompt.push_str(context);
        prompt.push_str("\n\n");
    }

    prompt.push_str(&format!(
        "Move each task at most {max_displacement} positions from where it is now.\n\
Reply with JSON only: {{\"order\": [task numbers in your preferred order]}}\n"
    ));
    prompt
}

/// Apply a reply (or its absence) to a prepared cycle.
pub fn finish_suggestion(prepared: &PreparedSuggestion, reply: Option<&str>) -> Suggestion {
    let window = prepared.window();
    let identity: Vec<usize> = (1..=window).collect();

    let (permutation, source) = match reply {
        Some(text) => {
            let raw = parse_proposed_order(text);
            if raw.is_empty() {
                log::warn!("reorder reply had no task numbers; keeping baseline");
                (identity, OrderingSource::Baseline)
            } else {
                let sanitized = sanitize_permutation(&raw, window);
                let clamped = clamp_permutation_greedy(&sanitized, prepared.policy.max_displacement);
                (clamped, OrderingSource::Proposal)
            }
        }
        None => (identity, OrderingSource::Baseline),
    };

    let mut task_ids: Vec<String> = permutation
        .iter()
        .map(|&n| prepared.baseline[n - 1].task_id.clone())
        .collect();
    task_ids.extend(prepared.baseline[window..].iter().map(|e| e.task_id.clone()));

    Suggestion {
        task_ids,
        permutation,
        source,
    }
}

/// Blocking inference boundary.
pub trait ReorderProvider {
    fn propose(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Runs a whole cycle against a blocking provider.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    policy: SuggestionPolicy,
}

impl SuggestionEngine {
    pub fn new(policy: SuggestionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SuggestionPolicy {
        &self.policy
    }

    pub fn suggest<P: ReorderProvider>(
        &self,
        provider: &P,
        tasks: &[Task],
        events: &[FeedbackEvent],
        patterns: &CompletionPatterns,
        now: DateTime<Utc>,
    ) -> Suggestion {
        let prepared = prepare_suggestion(tasks, events, patterns, now, self.policy);

        // Nothing to reorder.
        if prepared.window() < 2 {
            return finish_suggestion(&prepared, None);
        }

        match provider.propose(&prepared.prompt) {
            Ok(reply) => finish_suggestion(&prepared, Some(&reply)),
            Err(e) => {
                log::warn!("reorder provider failed, using baseline: {e:#}");
                finish_suggestion(&prepared, None)
            }
        }
    }
}
