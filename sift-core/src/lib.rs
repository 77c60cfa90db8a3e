//! sift-core: deterministic task suggestion engine.
//!
//! Pure, synchronous building blocks:
//! - `scoring`: multi-factor priority score and baseline ranking
//! - `signals`: confidence-gated behavioral signals from feedback history
//! - `prompt_context`: behavior context block for the reorder prompt
//! - `permutation`: sanitize + clamp for untrusted reorder proposals
//! - `analysis` / `reply`: normalization of model replies
//! - `suggest`: one suggestion cycle wired end to end

pub mod analysis;
pub mod category;
pub mod feedback;
pub mod patterns;
pub mod permutation;
pub mod prompt_context;
pub mod reply;
pub mod scoring;
pub mod signals;
pub mod suggest;
pub mod task;
pub mod time;

pub use analysis::{
    Confidence, ProposedCategory, TaskAnalysis, build_analysis_prompt, normalize_minutes, parse_analysis,
};
pub use category::TaskCategory;
pub use feedback::{ActionClass, FeedbackAction, FeedbackEvent, SkipReason};
pub use patterns::{CompletionKey, CompletionPatterns};
pub use permutation::{clamp_permutation_greedy, is_permutation, max_displacement, sanitize_permutation};
pub use prompt_context::to_prompt_string;
pub use reply::{extract_json_object, parse_proposed_order};
pub use scoring::{RankedTask, ScoreBreakdown, breakdown, rank_tasks, score};
pub use signals::{
    BehavioralSignals, CategoryAffinity, CompletionPeak, SignalThresholds, SkipReasonHotspot,
    SnoozeHotspot, TimePreference, extract_signals, extract_signals_with,
};
pub use suggest::{
    BaselineEntry, OrderingSource, PreparedSuggestion, ReorderProvider, Suggestion, SuggestionEngine,
    SuggestionPolicy, build_reorder_prompt, finish_suggestion, prepare_suggestion,
};
pub use task::{PriorityLevel, Task};
pub use time::{TimeBucket, local_hour, local_weekday, parse_local_to_utc};
