//! Task analysis replies: prompt construction and normalization.
//!
//! The model is asked for a JSON object describing a task. Whatever comes back
//! is normalized into a `TaskAnalysis`; a reply with no readable object yields
//! `TaskAnalysis::fallback()` instead of an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::category::TaskCategory;
use crate::reply::extract_json_object;
use crate::task::PriorityLevel;
use crate::time::TimeBucket;

pub const MIN_MINUTES: u32 = 5;
pub const MAX_MINUTES: u32 = 480;
pub const FALLBACK_MINUTES: u32 = 30;

pub const DEFAULT_CATEGORY_ICON: &str = "folder";
pub const DEFAULT_CATEGORY_COLOR: &str = "#8E8E93";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

impl Confidence {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Confidence::Low),
            "medium" | "med" | "moderate" => Some(Confidence::Medium),
            "high" => Some(Confidence::High),
            _ => None,
        }
    }
}

/// A category the model suggests creating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAnalysis {
    pub estimated_minutes: u32,
    pub confidence: Confidence,
    pub reasoning: String,
    pub priority: Option<PriorityLevel>,
    pub best_time: Option<TimeBucket>,
    pub category: Option<TaskCategory>,
    pub subtasks: Vec<String>,
    pub tips: Vec<String>,
    pub proposed_category: Option<ProposedCategory>,
}

impl TaskAnalysis {
    pub fn fallback() -> Self {
        Self {
            estimated_minutes: FALLBACK_MINUTES,
            confidence: Confidence::Low,
            reasoning: "Could not analyze this task; using a default estimate.".to_string(),
            priority: None,
            best_time: None,
            category: None,
            subtasks: Vec::new(),
            tips: Vec::new(),
            proposed_category: None,
        }
    }
}

/// Round half up, then clamp to `[MIN_MINUTES, MAX_MINUTES]`.
pub fn normalize_minutes(raw: f64) -> u32 {
    if !raw.is_finite() {
        return FALLBACK_MINUTES;
    }
    let rounded = (raw + 0.5).floor();
    rounded.clamp(f64::from(MIN_MINUTES), f64::from(MAX_MINUTES)) as u32
}

/// Normalize a raw model reply.
pub fn parse_analysis(reply: &str) -> TaskAnalysis {
    let Some(obj) = extract_json_object(reply) else {
        log::warn!("analysis reply had no JSON object; using fallback");
        return TaskAnalysis::fallback();
    };

    let Some(minutes) = field(&obj, &["estimated_minutes", "estimatedMinutes", "minutes"]).and_then(as_f64) else {
        log::warn!("analysis reply missing estimated minutes; using fallback");
        return TaskAnalysis::fallback();
    };

    TaskAnalysis {
        estimated_minutes: normalize_minutes(minutes),
        confidence: field(&obj, &["confidence"])
            .and_then(Value::as_str)
            .and_then(Confidence::parse)
            .unwrap_or_default(),
        reasoning: field(&obj, &["reasoning"])
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        priority: field(&obj, &["priority"]).and_then(Value::as_str).and_then(parse_priority),
        best_time: field(&obj, &["best_time", "bestTime"]).and_then(Value::as_str).and_then(parse_bucket),
        category: field(&obj, &["category"])
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<TaskCategory>().ok()),
        subtasks: string_list(field(&obj, &["subtasks"])),
        tips: string_list(field(&obj, &["tips"])),
        proposed_category: field(&obj, &["proposed_category", "proposedCategory", "new_category"])
            .and_then(parse_proposed_category),
    }
}

/// Prompt asking for a task analysis. `context` is the behavior block from
/// `crate::prompt_context::to_prompt_string` and may be empty.
pub fn build_analysis_prompt(title: &str, context: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("Analyze this task and reply with a single JSON object.\n\n");
    prompt.push_str(&format!("Task: {}\n\n", title.trim()));
    if !context.is_empty() {
        prompt.push_str(context);
        prompt.push_str("\n\n");
    }
    prompt.push_str(
        "Fields:\n\
- estimated_minutes: number\n\
- confidence: \"low\" | \"medium\" | \"high\"\n\
- reasoning: short string\n\
- priority: \"none\" | \"low\" | \"medium\" | \"high\" | \"urgent\"\n\
- best_time: \"morning\" | \"afternoon\" | \"evening\" | \"night\"\n\
- category: one of Work, Personal, Health, Finance, Shopping, Errands, Learning, Home, Uncategorized\n\
- subtasks: array of strings\n\
- tips: array of strings\n\
- proposed_category: optional {\"name\", \"icon\", \"color\"} when no category fits\n",
    );
    prompt
}

fn field<'a>(obj: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| obj.get(*n)).filter(|v| !v.is_null())
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_list(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_priority(s: &str) -> Option<PriorityLevel> {
    match s.trim().to_lowercase().as_str() {
        "none" => Some(PriorityLevel::None),
        "low" => Some(PriorityLevel::Low),
        "medium" => Some(PriorityLevel::Medium),
        "high" => Some(PriorityLevel::High),
        "urgent" => Some(PriorityLevel::Urgent),
        _ => None,
    }
}

fn parse_bucket(s: &str) -> Option<TimeBucket> {
    let s = s.trim().to_lowercase();
    TimeBucket::ALL.iter().copied().find(|b| b.name() == s)
}

/// A bare name is enough; icon and color fall back to defaults.
fn parse_proposed_category(v: &Value) -> Option<ProposedCategory> {
    let text = |key: &str| {
        v.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let name = match v {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Object(_) => text("name"),
        _ => None,
    }?;

    Some(ProposedCategory {
        name,
        icon: text("icon").unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()),
        color: text("color").unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
    })
}
