use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sift_core::{CompletionPatterns, FeedbackEvent, Task};
use std::fs;
use std::path::{Path, PathBuf};

/// `$SIFT_HOME`, or `~/.sift`.
pub fn sift_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SIFT_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".sift"))
}

pub fn ensure_sift_home() -> Result<PathBuf> {
    let dir = sift_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn tasks_path() -> Result<PathBuf> {
    Ok(ensure_sift_home()?.join("tasks.json"))
}

pub fn feedback_path() -> Result<PathBuf> {
    Ok(ensure_sift_home()?.join("feedback.json"))
}

pub fn patterns_path() -> Result<PathBuf> {
    Ok(ensure_sift_home()?.join("patterns.json"))
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn read_tasks(path: Option<&Path>) -> Result<Vec<Task>> {
    match path {
        Some(p) => read_json_or_default(p),
        None => read_json_or_default(&tasks_path()?),
    }
}

pub fn read_feedback() -> Result<Vec<FeedbackEvent>> {
    read_json_or_default(&feedback_path()?)
}

/// The log is append-only: existing entries are never rewritten.
pub fn append_feedback(event: FeedbackEvent) -> Result<usize> {
    let p = feedback_path()?;
    let mut log: Vec<FeedbackEvent> = read_json_or_default(&p)?;
    log.push(event);
    write_json(&p, &log)?;
    Ok(log.len())
}

pub fn read_patterns() -> Result<CompletionPatterns> {
    read_json_or_default(&patterns_path()?)
}

pub fn write_patterns(patterns: &CompletionPatterns) -> Result<()> {
    write_json(&patterns_path()?, patterns)
}
