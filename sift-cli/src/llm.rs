use anyhow::{Context, Result, bail};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::auth;
use crate::config::LlmSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn from_section(section: &LlmSection) -> Result<Self> {
        let provider = match section.provider.to_lowercase().as_str() {
            "openai" => Provider::OpenAI,
            "anthropic" => Provider::Anthropic,
            other => bail!("unsupported llm.provider '{other}' (expected openai or anthropic)"),
        };
        let base_url = match (&section.base_url, provider) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Provider::Anthropic) => "https://api.anthropic.com".to_string(),
            (None, Provider::OpenAI) => "https://api.openai.com".to_string(),
        };
        Ok(Self {
            provider,
            model: section.model.clone(),
            base_url,
            temperature: section.temperature,
            timeout: Duration::from_secs(section.timeout_secs.max(1)),
        })
    }
}

const SYSTEM_PROMPT: &str = "You help a person decide which task to do next. \
Follow the requested output format exactly and keep answers short.";

/// Single-turn completion, bounded by `config.timeout`.
///
/// A timeout is an error like any other; callers fall back to deterministic
/// output.
pub async fn complete(config: &LlmConfig, prompt: &str) -> Result<String> {
    let call = async {
        match config.provider {
            Provider::Anthropic => anthropic_complete(config, prompt).await,
            Provider::OpenAI => openai_complete(config, prompt).await,
        }
    };

    match tokio::time::timeout(config.timeout, call).await {
        Ok(res) => res,
        Err(_) => bail!("model call timed out after {}s", config.timeout.as_secs()),
    }
}

async fn anthropic_complete(config: &LlmConfig, prompt: &str) -> Result<String> {
    let token = auth::api_key(Provider::Anthropic)?;

    #[derive(Serialize)]
    struct Msg<'a> {
        role: &'a str,
        content: &'a str,
    }

    #[derive(Serialize)]
    struct Req<'a> {
        model: &'a str,
        max_tokens: i32,
        temperature: f32,
        system: &'a str,
        messages: Vec<Msg<'a>>,
    }

    #[derive(Deserialize)]
    struct Resp {
        content: Vec<ContentBlock>,
    }

    #[derive(Deserialize)]
    struct ContentBlock {
        #[serde(rename = "type")]
        t: String,
        text: Option<String>,
    }

    let body = Req {
        model: &config.model,
        max_tokens: 600,
        temperature: config.temperature,
        system: SYSTEM_PROMPT,
        messages: vec![Msg { role: "user", content: prompt }],
    };

    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", HeaderValue::from_str(&token)?);
    headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/v1/messages", config.base_url))
        .headers(headers)
        .json(&body)
        .send()
        .await
        .context("anthropic request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("anthropic error: {status} {txt}");
    }

    let out: Resp = resp.json().await.context("parse anthropic response")?;
    let mut s = String::new();
    for b in out.content {
        if b.t == "text" {
            if let Some(t) = b.text {
                s.push_str(&t);
            }
        }
    }
    Ok(s.trim().to_string())
}

async fn openai_complete(config: &LlmConfig, prompt: &str) -> Result<String> {
    let key = auth::api_key(Provider::OpenAI)?;

    #[derive(Serialize)]
    struct Msg<'a> {
        role: &'a str,
        content: &'a str,
    }

    #[derive(Serialize)]
    struct Req<'a> {
        model: &'a str,
        messages: Vec<Msg<'a>>,
        temperature: f32,
    }

    #[derive(Deserialize)]
    struct Resp {
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: MsgOut,
    }

    #[derive(Deserialize)]
    struct MsgOut {
        content: Option<String>,
    }

    let body = Req {
        model: &config.model,
        messages: vec![
            Msg { role: "system", content: SYSTEM_PROMPT },
            Msg { role: "user", content: prompt },
        ],
        temperature: config.temperature,
    };

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/v1/chat/completions", config.base_url))
        .header(AUTHORIZATION, format!("Bearer {key}"))
        .json(&body)
        .send()
        .await
        .context("openai request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("openai error: {status} {txt}");
    }

    let out: Resp = resp.json().await.context("parse openai response")?;
    let content = out
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default();

    Ok(content.trim().to_string())
}
