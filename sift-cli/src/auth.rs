use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::llm::Provider;
use crate::state::ensure_sift_home;

/// Contents of `~/.sift/auth.json`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    pub anthropic_token: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Provider {
    fn env_var(self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    fn key_prefix(self) -> &'static str {
        match self {
            Provider::Anthropic => "sk-ant-",
            Provider::OpenAI => "sk-",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Provider::Anthropic => "Anthropic",
            Provider::OpenAI => "OpenAI",
        }
    }

    fn paste_command(self) -> &'static str {
        match self {
            Provider::Anthropic => "sift auth paste-anthropic-token",
            Provider::OpenAI => "sift auth paste-openai-api-key",
        }
    }
}

impl AuthState {
    fn slot(&mut self, provider: Provider) -> &mut Option<String> {
        match provider {
            Provider::Anthropic => &mut self.anthropic_token,
            Provider::OpenAI => &mut self.openai_api_key,
        }
    }

    fn stored(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Anthropic => self.anthropic_token.as_deref(),
            Provider::OpenAI => self.openai_api_key.as_deref(),
        }
    }
}

fn auth_path() -> Result<PathBuf> {
    Ok(ensure_sift_home()?.join("auth.json"))
}

fn load_auth() -> Result<AuthState> {
    let p = auth_path()?;
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

/// Key for `provider`: the stored one first, then the provider's env var.
pub fn api_key(provider: Provider) -> Result<String> {
    if let Some(k) = load_auth()?.stored(provider).filter(|k| !k.is_empty()) {
        return Ok(k.to_string());
    }
    match std::env::var(provider.env_var()) {
        Ok(k) if !k.is_empty() => Ok(k),
        _ => bail!(
            "no {} key; run `{}` or set {}",
            provider.label(),
            provider.paste_command(),
            provider.env_var()
        ),
    }
}

/// Read a key from stdin, check its prefix and store it.
pub fn paste_key(provider: Provider) -> Result<()> {
    let prefix = provider.key_prefix();
    print!("Paste {} API key (starts with {prefix}): ", provider.label());
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let key = line.trim().to_string();

    if !key.starts_with(prefix) {
        bail!("that doesn't look like a {} key (expected prefix {prefix})", provider.label());
    }

    let mut auth = load_auth()?;
    *auth.slot(provider) = Some(key);

    let p = auth_path()?;
    fs::write(&p, serde_json::to_string_pretty(&auth)?).with_context(|| format!("write {}", p.display()))?;
    println!("Saved {} key to {}", provider.label(), p.display());
    Ok(())
}
