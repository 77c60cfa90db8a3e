use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use sift_core::{
    FeedbackAction, FeedbackEvent, OrderingSource, SignalThresholds, SuggestionPolicy,
    TaskCategory, build_analysis_prompt, extract_signals_with, finish_suggestion, local_hour,
    local_weekday, parse_analysis, prepare_suggestion, rank_tasks, to_prompt_string,
};
use std::path::PathBuf;

mod auth;
mod config;
mod llm;
mod state;

#[derive(Parser, Debug)]
#[command(name = "sift", version, about = "Task suggestions with bounded model reordering")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print tasks in baseline (score) order with the score breakdown
    Score {
        /// Tasks JSON (defaults to ~/.sift/tasks.json)
        #[arg(long)]
        tasks: Option<PathBuf>,
    },

    /// Print behavioral signals and the prompt context they produce
    Signals,

    /// Suggest an order: baseline + model proposal, sanitized and clamped
    Suggest {
        #[arg(long)]
        tasks: Option<PathBuf>,

        /// Override suggest.max_displacement
        #[arg(long)]
        max_displacement: Option<usize>,

        /// Skip the model and print the baseline order
        #[arg(long)]
        offline: bool,

        /// Print the prompt sent to the model
        #[arg(long)]
        show_prompt: bool,
    },

    /// Ask the model to estimate and break down a task
    Analyze {
        title: String,
    },

    /// Append a feedback event to the log
    Feedback {
        task_id: String,
        /// e.g. started_immediately, wrong_time, snooze_1h
        action: FeedbackAction,
        /// Category name or ordinal
        category: TaskCategory,
        /// Score the task had when suggested
        #[arg(long, default_value_t = 0.0)]
        score: f64,
    },

    /// Record a task completion in the completion patterns
    Complete {
        category: TaskCategory,
        #[arg(long)]
        minutes: Option<f64>,
    },

    /// Configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store model credentials
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.sift/config.toml with defaults
    Init,
    /// Print the effective configuration
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    PasteAnthropicToken,
    PasteOpenaiApiKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Score { tasks } => score(tasks)?,
        Command::Signals => signals()?,
        Command::Suggest {
            tasks,
            max_displacement,
            offline,
            show_prompt,
        } => suggest(tasks, max_displacement, offline, show_prompt).await?,
        Command::Analyze { title } => analyze(&title).await?,
        Command::Feedback {
            task_id,
            action,
            category,
            score,
        } => {
            let cfg = config::load_config()?;
            let now = Utc::now();
            let hour = local_hour(now, &cfg.suggest.timezone)?;
            let event = FeedbackEvent::new(task_id, action, category, hour, now).with_score(score);
            let total = state::append_feedback(event)?;
            println!("Recorded {} ({} events in log)", action.tag(), total);
        }
        Command::Complete { category, minutes } => {
            let cfg = config::load_config()?;
            let now = Utc::now();
            let tz = &cfg.suggest.timezone;
            let patterns = state::read_patterns()?;
            let next = patterns.record_completion(
                category,
                now,
                local_hour(now, tz)?,
                local_weekday(now, tz)?,
                minutes,
            );
            state::write_patterns(&next)?;
            println!("Recorded {} completion (patterns v{})", category, next.version);
        }
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
        Command::Auth { command } => match command {
            AuthCommand::PasteAnthropicToken => auth::paste_key(llm::Provider::Anthropic)?,
            AuthCommand::PasteOpenaiApiKey => auth::paste_key(llm::Provider::OpenAI)?,
        },
    }

    Ok(())
}

fn thresholds(cfg: &config::Config) -> SignalThresholds {
    SignalThresholds {
        lookback_days: cfg.suggest.lookback_days,
        ..SignalThresholds::default()
    }
}

fn score(tasks: Option<PathBuf>) -> Result<()> {
    let tasks = state::read_tasks(tasks.as_deref())?;
    if tasks.is_empty() {
        bail!("no tasks found (pass --tasks <file> or write ~/.sift/tasks.json)");
    }

    let now = Utc::now();
    for (i, r) in rank_tasks(&tasks, now).iter().enumerate() {
        let s = r.score;
        println!(
            "{:>2}. {:>5.1} | due={:.1} prio={:.0} age={:.0} quick={:.0} | {} [{}]",
            i + 1,
            s.total(),
            s.due_date,
            s.explicit_priority,
            s.age,
            s.quick_win,
            r.task.title,
            r.task.category
        );
    }
    Ok(())
}

fn signals() -> Result<()> {
    let cfg = config::load_config()?;
    let events = state::read_feedback()?;
    let patterns = state::read_patterns()?;

    let signals = extract_signals_with(&events, &patterns, Utc::now(), &thresholds(&cfg));
    println!("{}", serde_json::to_string_pretty(&signals)?);

    let ctx = to_prompt_string(&signals);
    if ctx.is_empty() {
        println!("\n(no prompt context: not enough history or no strong signal)");
    } else {
        println!("\n{ctx}");
    }
    Ok(())
}

async fn suggest(
    tasks: Option<PathBuf>,
    max_displacement: Option<usize>,
    offline: bool,
    show_prompt: bool,
) -> Result<()> {
    let cfg = config::load_config()?;
    let tasks = state::read_tasks(tasks.as_deref())?;
    if tasks.is_empty() {
        bail!("no tasks found (pass --tasks <file> or write ~/.sift/tasks.json)");
    }
    let events = state::read_feedback()?;
    let patterns = state::read_patterns()?;

    let policy = SuggestionPolicy {
        max_displacement: max_displacement.unwrap_or(cfg.suggest.max_displacement),
        max_tasks: cfg.suggest.max_tasks,
        thresholds: thresholds(&cfg),
    };

    let prepared = prepare_suggestion(&tasks, &events, &patterns, Utc::now(), policy);
    if show_prompt {
        println!("--- prompt ---\n{}\n--------------\n", prepared.prompt);
    }

    let reply = if offline || prepared.window() < 2 {
        None
    } else {
        let llm_cfg = llm::LlmConfig::from_section(&cfg.llm)?;
        match llm::complete(&llm_cfg, &prepared.prompt).await {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("model unavailable, keeping baseline: {e:#}");
                None
            }
        }
    };

    let suggestion = finish_suggestion(&prepared, reply.as_deref());
    let label = match suggestion.source {
        OrderingSource::Baseline => "baseline",
        OrderingSource::Proposal => "model (bounded)",
    };
    println!("Suggested order ({label}, max move {}):\n", policy.max_displacement);
    for (i, id) in suggestion.task_ids.iter().enumerate() {
        let title = tasks
            .iter()
            .find(|t| &t.id == id)
            .map(|t| t.title.as_str())
            .unwrap_or("?");
        println!("{:>2}. {} ({})", i + 1, title, id);
    }
    Ok(())
}

async fn analyze(title: &str) -> Result<()> {
    let cfg = config::load_config()?;
    let events = state::read_feedback()?;
    let patterns = state::read_patterns()?;
    let signals = extract_signals_with(&events, &patterns, Utc::now(), &thresholds(&cfg));
    let prompt = build_analysis_prompt(title, &to_prompt_string(&signals));

    let llm_cfg = llm::LlmConfig::from_section(&cfg.llm)?;
    let reply = match llm::complete(&llm_cfg, &prompt).await {
        Ok(text) => text,
        Err(e) => {
            log::warn!("model unavailable, using fallback analysis: {e:#}");
            String::new()
        }
    };

    let analysis = parse_analysis(&reply);
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}
