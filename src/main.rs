use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use itertools::Itertools;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use echodrill::activity::ActivityKind;
use echodrill::backend::HttpSessionStore;
use echodrill::config::{Config, ConfigStore, FileConfigStore};
use echodrill::drill::{PronunciationDrill, ScoreBand};
use echodrill::history::{AttemptRecord, HistoryDb};
use echodrill::prompts;
use echodrill::scoring::{score, Outcome, ScoringResult};
use echodrill::session::PracticeSession;

#[derive(Parser)]
#[command(name = "echodrill", version, about = "word-match scoring and practice drills for language learning")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score an observed transcript against an expected text
    Score {
        /// The expected (reference) text
        expected: String,
        /// The observed (recognized or typed) text
        observed: String,
        /// Emit the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a read-aloud drill, scoring transcripts line by line from stdin
    Drill {
        /// Prompt to practice; a built-in sentence is picked when omitted
        #[arg(short, long)]
        prompt: Option<String>,
        /// Backend activity id to record this attempt against
        #[arg(short, long)]
        activity: Option<String>,
        /// Pass threshold in [0,1]; overrides the configured value
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Skip the backend entirely, keeping only local history
        #[arg(long)]
        offline: bool,
    },
    /// Show or export the local attempt history
    History {
        /// Number of attempts to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        /// Write the full history as CSV to this path instead
        #[arg(long)]
        export: Option<PathBuf>,
        /// Show per-activity-kind aggregates instead of raw attempts
        #[arg(long)]
        summary: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = FileConfigStore::new().load();

    match cli.command {
        Command::Score {
            expected,
            observed,
            json,
        } => run_score(&expected, &observed, json),
        Command::Drill {
            prompt,
            activity,
            threshold,
            offline,
        } => run_drill(&config, prompt, activity, threshold, offline).await,
        Command::History {
            limit,
            export,
            summary,
        } => run_history(limit, export, summary),
    }
}

fn render_verdicts(result: &ScoringResult) -> String {
    // Missed words are bracketed so the line stays readable without color.
    result
        .verdicts
        .iter()
        .map(|v| match v.outcome {
            Outcome::Correct => v.token.clone(),
            Outcome::Incorrect => format!("[{}]", v.token),
        })
        .join(" ")
}

fn run_score(expected: &str, observed: &str, json: bool) -> anyhow::Result<()> {
    let result = score(expected, observed);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_verdicts(&result));
        println!(
            "{:.0}% ({}/{} words)",
            result.score * 100.0,
            result.matched(),
            result.expected_len()
        );
    }

    Ok(())
}

async fn run_drill(
    config: &Config,
    prompt: Option<String>,
    activity: Option<String>,
    threshold: Option<f64>,
    offline: bool,
) -> anyhow::Result<()> {
    let prompt = prompt.unwrap_or_else(|| prompts::random_prompt().to_string());
    let threshold = threshold.unwrap_or(config.pass_threshold);
    let mut drill = PronunciationDrill::new(&prompt);

    // Backend session is optional: a failed begin degrades to local-only.
    let mut session = match (&activity, offline || config.offline) {
        (Some(activity_id), false) => {
            let mut store = HttpSessionStore::new(&config.backend_url, &config.user_id);
            if let Ok(token) = std::env::var("ECHODRILL_TOKEN") {
                store = store.with_bearer_token(token);
            }
            let mut session = PracticeSession::new(store, activity_id.clone());
            if session.begin().await.is_none() {
                eprintln!("could not reach the backend; progress will stay local");
            }
            Some(session)
        }
        _ => None,
    };

    println!("Read aloud, then type what the recognizer heard.");
    println!("Empty line finishes the drill.\n");
    println!("  {prompt}\n");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read transcript")?;
        let transcript = line.trim();
        if transcript.is_empty() {
            break;
        }

        let result = drill.observe(transcript);
        println!("  {}", render_verdicts(&result));
        println!(
            "  {:.0}% ({})\n",
            result.score * 100.0,
            ScoreBand::from_score(result.score)
        );
        io::stdout().flush().ok();
    }

    if drill.attempts() == 0 {
        println!("no transcripts; drill discarded");
        return Ok(());
    }

    let passed = drill.passed(threshold);
    println!(
        "best: {:.0}% ({}) after {} attempt(s) -- {}",
        drill.best_score() * 100.0,
        drill.band(),
        drill.attempts(),
        if passed { "passed" } else { "keep practicing" }
    );

    if let Some(session) = session.as_mut() {
        session.complete(drill.final_score()).await;
    }

    match HistoryDb::new() {
        Ok(db) => {
            let best = drill.best_result().expect("attempts > 0");
            let record = AttemptRecord {
                activity_kind: ActivityKind::Pronunciation,
                activity_id: activity.unwrap_or_else(|| "adhoc".to_string()),
                score: drill.final_score(),
                tokens_total: best.expected_len() as u32,
                tokens_matched: best.matched() as u32,
                timestamp: Local::now(),
            };
            if let Err(err) = db.record_attempt(&record) {
                eprintln!("could not record attempt locally: {err}");
            }
        }
        Err(err) => eprintln!("history database unavailable: {err}"),
    }

    Ok(())
}

fn run_history(limit: usize, export: Option<PathBuf>, summary: bool) -> anyhow::Result<()> {
    let db = HistoryDb::new().context("could not open history database")?;

    if let Some(path) = export {
        let mut file = std::fs::File::create(&path)
            .with_context(|| format!("could not create {}", path.display()))?;
        db.export_csv(&mut file)?;
        println!("exported history to {}", path.display());
        return Ok(());
    }

    if summary {
        let rows = db.kind_summary()?;
        if rows.is_empty() {
            println!("no attempts recorded yet");
            return Ok(());
        }
        for row in rows {
            println!(
                "{:<14} {:>4} attempt(s)  avg {:>5.1}  best {:>5.1}",
                row.activity_kind.to_string(),
                row.attempts,
                row.avg_score,
                row.best_score
            );
        }
        return Ok(());
    }

    let attempts = db.recent(limit)?;
    if attempts.is_empty() {
        println!("no attempts recorded yet");
        return Ok(());
    }
    for attempt in attempts {
        println!(
            "{}  {:<14} {:<12} {:>5.1} ({}/{} words)",
            attempt.timestamp.format("%Y-%m-%d %H:%M"),
            attempt.activity_kind.to_string(),
            attempt.activity_id,
            attempt.score,
            attempt.tokens_matched,
            attempt.tokens_total
        );
    }

    Ok(())
}
