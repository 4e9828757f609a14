//! Command-line interface for reveille.
//!
//! Provides commands for driving the call lifecycle (start, transcript,
//! end, show), inspecting snooze state, and minting realtime session
//! credentials.

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::adapters::{RealtimeClient, StaticAlarmRegistry};
use crate::config::ResolvedConfig;
use crate::core::{CallLifecycle, SessionIssuer};
use crate::domain::{AlarmContext, CallOutcome, Utterance, Voice};
use crate::store::SqliteCallStore;

/// reveille - wake-up call lifecycle core
#[derive(Parser, Debug)]
#[command(name = "reveille")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a call for a user
    Start {
        /// User id
        #[arg(short, long)]
        user: i64,
    },

    /// Save a transcript for an open call (JSON array of utterances)
    Transcript {
        /// User id
        #[arg(short, long)]
        user: i64,

        /// Call id (UUID)
        #[arg(short, long)]
        call: String,

        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// End an open call
    End {
        /// User id
        #[arg(short, long)]
        user: i64,

        /// Call id (UUID)
        #[arg(short, long)]
        call: String,

        /// Requested outcome (may be overridden by snooze policy)
        #[arg(short, long, value_enum)]
        result: OutcomeArg,

        /// Snooze count reported by the client (clamped to 0..=3)
        #[arg(short, long, default_value = "0")]
        snooze: i64,

        /// End timestamp (RFC 3339; defaults to now)
        #[arg(long)]
        ended_at: Option<String>,
    },

    /// Show the details of a call
    Show {
        /// User id
        #[arg(short, long)]
        user: i64,

        /// Call id (UUID)
        #[arg(short, long)]
        call: String,
    },

    /// Show the snooze count of the user's open call
    SnoozeCount {
        /// User id
        #[arg(short, long)]
        user: i64,
    },

    /// Mint a realtime session credential for an alarm
    Session {
        /// User id
        #[arg(short, long)]
        user: i64,

        /// Alarm id
        #[arg(short, long)]
        alarm: i64,

        /// Assistant voice
        #[arg(short, long, default_value = "alloy")]
        voice: String,

        /// Base persona instructions
        #[arg(short, long)]
        instructions: String,

        /// Explicit snooze count (otherwise taken from the open call)
        #[arg(short, long)]
        snooze: Option<i64>,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Requested call outcome
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutcomeArg {
    Success,
    FailNoTalk,
    FailSnooze,
}

impl From<OutcomeArg> for CallOutcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Success => CallOutcome::Success,
            OutcomeArg::FailNoTalk => CallOutcome::FailNoTalk,
            OutcomeArg::FailSnooze => CallOutcome::FailSnooze,
        }
    }
}

fn parse_call_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).with_context(|| format!("Invalid call id: {}", value))
}

fn parse_ended_at(value: Option<&str>) -> Result<DateTime<Utc>> {
    match value {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid RFC 3339 timestamp: {}", raw))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn open_lifecycle(config: &ResolvedConfig) -> Result<CallLifecycle> {
    let store = SqliteCallStore::open(&config.database)
        .with_context(|| format!("Failed to open call store: {}", config.database.display()))?;
    Ok(CallLifecycle::new(Arc::new(store)))
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = ResolvedConfig::load()?;

        match self.command {
            Commands::Start { user } => {
                let lifecycle = open_lifecycle(&config)?;
                let record = lifecycle.start_call(user)?;
                println!("Started call {} for user {}", record.id, user);
                println!("  started_at: {}", record.started_at.to_rfc3339());
            }

            Commands::Transcript { user, call, input } => {
                let call_id = parse_call_id(&call)?;
                let raw = match input {
                    Some(path) => std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                    None => {
                        let mut buf = String::new();
                        io::stdin()
                            .read_to_string(&mut buf)
                            .context("Failed to read stdin")?;
                        buf
                    }
                };
                let utterances: Vec<Utterance> =
                    serde_json::from_str(&raw).context("Transcript must be a JSON utterance array")?;

                let lifecycle = open_lifecycle(&config)?;
                lifecycle.append_transcript(user, call_id, &utterances)?;
                println!("Saved {} utterance(s) to call {}", utterances.len(), call_id);
            }

            Commands::End {
                user,
                call,
                result,
                snooze,
                ended_at,
            } => {
                let call_id = parse_call_id(&call)?;
                let ended_at = parse_ended_at(ended_at.as_deref())?;

                let lifecycle = open_lifecycle(&config)?;
                lifecycle.end_call(user, call_id, ended_at, result.into(), snooze)?;

                let detail = lifecycle.call_detail(user, call_id)?;
                println!(
                    "Ended call {}: outcome={}, snooze_count={}",
                    call_id,
                    detail.outcome.as_str(),
                    detail.snooze_count
                );
            }

            Commands::Show { user, call } => {
                let call_id = parse_call_id(&call)?;
                let lifecycle = open_lifecycle(&config)?;
                let detail = lifecycle.call_detail(user, call_id)?;
                println!("{}", serde_json::to_string_pretty(&detail)?);
            }

            Commands::SnoozeCount { user } => {
                let lifecycle = open_lifecycle(&config)?;
                println!("{}", lifecycle.open_call_snooze_count(user));
            }

            Commands::Session {
                user,
                alarm,
                voice,
                instructions,
                snooze,
            } => {
                let voice = Voice::from_value(&voice)?;

                let registry = StaticAlarmRegistry::new();
                registry.insert(user, alarm, AlarmContext::new(voice, instructions));

                let provider = RealtimeClient::new(
                    &config.realtime_url,
                    &config.api_key,
                    config.connect_timeout,
                    config.request_timeout,
                )?;

                let lifecycle = open_lifecycle(&config)?;
                let issuer = SessionIssuer::new(
                    Arc::new(registry),
                    Arc::new(lifecycle),
                    Arc::new(provider),
                    &config.model,
                );

                let credential = issuer.create_session_credential(user, alarm, snooze).await?;
                println!("session_id:  {}", credential.session_id);
                println!("ephemeral:   {}", credential.ephemeral_key);
                println!("expires_in:  {}s", credential.expires_in_seconds);
            }

            Commands::Config => {
                println!("database:        {}", config.database.display());
                println!("realtime_url:    {}", config.realtime_url);
                println!("model:           {}", config.model);
                println!(
                    "api_key:         {}",
                    if config.api_key.is_empty() { "(unset)" } else { "(set)" }
                );
                println!("connect_timeout: {:?}", config.connect_timeout);
                println!("request_timeout: {:?}", config.request_timeout);
            }
        }

        Ok(())
    }
}
