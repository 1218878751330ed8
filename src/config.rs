use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub gmail: GmailConfig,
    pub poll: PollConfig,
    pub slack: Option<SlackConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GmailConfig {
    pub credentials_path: String,
    pub token_cache_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    pub interval_secs: u64,
    /// Upper bound on remembered message ids (None = unbounded)
    pub seen_capacity: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub channel_id: String,
}

const DEFAULT_INTERVAL_SECS: u64 = 30;

impl Config {
    /// Configuration loaded from environment variables
    pub fn new() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_secs = match lookup("POLL_INTERVAL_SECS") {
            Some(raw) => parse_positive(&raw, "POLL_INTERVAL_SECS")?,
            None => DEFAULT_INTERVAL_SECS,
        };

        let seen_capacity = lookup("SEEN_CAPACITY")
            .map(|raw| parse_positive(&raw, "SEEN_CAPACITY"))
            .transpose()?
            .map(|capacity| {
                usize::try_from(capacity)
                    .with_context(|| format!("SEEN_CAPACITY {} is too large for this platform", capacity))
            })
            .transpose()?;

        Ok(Config {
            gmail: GmailConfig {
                credentials_path: lookup("GMAIL_CREDENTIALS_PATH")
                    .unwrap_or_else(|| "./credentials.json".to_string()),
                token_cache_path: lookup("GMAIL_TOKEN_CACHE_PATH")
                    .unwrap_or_else(|| "./gmail-token-cache.json".to_string()),
            },
            poll: PollConfig {
                interval_secs,
                seen_capacity,
            },
            slack: match (lookup("SLACK_BOT_TOKEN"), lookup("SLACK_CHANNEL_ID")) {
                (Some(bot_token), Some(channel_id)) => Some(SlackConfig {
                    bot_token,
                    channel_id,
                }),
                _ => {
                    log::debug!("SLACK_BOT_TOKEN or SLACK_CHANNEL_ID not set - Slack notifications disabled");
                    None
                }
            },
        })
    }
}

fn parse_positive(raw: &str, var: &str) -> Result<u64> {
    let value: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a positive integer, got '{}'", var, raw))?;

    if value == 0 {
        anyhow::bail!("{} must be at least 1", var);
    }

    Ok(value)
}
