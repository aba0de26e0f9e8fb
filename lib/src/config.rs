use std::time::Duration;

use tracing::{error, warn};

use crate::env_keys::{PRACTICUM_TOKEN, RETRY_TIME, TELEGRAM_CHAT_ID, TELEGRAM_TOKEN};

pub const ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_RETRY_TIME: Duration = Duration::from_secs(600);


/// Immutable process configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    /// Homework statuses endpoint. Only tests point this elsewhere.
    pub endpoint: String,
    /// Bot API base URL, without the `/bot<token>` suffix.
    pub telegram_api_url: String,
    /// Pause between two polls, whatever the outcome of the first.
    pub retry_time: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    ///
    /// Missing tokens become empty strings; `check_tokens` decides whether
    /// the process may start.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let retry_time = match lookup(RETRY_TIME) {
            None => DEFAULT_RETRY_TIME,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(seconds) => Duration::from_secs(seconds),
                Err(parse_error) => {
                    warn!(value = %raw, error = %parse_error, "{} is not a number of seconds, using default", RETRY_TIME);
                    DEFAULT_RETRY_TIME
                }
            },
        };

        Self {
            practicum_token: lookup(PRACTICUM_TOKEN).unwrap_or_default(),
            telegram_token: lookup(TELEGRAM_TOKEN).unwrap_or_default(),
            telegram_chat_id: lookup(TELEGRAM_CHAT_ID).unwrap_or_default(),
            endpoint: ENDPOINT.to_owned(),
            telegram_api_url: TELEGRAM_API_URL.to_owned(),
            retry_time,
        }
    }
}

/// Returns false when any required credential is empty, logging each one that is.
pub fn check_tokens(config: &Config) -> bool {
    let required = [
        (PRACTICUM_TOKEN, &config.practicum_token),
        (TELEGRAM_TOKEN, &config.telegram_token),
        (TELEGRAM_CHAT_ID, &config.telegram_chat_id),
    ];

    let mut available = true;
    for (key, value) in required {
        if value.trim().is_empty() {
            error!(severity = "CRITICAL", "Missing required environment variable '{}', shutting down", key);
            available = false;
        }
    }
    available
}
