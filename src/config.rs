//! Server settings read from environment variables.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use crate::{
    client::{API_KEY_ENV, DEFAULT_MODEL_URL, MODEL_URL_ENV},
    AnnounceError, AnnouncementClient, ClientOptions, Result, RetryPolicy,
};

pub const BIND_ADDR_ENV: &str = "ANNOUNCE_BIND_ADDR";
pub const MAX_ATTEMPTS_ENV: &str = "ANNOUNCE_MAX_ATTEMPTS";
pub const RETRY_BACKOFF_ENV: &str = "ANNOUNCE_RETRY_BACKOFF_MS";
pub const TIMEOUT_ENV: &str = "ANNOUNCE_TIMEOUT_MS";
pub const DEADLINE_ENV: &str = "ANNOUNCE_DEADLINE_SECS";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DEADLINE_SECS: u64 = 120;

#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub model_url: String,
    pub api_key: String,
    pub options: ClientOptions,
    /// Upper bound on one generation request, loading waits included.
    pub generation_deadline: Duration,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("model_url", &self.model_url)
            .field("api_key", &"<redacted>")
            .field("options", &self.options)
            .field("generation_deadline", &self.generation_deadline)
            .finish()
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// `HUGGINGFACE_API_KEY` is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = get(API_KEY_ENV).ok_or_else(|| {
            AnnounceError::Config(format!("missing {API_KEY_ENV} environment variable"))
        })?;
        let model_url = get(MODEL_URL_ENV).unwrap_or_else(|| DEFAULT_MODEL_URL.to_owned());
        let bind_addr: SocketAddr = parse_or(get(BIND_ADDR_ENV), BIND_ADDR_ENV, DEFAULT_BIND_ADDR)?;

        let defaults = ClientOptions::default();
        let options = ClientOptions {
            timeout_ms: parse_or(get(TIMEOUT_ENV), TIMEOUT_ENV, defaults.timeout_ms)?,
            retry: RetryPolicy {
                max_attempts: parse_or(
                    get(MAX_ATTEMPTS_ENV),
                    MAX_ATTEMPTS_ENV,
                    defaults.retry.max_attempts,
                )?,
                base_backoff_ms: parse_or(
                    get(RETRY_BACKOFF_ENV),
                    RETRY_BACKOFF_ENV,
                    defaults.retry.base_backoff_ms,
                )?,
            },
        };
        if options.retry.max_attempts == 0 {
            return Err(AnnounceError::Config(format!(
                "{MAX_ATTEMPTS_ENV} must be at least 1"
            )));
        }

        let deadline_secs: u64 = parse_or(get(DEADLINE_ENV), DEADLINE_ENV, DEFAULT_DEADLINE_SECS)?;

        Ok(Self {
            bind_addr,
            model_url,
            api_key,
            options,
            generation_deadline: Duration::from_secs(deadline_secs),
        })
    }

    /// Builds the announcement client described by this configuration.
    pub fn client(&self) -> AnnouncementClient {
        AnnouncementClient::new(&self.model_url, &self.api_key).with_options(self.options.clone())
    }
}

fn parse_or<T, D>(value: Option<String>, name: &str, default: D) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    D: ToString,
{
    let raw = value.unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|err| AnnounceError::Config(format!("invalid {name} '{raw}': {err}")))
}
