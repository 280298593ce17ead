use std::time::Duration;

pub const HTTP_TIMEOUT_ENV: &str = "NOTIFY_RELAY_HTTP_TIMEOUT_SECS";
pub const USER_AGENT_ENV: &str = "NOTIFY_RELAY_USER_AGENT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("NOTIFY_RELAY_HTTP_TIMEOUT_SECS must be a positive integer, got '{0}'")]
    InvalidTimeout(String),

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Runtime settings shared by the forward and acknowledgment calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub http_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            http_timeout: None,
            user_agent: default_user_agent(),
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let http_timeout = match lookup(HTTP_TIMEOUT_ENV) {
            Some(raw) if !raw.trim().is_empty() => {
                let seconds = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|seconds| *seconds > 0)
                    .ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?;
                Some(Duration::from_secs(seconds))
            }
            _ => None,
        };

        let user_agent = lookup(USER_AGENT_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(default_user_agent);

        Ok(Self {
            http_timeout,
            user_agent,
        })
    }

    pub fn build_http_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.clone());
        if let Some(timeout) = self.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

fn default_user_agent() -> String {
    format!("notify-relay/{}", env!("CARGO_PKG_VERSION"))
}
