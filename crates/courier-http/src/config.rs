use std::time::Duration;

use crate::errors::ConfigError;
use crate::policy::SuccessPolicy;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("courier/", env!("CARGO_PKG_VERSION"));

pub const ENV_SUCCESS_STATUS: &str = "COURIER_SUCCESS_STATUS";
pub const ENV_TIMEOUT_MS: &str = "COURIER_TIMEOUT_MS";
pub const ENV_USER_AGENT: &str = "COURIER_USER_AGENT";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub success_policy: SuccessPolicy,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            success_policy: SuccessPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl DispatcherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = read(ENV_SUCCESS_STATUS) {
            config.success_policy = raw.parse()?;
        }
        if let Some(raw) = read(ENV_TIMEOUT_MS) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|millis| *millis > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_MS,
                    value: raw.clone(),
                })?;
            config.timeout = Duration::from_millis(millis);
        }
        if let Some(raw) = read(ENV_USER_AGENT) {
            config.user_agent = raw.trim().to_string();
        }

        Ok(config)
    }
}
