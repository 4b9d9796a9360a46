use crate::OuraError;
use crate::http_client::DEFAULT_BASE_URL;
use secrecy::SecretString;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub access_token: SecretString,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, OuraError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function, so tests don't have to touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, OuraError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let token = get("OURA_ACCESS_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| OuraError::Config("OURA_ACCESS_TOKEN missing".into()))?;
        let base_url = get("OURA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout = match get("OURA_TIMEOUT_SECS") {
            None => None,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(OuraError::Config(format!(
                        "OURA_TIMEOUT_SECS must be a positive integer, got {raw:?}"
                    )));
                }
            },
        };
        Ok(Self {
            access_token: SecretString::new(token.into()),
            base_url,
            timeout,
        })
    }
}
