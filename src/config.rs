//! Runtime configuration - CLI flags with environment fallbacks

use std::time::Duration;

use clap::Args;

use crate::ai::{AiClient, AiError, Credentials, DEFAULT_TIMEOUT_SECS};
use crate::store::UserProfile;

pub const DEFAULT_DB_PATH: &str = "ketoday.db";

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// SQLite database file
    #[arg(long, env = "KETODAY_DB", default_value = DEFAULT_DB_PATH, global = true)]
    pub db: String,

    /// AI endpoint URL
    #[arg(long, env = "KETODAY_AI_ENDPOINT", default_value = "", global = true)]
    pub ai_endpoint: String,

    /// AI user (overrides the profile setting)
    #[arg(long, env = "KETODAY_AI_USER", global = true)]
    pub ai_user: Option<String>,

    /// AI password (overrides the profile setting)
    #[arg(long, env = "KETODAY_AI_PASS", hide_env_values = true, global = true)]
    pub ai_pass: Option<String>,

    /// AI request timeout in seconds
    #[arg(long, env = "KETODAY_AI_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub ai_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db: DEFAULT_DB_PATH.to_string(),
            ai_endpoint: String::new(),
            ai_user: None,
            ai_pass: None,
            ai_timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Environment/CLI credentials win over the ones saved in the profile
    pub fn credentials(&self, profile: &UserProfile) -> Option<Credentials> {
        let user = self.ai_user.as_deref().or(profile.ai_user.as_deref());
        let pass = self.ai_pass.as_deref().or(profile.ai_pass.as_deref());
        Credentials::from_parts(user, pass)
    }

    pub fn ai_client(&self, profile: &UserProfile) -> Result<AiClient, AiError> {
        AiClient::new(
            self.ai_endpoint.clone(),
            self.credentials(profile),
            Duration::from_secs(self.ai_timeout.max(1)),
            profile.language,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_credentials_win() {
        let cfg = Config {
            ai_user: Some("cli".into()),
            ..Default::default()
        };
        let profile = UserProfile {
            ai_user: Some("saved".into()),
            ai_pass: Some("pw".into()),
            ..Default::default()
        };
        let creds = cfg.credentials(&profile).unwrap();
        assert_eq!(creds.user, "cli");
        assert_eq!(creds.pass, "pw");
    }

    #[test]
    fn test_no_credentials() {
        let cfg = Config::default();
        assert!(cfg.credentials(&UserProfile::default()).is_none());
    }
}
