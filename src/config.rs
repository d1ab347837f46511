//! Configuration management for the quest bot

use std::path::PathBuf;

use secrecy::SecretString;

use crate::language::Language;
use crate::reasoning::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::{Error, Result};

/// Quest bot configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token (`API_TOKEN`)
    pub bot_token: SecretString,

    /// Reasoning service key (`MISTRAL_API_KEY`)
    pub reasoning_key: SecretString,

    /// Chat completions endpoint
    pub reasoning_url: String,

    /// Model identifier sent with every completion request
    pub reasoning_model: String,

    /// Profile database file
    pub profile_db_path: PathBuf,

    /// Language given to new profiles
    pub default_language: Language,

    /// Tesseract binary; `None` resolves `tesseract` from `PATH`
    pub tesseract_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a required credential is missing or a value is invalid
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns error if a required credential is missing or a value is invalid
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key)
                .map(SecretString::from)
                .ok_or_else(|| Error::Config(format!("{key} is not set")))
        };

        let bot_token = required("API_TOKEN")?;
        let reasoning_key = required("MISTRAL_API_KEY")?;

        let default_language = var("DEFAULT_LANGUAGE")
            .map(|v| v.parse::<Language>())
            .transpose()?
            .unwrap_or_default();

        let profile_db_path = var("PROFILE_DB_PATH")
            .map_or_else(default_profile_db_path, PathBuf::from);

        Ok(Self {
            bot_token,
            reasoning_key,
            reasoning_url: var("MISTRAL_API_URL").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            reasoning_model: var("MISTRAL_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            profile_db_path,
            default_language,
            tesseract_path: var("TESSERACT_PATH").map(PathBuf::from),
        })
    }
}

/// Platform data directory (`~/.local/share/quest/profiles.db` on Linux)
fn default_profile_db_path() -> PathBuf {
    directories::ProjectDirs::from("dev", "quest", "quest").map_or_else(
        || PathBuf::from("profiles.db"),
        |d| d.data_dir().join("profiles.db"),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    const CREDENTIALS: [(&str, &str); 2] = [("API_TOKEN", "tg"), ("MISTRAL_API_KEY", "mk")];

    #[test]
    fn defaults_apply() {
        let config = load(&CREDENTIALS).unwrap();

        assert_eq!(config.bot_token.expose_secret(), "tg");
        assert_eq!(config.reasoning_key.expose_secret(), "mk");
        assert_eq!(config.default_language, Language::Ru);
        assert_eq!(config.reasoning_url, DEFAULT_ENDPOINT);
        assert_eq!(config.reasoning_model, DEFAULT_MODEL);
        assert!(config.tesseract_path.is_none());
        assert!(config.profile_db_path.ends_with("profiles.db"));
    }

    #[test]
    fn missing_credential_is_fatal() {
        let err = load(&[("API_TOKEN", "tg")]).unwrap_err();
        assert!(err.to_string().contains("MISTRAL_API_KEY"));

        let err = load(&[("API_TOKEN", "  "), ("MISTRAL_API_KEY", "mk")]).unwrap_err();
        assert!(err.to_string().contains("API_TOKEN"));
    }

    #[test]
    fn overrides_are_read() {
        let mut vars = CREDENTIALS.to_vec();
        vars.extend([
            ("DEFAULT_LANGUAGE", "EN"),
            ("PROFILE_DB_PATH", "/tmp/p.db"),
            ("TESSERACT_PATH", "/opt/tesseract"),
            ("MISTRAL_MODEL", "mistral-small"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.default_language, Language::En);
        assert_eq!(config.profile_db_path, PathBuf::from("/tmp/p.db"));
        assert_eq!(config.tesseract_path, Some(PathBuf::from("/opt/tesseract")));
        assert_eq!(config.reasoning_model, "mistral-small");
    }

    #[test]
    fn unsupported_default_language_is_rejected() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push(("DEFAULT_LANGUAGE", "fr"));
        assert!(matches!(load(&vars), Err(Error::Config(_))));
    }

    #[test]
    fn debug_hides_credentials() {
        let config = load(&CREDENTIALS).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("\"tg\""));
        assert!(!debug.contains("\"mk\""));
    }
}
