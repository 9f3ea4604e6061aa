// Per-invocation settings: credentials, base URL and debug mode.
//
// Precedence is flag, then environment, then the token file in the user's
// home directory. The environment is passed in as a lookup function so the
// resolution can be tested without touching the process environment.

use std::path::PathBuf;

use crate::error::ResolveError;

pub const ENV_ACCESS_TOKEN: &str = "SERP_ACCESS_TOKEN";
pub const ENV_ROOT_TOKEN: &str = "SERP_ROOT_TOKEN";
pub const ENV_BASE_URL: &str = "SERP_BASE_URL";
pub const ENV_DEBUG: &str = "SERP_DEBUG";

pub const DEFAULT_BASE_URL: &str = "https://api.serptech.ru/v1";
const TOKEN_FILE: &str = ".serptech_token";

/// Flag values that feed into [`Settings::resolve`].
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub access_token: Option<String>,
    pub root_token: Option<String>,
    pub base_url: Option<String>,
    pub debug: bool,
}

/// Which credential a command authenticates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    /// Access token if one is configured, anonymous otherwise.
    Default,
    /// An access token must be configured.
    Access,
    /// The root token must be configured.
    Root,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub access_token: Option<String>,
    pub root_token: Option<String>,
    pub base_url: String,
    pub debug: bool,
}

impl Settings {
    /// Resolve settings from the real process environment and token file.
    pub fn from_env(overrides: SettingsOverrides) -> Self {
        Self::resolve(overrides, |key| std::env::var(key).ok(), load_token_file)
    }

    pub fn resolve<E, F>(overrides: SettingsOverrides, env: E, token_file: F) -> Self
    where
        E: Fn(&str) -> Option<String>,
        F: FnOnce() -> Option<String>,
    {
        let lookup = |flag: Option<String>, key: &str| {
            flag.or_else(|| env(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let root_token = lookup(overrides.root_token, ENV_ROOT_TOKEN);
        let access_token = lookup(overrides.access_token, ENV_ACCESS_TOKEN)
            .or_else(|| root_token.clone())
            .or_else(|| token_file().filter(|t| !t.is_empty()));
        let base_url = lookup(overrides.base_url, ENV_BASE_URL)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let debug = debug_enabled(overrides.debug, &env);

        Settings {
            access_token,
            root_token,
            base_url,
            debug,
        }
    }

    /// Pick the token a command should authenticate with.
    pub fn token_for(&self, credential: Credential) -> Result<Option<String>, ResolveError> {
        match credential {
            Credential::Default => Ok(self.access_token.clone()),
            Credential::Access => self
                .access_token
                .clone()
                .map(Some)
                .ok_or(ResolveError::MissingCredential(ENV_ACCESS_TOKEN)),
            Credential::Root => self
                .root_token
                .clone()
                .map(Some)
                .ok_or(ResolveError::MissingCredential(ENV_ROOT_TOKEN)),
        }
    }
}

/// `--debug`, or `SERP_DEBUG=true`. Needed before settings are resolved so
/// that logging covers the resolution itself.
pub fn debug_enabled<E>(flag: bool, env: &E) -> bool
where
    E: Fn(&str) -> Option<String>,
{
    flag || env(ENV_DEBUG).is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

fn token_file_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(TOKEN_FILE)
}

/// Load the access token persisted in the user's home directory, if any.
fn load_token_file() -> Option<String> {
    let path = token_file_path();
    let data = std::fs::read_to_string(&path).ok()?;
    log::debug!("using access token from {}", path.display());
    Some(data.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn flags_win_over_environment() {
        let overrides = SettingsOverrides {
            access_token: Some("flag-token".into()),
            base_url: Some("http://localhost:9000/".into()),
            ..Default::default()
        };
        let env = env_of(&[(ENV_ACCESS_TOKEN, "env-token"), (ENV_BASE_URL, "http://x")]);
        let settings = Settings::resolve(overrides, env, || None);
        assert_eq!(settings.access_token.as_deref(), Some("flag-token"));
        assert_eq!(settings.base_url, "http://localhost:9000");
    }

    #[test]
    fn root_token_doubles_as_access_token() {
        let env = env_of(&[(ENV_ROOT_TOKEN, " root ")]);
        let settings = Settings::resolve(SettingsOverrides::default(), env, || {
            Some("file".into())
        });
        assert_eq!(settings.access_token.as_deref(), Some("root"));
        assert_eq!(settings.root_token.as_deref(), Some("root"));
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn token_file_is_last_resort() {
        let settings = Settings::resolve(SettingsOverrides::default(), env_of(&[]), || {
            Some("from-file".into())
        });
        assert_eq!(settings.access_token.as_deref(), Some("from-file"));
        assert_eq!(settings.root_token, None);
    }

    #[test]
    fn debug_from_env() {
        let settings = Settings::resolve(
            SettingsOverrides::default(),
            env_of(&[(ENV_DEBUG, "TRUE")]),
            || None,
        );
        assert!(settings.debug);
    }

    #[test]
    fn debug_needs_flag_or_true() {
        assert!(debug_enabled(true, &env_of(&[])));
        assert!(!debug_enabled(false, &env_of(&[(ENV_DEBUG, "1")])));
        assert!(!debug_enabled(false, &env_of(&[])));
    }

    #[test]
    fn required_credentials() {
        let settings = Settings::resolve(SettingsOverrides::default(), env_of(&[]), || None);
        assert_eq!(settings.token_for(Credential::Default), Ok(None));
        assert_eq!(
            settings.token_for(Credential::Root),
            Err(ResolveError::MissingCredential(ENV_ROOT_TOKEN))
        );
        assert_eq!(
            settings.token_for(Credential::Access),
            Err(ResolveError::MissingCredential(ENV_ACCESS_TOKEN))
        );
    }
}
