use std::env;
use std::fmt;

use crate::error::ConfigError;

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_CONTINUE_ON_ERROR: bool = false;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Any failed turn ends the process.
    Fatal,
    /// A failed turn is reported and the loop keeps going.
    Continue,
}

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub request_timeout_secs: Option<u64>,
    pub max_history_messages: Option<usize>,
    pub error_policy: ErrorPolicy,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_history_messages", &self.max_history_messages)
            .field("error_policy", &self.error_policy)
            .finish()
    }
}

impl Config {
    /// Loads `.env` (if present) into the process environment and reads the
    /// configuration from it.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(err) if err.not_found() => {
                if env::var_os(API_KEY_VAR).is_none() {
                    return Err(ConfigError::MissingSource);
                }
            }
            Err(err) => return Err(ConfigError::DotEnv(err)),
        }
        Ok(Self::from_env())
    }

    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        // The key is passed through untouched; a bad value surfaces as a 401
        // on the first turn.
        let api_key = get_var(API_KEY_VAR).unwrap_or_default();
        let request_timeout_secs = parse_positive(get_var("REQUEST_TIMEOUT_SECS").as_deref());
        let max_history_messages = parse_positive(get_var("MAX_HISTORY_MESSAGES").as_deref());
        let error_policy = parse_error_policy(get_var("CONTINUE_ON_ERROR").as_deref());

        Self {
            api_key,
            model: non_empty(get_var("OPENAI_MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: non_empty(get_var("OPENAI_ENDPOINT"))
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            request_timeout_secs,
            max_history_messages,
            error_policy,
        }
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_positive<T>(raw: Option<&str>) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.and_then(|value| value.trim().parse::<T>().ok())
        .filter(|value| *value > T::default())
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

fn parse_error_policy(raw: Option<&str>) -> ErrorPolicy {
    if parse_bool(raw, DEFAULT_CONTINUE_ON_ERROR) {
        ErrorPolicy::Continue
    } else {
        ErrorPolicy::Fatal
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{
        Config, DEFAULT_ENDPOINT, DEFAULT_MODEL, ErrorPolicy, parse_bool, parse_error_policy,
        parse_positive,
    };

    fn config_from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        Config::from_env_with(|key| vars.get(key).cloned())
    }

    #[test]
    fn from_env_uses_defaults_when_vars_are_missing() {
        let cfg = config_from_pairs(&[]);
        assert_eq!(cfg.api_key, "");
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.request_timeout_secs, None);
        assert_eq!(cfg.max_history_messages, None);
        assert_eq!(cfg.error_policy, ErrorPolicy::Fatal);
    }

    #[test]
    fn from_env_reads_configured_values() {
        let cfg = config_from_pairs(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("OPENAI_ENDPOINT", "http://localhost:8080/v1/chat/completions"),
            ("REQUEST_TIMEOUT_SECS", "15"),
            ("MAX_HISTORY_MESSAGES", " 20 "),
            ("CONTINUE_ON_ERROR", "yes"),
        ]);

        assert_eq!(cfg.api_key, "sk-test");
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.endpoint, "http://localhost:8080/v1/chat/completions");
        assert_eq!(cfg.request_timeout_secs, Some(15));
        assert_eq!(cfg.max_history_messages, Some(20));
        assert_eq!(cfg.error_policy, ErrorPolicy::Continue);
    }

    #[test]
    fn from_env_ignores_blank_model_and_endpoint() {
        let cfg = config_from_pairs(&[("OPENAI_MODEL", "  "), ("OPENAI_ENDPOINT", "")]);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn parse_positive_rejects_missing_zero_and_garbage() {
        assert_eq!(parse_positive::<u64>(None), None);
        assert_eq!(parse_positive::<u64>(Some("")), None);
        assert_eq!(parse_positive::<u64>(Some("0")), None);
        assert_eq!(parse_positive::<u64>(Some("-3")), None);
        assert_eq!(parse_positive::<usize>(Some("ten")), None);
        assert_eq!(parse_positive::<usize>(Some(" 12 ")), Some(12));
    }

    #[test]
    fn parse_bool_respects_truthy_and_falsy_values() {
        assert!(parse_bool(Some("true"), false));
        assert!(parse_bool(Some(" ON "), false));
        assert!(!parse_bool(Some("no"), true));
        assert!(parse_bool(Some("maybe"), true));
        assert!(!parse_bool(None, false));
    }

    #[test]
    fn error_policy_defaults_to_fatal() {
        assert_eq!(parse_error_policy(None), ErrorPolicy::Fatal);
        assert_eq!(parse_error_policy(Some("garbage")), ErrorPolicy::Fatal);
        assert_eq!(parse_error_policy(Some("1")), ErrorPolicy::Continue);
    }

    #[test]
    fn debug_output_never_contains_the_api_key() {
        let cfg = config_from_pairs(&[("OPENAI_API_KEY", "sk-very-secret")]);
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("sk-very-secret"), "leaked key: {rendered}");
        assert!(rendered.contains("<redacted>"));
    }
}
