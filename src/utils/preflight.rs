//! Preflight validation checks for early failure detection
//!
//! Decides up front whether a run talks to Gemini or falls back to the
//! offline heuristic summary, so commands never discover a missing
//! credential halfway through.

use std::time::Duration;

use crate::ai::RetryPolicy;
use crate::utils::Settings;

/// Environment variables checked for a Gemini API key, in order.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Environment variable holding a model override.
pub const MODEL_VAR: &str = "GEMINI_MODEL";

/// Environment variable holding the backoff base delay in milliseconds.
pub const RETRY_BASE_MS_VAR: &str = "STANDUP_DIGEST_RETRY_BASE_MS";

/// Summary backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    /// Google Gemini API
    Gemini,
    /// Offline heuristic summary, no network access
    Demo,
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiProvider::Gemini => write!(f, "Gemini API"),
            AiProvider::Demo => write!(f, "demo mode"),
        }
    }
}

/// Result of AI credential validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiCredentialInfo {
    /// The backend that will be used
    pub provider: AiProvider,
    /// Explicit model override, if any
    pub model_override: Option<String>,
    /// API key; present exactly when `provider` is Gemini
    pub api_key: Option<String>,
}

/// Validate AI credentials using environment variables and settings
///
/// Demo mode is selected when `demo` is set or no API key is configured.
pub fn check_ai_credentials(model_override: Option<&str>, demo: bool) -> AiCredentialInfo {
    let settings = Settings::load_or_default();
    resolve_credentials(model_override, demo, |key| settings.lookup(key))
}

/// Credential resolution over an arbitrary variable lookup.
pub fn resolve_credentials<F>(model_override: Option<&str>, demo: bool, lookup: F) -> AiCredentialInfo
where
    F: Fn(&str) -> Option<String>,
{
    let model_override = model_override
        .map(String::from)
        .or_else(|| lookup(MODEL_VAR))
        .filter(|m| !m.trim().is_empty());

    let api_key = if demo {
        None
    } else {
        API_KEY_VARS
            .iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
    };

    let provider = if api_key.is_some() {
        AiProvider::Gemini
    } else {
        AiProvider::Demo
    };

    AiCredentialInfo {
        provider,
        model_override,
        api_key,
    }
}

/// Retry policy with the base delay taken from configuration when set.
pub fn retry_policy() -> RetryPolicy {
    let settings = Settings::load_or_default();
    retry_policy_from(|key| settings.lookup(key))
}

/// Retry policy over an arbitrary variable lookup.
pub fn retry_policy_from<F>(lookup: F) -> RetryPolicy
where
    F: Fn(&str) -> Option<String>,
{
    let mut policy = RetryPolicy::default();
    match lookup(RETRY_BASE_MS_VAR).map(|v| v.trim().parse::<u64>()) {
        Some(Ok(ms)) => policy.base_delay = Duration::from_millis(ms),
        Some(Err(e)) => tracing::warn!("Ignoring invalid {RETRY_BASE_MS_VAR}: {e}"),
        None => {}
    }
    policy
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn ai_provider_display() {
        assert_eq!(format!("{}", AiProvider::Gemini), "Gemini API");
        assert_eq!(format!("{}", AiProvider::Demo), "demo mode");
    }

    #[test]
    fn api_key_selects_gemini() {
        let info = resolve_credentials(None, false, lookup(&[("GOOGLE_API_KEY", "k")]));
        assert_eq!(info.provider, AiProvider::Gemini);
        assert_eq!(info.api_key.as_deref(), Some("k"));
        assert_eq!(info.model_override, None);
    }

    #[test]
    fn gemini_key_takes_precedence() {
        let info = resolve_credentials(
            None,
            false,
            lookup(&[("GEMINI_API_KEY", "first"), ("GOOGLE_API_KEY", "second")]),
        );
        assert_eq!(info.api_key.as_deref(), Some("first"));
    }

    #[test]
    fn missing_key_falls_back_to_demo() {
        let info = resolve_credentials(None, false, lookup(&[("GEMINI_API_KEY", "  ")]));
        assert_eq!(info.provider, AiProvider::Demo);
        assert_eq!(info.api_key, None);
    }

    #[test]
    fn demo_flag_ignores_key() {
        let info = resolve_credentials(None, true, lookup(&[("GEMINI_API_KEY", "k")]));
        assert_eq!(info.provider, AiProvider::Demo);
    }

    #[test]
    fn flag_override_beats_environment() {
        let env = lookup(&[("GEMINI_MODEL", "gemini-2.0-flash")]);
        let info = resolve_credentials(Some("gemini-2.5-flash"), false, &env);
        assert_eq!(info.model_override.as_deref(), Some("gemini-2.5-flash"));

        let info = resolve_credentials(None, false, &env);
        assert_eq!(info.model_override.as_deref(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn settings_file_supplies_credentials() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"env": {"STANDUP_DIGEST_TEST_KEY": "from-file"}}"#,
        )
        .unwrap();
        let settings = Settings::load_from_path(&path).unwrap();

        // Only the file knows this key, so the lookup must go through it
        let info = resolve_credentials(None, false, |key| {
            let key = if key == "GEMINI_API_KEY" {
                "STANDUP_DIGEST_TEST_KEY"
            } else {
                key
            };
            settings.lookup(key)
        });

        assert_eq!(info.provider, AiProvider::Gemini);
        assert_eq!(info.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn retry_base_delay_is_configurable() {
        let policy = retry_policy_from(lookup(&[(RETRY_BASE_MS_VAR, "250")]));
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, 3);

        let policy = retry_policy_from(lookup(&[(RETRY_BASE_MS_VAR, "soon")]));
        assert_eq!(policy, RetryPolicy::default());
    }
}
