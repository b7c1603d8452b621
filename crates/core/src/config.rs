//! Runtime configuration (spec §6, SPEC_FULL §10.3).
//!
//! Grounded on the teacher's `config.rs`: `env::var(...).unwrap_or_else`
//! defaults plus explicit numeric-range validation, no config file parser.

use axum::http::HeaderValue;
use evo_shared::EvoError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub anthropic_api_key: String,
    pub daily_budget: u64,
    pub interval_ms: u64,
    pub auto_start: bool,
    pub escalation_threshold: u32,
    pub cheap_model_tag: String,
    pub capable_model_tag: String,
    pub database_url: String,
    pub bind_address: String,
    pub port: u16,
    pub admin_api_key: Option<String>,
    pub evolvable_root: String,
    pub cors_origins: Vec<HeaderValue>,
}

impl AppConfig {
    /// Read configuration from the environment, the way the teacher's
    /// `config.rs` does: every field has an explicit default except the
    /// API key, which is required unless test-bypass is set.
    pub fn load() -> Result<Self, EvoError> {
        let test_bypass = env_flag("EVO_TEST_BYPASS_AUTH", false);
        let anthropic_api_key = match std::env::var("ANTHROPIC_API_KEY") {
            Ok(key) if !key.is_empty() => key,
            _ if test_bypass => String::new(),
            _ => return Err(EvoError::MissingApiKey),
        };

        let daily_budget = env_u64("EVO_DAILY_BUDGET", 100_000);
        let interval_ms = env_u64("EVO_INTERVAL_MS", 300_000);
        let auto_start = env_flag("EVO_AUTO_START", false);
        let escalation_threshold = env_u64("EVO_ESCALATION_THRESHOLD", 3) as u32;
        let cheap_model_tag = env_string("EVO_CHEAP_MODEL_TAG", "claude-haiku-4-5");
        let capable_model_tag = env_string("EVO_CAPABLE_MODEL_TAG", "claude-sonnet-4-5");

        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(std::path::Path::to_path_buf))
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        let default_database_url = format!("sqlite:{}/data/evo.db", exe_dir.display());
        let database_url = env_string("EVO_DATABASE_URL", &default_database_url);

        let bind_address = env_string("EVO_BIND_ADDRESS", "127.0.0.1");
        let port = env_u64("EVO_PORT", 8787) as u16;
        let admin_api_key = std::env::var("EVO_ADMIN_API_KEY").ok().filter(|s| !s.is_empty());
        let evolvable_root = env_string("EVO_EVOLVABLE_ROOT", "evolvable");
        let cors_origins = parse_cors_origins(&env_string(
            "EVO_CORS_ORIGINS",
            "http://localhost:1420,http://127.0.0.1:1420",
        ));

        if !evolvable_root.contains("evolvable") {
            return Err(EvoError::Internal(
                "EVO_EVOLVABLE_ROOT must contain the literal substring 'evolvable'".to_string(),
            ));
        }
        if escalation_threshold == 0 {
            return Err(EvoError::Internal("EVO_ESCALATION_THRESHOLD must be >= 1".to_string()));
        }

        Ok(Self {
            anthropic_api_key,
            daily_budget,
            interval_ms,
            auto_start,
            escalation_threshold,
            cheap_model_tag,
            capable_model_tag,
            database_url,
            bind_address,
            port,
            admin_api_key,
            evolvable_root,
            cors_origins,
        })
    }
}

/// Parse a comma-separated `EVO_CORS_ORIGINS` list into `HeaderValue`s,
/// skipping (and warning on) any entry that isn't a valid header value
/// instead of failing the whole config load (spec §10.3 ambient stack:
/// matches the teacher's `config.rs` "skip invalid CORS origin" behavior).
fn parse_cors_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = s, "skipping invalid CORS origin");
                None
            }
        })
        .collect()
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn parse_cors_origins_skips_invalid_entries() {
        let origins = parse_cors_origins("http://localhost:1420, not a valid header ,http://127.0.0.1:1420");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], HeaderValue::from_static("http://localhost:1420"));
    }

    #[test]
    fn parse_cors_origins_empty_string_is_empty_vec() {
        assert!(parse_cors_origins("").is_empty());
    }

    #[test]
    fn missing_api_key_is_an_error_without_bypass() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("ANTHROPIC_API_KEY");
        std::env::remove_var("EVO_TEST_BYPASS_AUTH");
        let err = AppConfig::load().unwrap_err();
        assert!(matches!(err, EvoError::MissingApiKey));
    }

    #[test]
    fn bypass_allows_missing_key() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("ANTHROPIC_API_KEY");
        std::env::set_var("EVO_TEST_BYPASS_AUTH", "1");
        let cfg = AppConfig::load().unwrap();
        assert_eq!(cfg.anthropic_api_key, "");
        std::env::remove_var("EVO_TEST_BYPASS_AUTH");
    }

    #[test]
    fn evolvable_root_must_contain_marker() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("EVO_TEST_BYPASS_AUTH", "1");
        std::env::set_var("EVO_EVOLVABLE_ROOT", "src");
        let err = AppConfig::load().unwrap_err();
        assert!(matches!(err, EvoError::Internal(_)));
        std::env::remove_var("EVO_TEST_BYPASS_AUTH");
        std::env::remove_var("EVO_EVOLVABLE_ROOT");
    }
}
