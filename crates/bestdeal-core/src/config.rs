use std::path::PathBuf;

use crate::app_config::{AppConfig, BrowserSettings, Environment};
use crate::ConfigError;

/// Site keys enabled when `BESTDEAL_SOURCES` is unset.
pub const DEFAULT_SOURCES: &str = "zepto,blinkit,instamart";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from the variables already in the process,
/// without reading `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parsing and validation behind the loaders, with the env lookup injected so
/// tests never touch the process environment.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_flag(&or_default(var, default))
            .ok_or_else(|| invalid(var, "expected true/false".to_string()))
    };

    let env = parse_environment(&or_default("BESTDEAL_ENV", "development"))?;
    let log_level = or_default("BESTDEAL_LOG_LEVEL", "info");

    let sources = parse_source_list(&or_default("BESTDEAL_SOURCES", DEFAULT_SOURCES));
    if sources.is_empty() {
        return Err(invalid(
            "BESTDEAL_SOURCES",
            "at least one source must be enabled".to_string(),
        ));
    }

    let worker_pool_size = or_default("BESTDEAL_WORKER_POOL_SIZE", "4")
        .trim()
        .parse::<usize>()
        .map_err(|e| invalid("BESTDEAL_WORKER_POOL_SIZE", e.to_string()))?;
    if worker_pool_size == 0 {
        return Err(invalid(
            "BESTDEAL_WORKER_POOL_SIZE",
            "must be at least 1".to_string(),
        ));
    }

    let browser = BrowserSettings {
        headless: parse_bool("BESTDEAL_BROWSER_HEADLESS", "true")?,
        chrome_executable: optional("BESTDEAL_CHROME_EXECUTABLE").map(PathBuf::from),
        remote_url: optional("BESTDEAL_BROWSER_REMOTE_URL"),
        user_agent: or_default("BESTDEAL_BROWSER_USER_AGENT", DEFAULT_USER_AGENT),
    };

    let element_timeout_secs = parse_u64("BESTDEAL_ELEMENT_TIMEOUT_SECS", "25")?;
    let typing_delay_ms = parse_u64("BESTDEAL_TYPING_DELAY_MS", "40")?;
    let recovery_max_clicks = parse_u32("BESTDEAL_RECOVERY_MAX_CLICKS", "5")?;
    let recovery_settle_ms = parse_u64("BESTDEAL_RECOVERY_SETTLE_MS", "2000")?;
    let empty_results_is_error = parse_bool("BESTDEAL_EMPTY_RESULTS_IS_ERROR", "false")?;
    let geo_timeout_secs = parse_u64("BESTDEAL_GEO_TIMEOUT_SECS", "3")?;

    Ok(AppConfig {
        env,
        log_level,
        sources,
        worker_pool_size,
        browser,
        element_timeout_secs,
        typing_delay_ms,
        recovery_max_clicks,
        recovery_settle_ms,
        empty_results_is_error,
        geo_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BESTDEAL_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Splits a comma list into lowercase site keys, dropping blanks and repeats.
fn parse_source_list(raw: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for key in raw.split(',').map(|k| k.trim().to_ascii_lowercase()) {
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
