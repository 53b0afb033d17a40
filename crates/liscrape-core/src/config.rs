use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::str::FromStr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    fn parse_as<T>(raw: &str) -> Result<T, String>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.trim().parse::<T>().map_err(|e| e.to_string())
    }

    let bind_addr = parse_as::<SocketAddr>(&or_default("LISCRAPE_BIND_ADDR", "0.0.0.0:8000"))
        .map_err(|e| invalid("LISCRAPE_BIND_ADDR", e))?;
    let navigation_timeout_secs =
        parse_as::<u64>(&or_default("LISCRAPE_NAVIGATION_TIMEOUT_SECS", "60"))
            .map_err(|e| invalid("LISCRAPE_NAVIGATION_TIMEOUT_SECS", e))?;
    let selector_timeout_secs =
        parse_as::<u64>(&or_default("LISCRAPE_SELECTOR_TIMEOUT_SECS", "20"))
            .map_err(|e| invalid("LISCRAPE_SELECTOR_TIMEOUT_SECS", e))?;
    let max_scroll_rounds = parse_as::<u32>(&or_default("LISCRAPE_MAX_SCROLL_ROUNDS", "30"))
        .map_err(|e| invalid("LISCRAPE_MAX_SCROLL_ROUNDS", e))?;
    let scroll_delay_ms = parse_as::<u64>(&or_default("LISCRAPE_SCROLL_DELAY_MS", "1500"))
        .map_err(|e| invalid("LISCRAPE_SCROLL_DELAY_MS", e))?;
    let reactions_limit = parse_as::<usize>(&or_default("LISCRAPE_REACTIONS_LIMIT", "20"))
        .map_err(|e| invalid("LISCRAPE_REACTIONS_LIMIT", e))?;
    let headless = parse_bool(&or_default("LISCRAPE_HEADLESS", "true"))
        .ok_or_else(|| invalid("LISCRAPE_HEADLESS", "expected true or false".to_string()))?;

    if max_scroll_rounds == 0 {
        return Err(invalid(
            "LISCRAPE_MAX_SCROLL_ROUNDS",
            "must be at least 1".to_string(),
        ));
    }

    let env = parse_environment(&or_default("LISCRAPE_ENV", "development"))?;
    let log_level = or_default("LISCRAPE_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("LISCRAPE_DATA_DIR", "./data"));
    let chrome_path = lookup("LISCRAPE_CHROME_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_dir,
        chrome_path,
        headless,
        navigation_timeout_secs,
        selector_timeout_secs,
        max_scroll_rounds,
        scroll_delay_ms,
        reactions_limit,
    })
}

/// Parse `LISCRAPE_ENV` into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LISCRAPE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
