use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

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

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional_path = |var: &str| -> Option<PathBuf> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("GHOSTLENS_ENV", "development"))?;
    let log_level = or_default("GHOSTLENS_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("GHOSTLENS_DATA_DIR", "./data"));
    let policy_path = optional_path("GHOSTLENS_POLICY_PATH");
    let whitelist_path = optional_path("GHOSTLENS_WHITELIST_PATH");
    let worker_threads = parse_usize("GHOSTLENS_WORKER_THREADS", "0")?;

    let window_days = match lookup("GHOSTLENS_WINDOW_DAYS") {
        Ok(raw) => {
            let days = raw
                .parse::<u32>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: "GHOSTLENS_WINDOW_DAYS".to_string(),
                    reason: e.to_string(),
                })?;
            if days == 0 {
                return Err(ConfigError::InvalidEnvVar {
                    var: "GHOSTLENS_WINDOW_DAYS".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            Some(days)
        }
        Err(_) => None,
    };

    Ok(AppConfig {
        env,
        log_level,
        data_dir,
        policy_path,
        whitelist_path,
        worker_threads,
        window_days,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GHOSTLENS_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
