//! Configuration loader
//!
//! ## Loading Strategy
//! 1. An explicit path (from `--config`) must exist and parse
//! 2. Otherwise the first file found by [`probe_config_paths`] is used
//! 3. Otherwise every field takes its default
//! 4. `HOYOSIGN_*` environment variables override whatever was loaded
//!
//! JSON and TOML are supported, detected by extension.
//!
//! ## Environment Variables
//! - `HOYOSIGN_DATA_DIR`: directory for accounts, settings and the claim log
//! - `HOYOSIGN_SCHEDULE_TIME`: daily run time, `HH:MM`
//! - `HOYOSIGN_SCHEDULE_ENABLED`: whether the daily run is enabled (true/false)
//! - `HOYOSIGN_HTTP_TIMEOUT`: request timeout in seconds
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./hoyosign.toml` or `./hoyosign.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. `<user config dir>/hoyosign/config.toml`

use std::path::{Path, PathBuf};

use hoyosign_domain::{Config, HoyoSignError, Result, ScheduleTime};

use crate::errors::domain;

pub const ENV_DATA_DIR: &str = "HOYOSIGN_DATA_DIR";
pub const ENV_SCHEDULE_TIME: &str = "HOYOSIGN_SCHEDULE_TIME";
pub const ENV_SCHEDULE_ENABLED: &str = "HOYOSIGN_SCHEDULE_ENABLED";
pub const ENV_HTTP_TIMEOUT: &str = "HOYOSIGN_HTTP_TIMEOUT";

/// Load configuration: file (explicit or probed) or defaults, then
/// environment overrides, then validation.
///
/// # Errors
/// Returns `HoyoSignError::Config` if:
/// - An explicit path does not exist
/// - The file format is invalid or unsupported
/// - An override or the resulting configuration is invalid
pub fn load(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_from_file(Some(path))?,
        None => match probe_config_paths() {
            Some(found) => load_from_file(Some(found))?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `HoyoSignError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(HoyoSignError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            HoyoSignError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| HoyoSignError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Apply `HOYOSIGN_*` overrides on top of `config`.
///
/// # Errors
/// Returns `HoyoSignError::Config` for a malformed value.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(dir) = env_var(ENV_DATA_DIR) {
        config.storage.data_dir = Some(PathBuf::from(dir));
    }

    if let Some(time) = env_var(ENV_SCHEDULE_TIME) {
        let parsed: ScheduleTime = time
            .parse()
            .map_err(|e: HoyoSignError| HoyoSignError::Config(format!("{ENV_SCHEDULE_TIME}: {e}")))?;
        config.schedule.time = parsed.to_string();
    }

    config.schedule.enabled = env_bool(ENV_SCHEDULE_ENABLED, config.schedule.enabled);

    if let Some(timeout) = env_var(ENV_HTTP_TIMEOUT) {
        config.http.timeout_secs = timeout.trim().parse::<u64>().map_err(|e| {
            HoyoSignError::Config(format!("Invalid {ENV_HTTP_TIMEOUT} value {timeout:?}: {e}"))
        })?;
    }

    Ok(())
}

/// Reject values that would only fail later at runtime.
///
/// # Errors
/// Returns `HoyoSignError::Config` naming the offending field.
pub fn validate(config: &Config) -> Result<()> {
    config
        .schedule
        .time
        .parse::<ScheduleTime>()
        .map_err(|e| HoyoSignError::Config(format!("schedule.time: {e}")))?;

    if config.http.timeout_secs == 0 {
        return Err(HoyoSignError::Config("http.timeout_secs must be positive".into()));
    }
    if config.http.max_attempts == 0 {
        return Err(HoyoSignError::Config("http.max_attempts must be at least 1".into()));
    }
    // The schedule fires only inside its configured minute; a tick must land there
    if !(1..60).contains(&config.pacing.tick_interval_secs) {
        return Err(HoyoSignError::Config(format!(
            "pacing.tick_interval_secs must be between 1 and 59, got {}",
            config.pacing.tick_interval_secs
        )));
    }
    if config.pacing.qr_poll_interval_ms == 0 {
        return Err(HoyoSignError::Config("pacing.qr_poll_interval_ms must be positive".into()));
    }
    Ok(())
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `HoyoSignError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(domain),
        "json" => serde_json::from_str(contents)
            .map_err(|e| HoyoSignError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(HoyoSignError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend([
            cwd.join("hoyosign.toml"),
            cwd.join("hoyosign.json"),
            cwd.join("config.toml"),
            cwd.join("config.json"),
        ]);
    }

    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("hoyosign").join("config.toml"));
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Non-empty environment variable
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_overrides() {
        for key in [ENV_DATA_DIR, ENV_SCHEDULE_TIME, ENV_SCHEDULE_ENABLED, ENV_HTTP_TIMEOUT] {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for value in ["1", "true", "yes", "on", "TRUE"] {
            std::env::set_var("HOYOSIGN_TEST_BOOL", value);
            assert!(env_bool("HOYOSIGN_TEST_BOOL", false), "{value} should be true");
        }
        for value in ["0", "false", "no", "off"] {
            std::env::set_var("HOYOSIGN_TEST_BOOL", value);
            assert!(!env_bool("HOYOSIGN_TEST_BOOL", true), "{value} should be false");
        }

        std::env::remove_var("HOYOSIGN_TEST_BOOL");
        assert!(env_bool("HOYOSIGN_TEST_BOOL", true));
        assert!(!env_bool("HOYOSIGN_TEST_BOOL", false));
    }

    /// Validates environment overrides on top of defaults.
    ///
    /// Assertions:
    /// - Every supported variable replaces its field
    /// - Fields without a variable keep their value
    #[test]
    fn test_env_overrides_apply() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_overrides();

        std::env::set_var(ENV_DATA_DIR, "/tmp/hoyosign-data");
        std::env::set_var(ENV_SCHEDULE_TIME, "6:30");
        std::env::set_var(ENV_SCHEDULE_ENABLED, "yes");
        std::env::set_var(ENV_HTTP_TIMEOUT, "42");

        let mut config = Config::default();
        apply_env_overrides(&mut config).unwrap();

        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/tmp/hoyosign-data")));
        assert_eq!(config.schedule.time, "06:30");
        assert!(config.schedule.enabled);
        assert_eq!(config.http.timeout_secs, 42);
        assert_eq!(config.http.max_attempts, Config::default().http.max_attempts);

        clear_overrides();
    }

    #[test]
    fn test_invalid_schedule_time_override_is_rejected() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_overrides();

        std::env::set_var(ENV_SCHEDULE_TIME, "25:00");
        let mut config = Config::default();
        let err = apply_env_overrides(&mut config).unwrap_err();

        assert!(matches!(err, HoyoSignError::Config(msg) if msg.contains(ENV_SCHEDULE_TIME)));
        assert_eq!(config.schedule.time, "08:00");

        clear_overrides();
    }

    #[test]
    fn test_invalid_timeout_override_is_rejected() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_overrides();

        std::env::set_var(ENV_HTTP_TIMEOUT, "soon");
        let result = apply_env_overrides(&mut Config::default());
        assert!(matches!(result, Err(HoyoSignError::Config(_))));

        clear_overrides();
    }

    #[test]
    fn test_load_from_file_toml_partial() {
        let path = temp_config(
            r#"
[schedule]
enabled = true
time = "07:15"

[pacing]
game_delay_ms = 0
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert!(config.schedule.enabled);
        assert_eq!(config.schedule.time, "07:15");
        assert_eq!(config.pacing.game_delay_ms, 0);
        assert_eq!(config.pacing.account_delay_ms, Config::default().pacing.account_delay_ms);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_json() {
        let path = temp_config(
            r#"{ "endpoints": { "takumi": "http://127.0.0.1:9000" }, "http": { "max_attempts": 4 } }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.endpoints.takumi, "http://127.0.0.1:9000");
        assert_eq!(config.endpoints.passport, Config::default().endpoints.passport);
        assert_eq!(config.http.max_attempts, 4);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_with_explicit_missing_path_fails() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        let result = load(Some(PathBuf::from("/nonexistent/hoyosign.toml")));
        assert!(matches!(result, Err(HoyoSignError::Config(_))));
    }

    #[test]
    fn test_load_validates_file_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_overrides();

        let path = temp_config("[schedule]\ntime = \"8am\"\n", "toml");
        let result = load(Some(path.clone()));
        assert!(matches!(result, Err(HoyoSignError::Config(msg)) if msg.starts_with("schedule.time")));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let path = temp_config("[schedule\nenabled = ", "toml");
        let result = load_from_file(Some(path.clone()));
        assert!(matches!(result, Err(HoyoSignError::Config(msg)) if msg.starts_with("Invalid TOML")));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("time: 08:00", Path::new("hoyosign.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.http.max_attempts = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.pacing.tick_interval_secs = 0;
        assert!(validate(&config).is_err());

        assert!(validate(&Config::default()).is_ok());
    }
}
