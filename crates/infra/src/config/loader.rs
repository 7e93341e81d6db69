//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If neither required variable is set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `GHOST_API_URL`: Site URL (required)
//! - `GHOST_ADMIN_API_KEY`: Admin API key in `id:secret` form (required)
//! - `GHOST_TIMEOUT_SECONDS`: Per-request timeout in seconds
//! - `GHOST_ACCEPT_VERSION`: `Accept-Version` header value
//! - `GHOST_BATCH_MAX_PARALLEL`: Concurrent reads per batch
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./ghostkit.toml` or `./ghostkit.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names one and two directories up
//! 4. The same names next to the executable

use std::path::{Path, PathBuf};

use ghostkit_domain::{BatchConfig, ClientConfig, GhostError, Result};

pub const ENV_API_URL: &str = "GHOST_API_URL";
pub const ENV_ADMIN_API_KEY: &str = "GHOST_ADMIN_API_KEY";
pub const ENV_TIMEOUT_SECONDS: &str = "GHOST_TIMEOUT_SECONDS";
pub const ENV_ACCEPT_VERSION: &str = "GHOST_ACCEPT_VERSION";
pub const ENV_BATCH_MAX_PARALLEL: &str = "GHOST_BATCH_MAX_PARALLEL";

const CONFIG_FILE_NAMES: [&str; 4] = ["ghostkit.toml", "ghostkit.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// Environment variables win whenever either required variable is set. The
/// config file is only consulted when neither `GHOST_API_URL` nor
/// `GHOST_ADMIN_API_KEY` is present, so an invalid environment value is
/// reported instead of being replaced by a file found on disk.
///
/// # Errors
/// Returns `GhostError::Config` if:
/// - An environment variable is missing or has an invalid value
/// - No config file is found when the environment is empty
/// - File format is invalid
/// - Required fields are missing or out of range
pub fn load() -> Result<ClientConfig> {
    load_with_fallback(|key| std::env::var(key).ok(), || load_from_file(None))
}

fn load_with_fallback<F, G>(lookup: F, fallback: G) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
    G: FnOnce() -> Result<ClientConfig>,
{
    let is_set = |key: &str| lookup(key).is_some_and(|value| !value.trim().is_empty());

    if !is_set(ENV_API_URL) && !is_set(ENV_ADMIN_API_KEY) {
        tracing::debug!("Ghost environment variables not set, trying file");
        return fallback();
    }

    let config = load_from_lookup(lookup)?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// `GHOST_API_URL` and `GHOST_ADMIN_API_KEY` must be set; the others fall
/// back to their defaults.
///
/// # Errors
/// Returns `GhostError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<ClientConfig> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Build a config from any key lookup (environment, `.env` map, tests).
fn load_from_lookup<F>(lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| {
        lookup(key).filter(|value| !value.trim().is_empty()).ok_or_else(|| {
            GhostError::Config(format!("Missing required environment variable: {key}"))
        })
    };

    let mut config = ClientConfig::new(required(ENV_API_URL)?, required(ENV_ADMIN_API_KEY)?);

    if let Some(raw) = lookup(ENV_TIMEOUT_SECONDS) {
        config.timeout_seconds = parse_number(ENV_TIMEOUT_SECONDS, &raw)?;
    }
    if let Some(version) = lookup(ENV_ACCEPT_VERSION) {
        config.accept_version = version.trim().to_string();
    }
    if let Some(raw) = lookup(ENV_BATCH_MAX_PARALLEL) {
        config.batch = BatchConfig { max_parallel: parse_number(ENV_BATCH_MAX_PARALLEL, &raw)? };
    }

    validate(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `GhostError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GhostError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GhostError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GhostError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path).and_then(validate)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GhostError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GhostError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(GhostError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    probe_dirs(&dirs)
}

fn probe_dirs(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| GhostError::Config(format!("Invalid value for {key}: {e}")))
}

fn validate(config: ClientConfig) -> Result<ClientConfig> {
    if config.api_url.trim().is_empty() {
        return Err(GhostError::Config("api_url must not be empty".to_string()));
    }
    if config.admin_api_key.trim().is_empty() {
        return Err(GhostError::Config("admin_api_key must not be empty".to_string()));
    }
    if config.timeout_seconds == 0 {
        return Err(GhostError::Config("timeout_seconds must be at least 1".to_string()));
    }
    if config.accept_version.trim().is_empty() {
        return Err(GhostError::Config("accept_version must not be empty".to_string()));
    }
    if config.batch.max_parallel == 0 {
        return Err(GhostError::Config("batch.max_parallel must be at least 1".to_string()));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Mutex;

    use ghostkit_domain::GhostErrorKind;
    use tempfile::{Builder, TempDir};

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const KEY: &str = "650b7a9f8e8c1234567890ab:1234567890abcdef";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_lookup_with_required_vars_only() {
        let config = load_from_lookup(lookup_from(&[
            (ENV_API_URL, "https://demo.ghost.io"),
            (ENV_ADMIN_API_KEY, KEY),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://demo.ghost.io");
        assert_eq!(config.admin_api_key, KEY);
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.accept_version, "v5.0");
        assert_eq!(config.batch.max_parallel, 8);
    }

    #[test]
    fn test_lookup_with_all_vars() {
        let config = load_from_lookup(lookup_from(&[
            (ENV_API_URL, "https://demo.ghost.io"),
            (ENV_ADMIN_API_KEY, KEY),
            (ENV_TIMEOUT_SECONDS, " 10 "),
            (ENV_ACCEPT_VERSION, "v5.80"),
            (ENV_BATCH_MAX_PARALLEL, "3"),
        ]))
        .unwrap();

        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.accept_version, "v5.80");
        assert_eq!(config.batch.max_parallel, 3);
    }

    #[test]
    fn test_lookup_rejects_missing_and_invalid_values() {
        let cases: [&[(&str, &str)]; 4] = [
            &[(ENV_API_URL, "https://demo.ghost.io")],
            &[(ENV_API_URL, "https://demo.ghost.io"), (ENV_ADMIN_API_KEY, "  ")],
            &[
                (ENV_API_URL, "https://demo.ghost.io"),
                (ENV_ADMIN_API_KEY, KEY),
                (ENV_TIMEOUT_SECONDS, "soon"),
            ],
            &[
                (ENV_API_URL, "https://demo.ghost.io"),
                (ENV_ADMIN_API_KEY, KEY),
                (ENV_BATCH_MAX_PARALLEL, "0"),
            ],
        ];

        for pairs in cases {
            let err = load_from_lookup(lookup_from(pairs)).unwrap_err();
            assert_eq!(err.kind(), GhostErrorKind::Configuration, "{pairs:?}");
        }
    }

    #[test]
    fn test_load_from_env_reads_process_environment() {
        let _guard = ENV_LOCK.lock().unwrap();

        std::env::set_var(ENV_API_URL, "https://env.ghost.io");
        std::env::set_var(ENV_ADMIN_API_KEY, KEY);
        std::env::set_var(ENV_TIMEOUT_SECONDS, "15");

        let result = load_from_env();

        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_ADMIN_API_KEY);
        std::env::remove_var(ENV_TIMEOUT_SECONDS);

        let config = result.unwrap();
        assert_eq!(config.api_url, "https://env.ghost.io");
        assert_eq!(config.timeout_seconds, 15);
    }

    #[test]
    fn test_load_reports_invalid_env_value_instead_of_reading_file() {
        let _guard = ENV_LOCK.lock().unwrap();

        std::env::set_var(ENV_API_URL, "https://intended.ghost.io");
        std::env::set_var(ENV_ADMIN_API_KEY, KEY);
        std::env::set_var(ENV_BATCH_MAX_PARALLEL, "0");

        let result = load();

        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_ADMIN_API_KEY);
        std::env::remove_var(ENV_BATCH_MAX_PARALLEL);

        let err = result.unwrap_err();
        assert_eq!(err.kind(), GhostErrorKind::Configuration);
        assert!(err.to_string().contains("max_parallel"), "{err}");
    }

    #[test]
    fn test_file_fallback_only_when_env_is_empty() {
        let other_site = || Ok(ClientConfig::new("https://other-site.ghost.io", "abc:00ff"));

        let from_file = load_with_fallback(lookup_from(&[]), other_site).unwrap();
        assert_eq!(from_file.api_url, "https://other-site.ghost.io");

        let blank = load_with_fallback(lookup_from(&[(ENV_API_URL, " ")]), other_site).unwrap();
        assert_eq!(blank.api_url, "https://other-site.ghost.io");

        let invalid = load_with_fallback(
            lookup_from(&[
                (ENV_API_URL, "https://intended.ghost.io"),
                (ENV_ADMIN_API_KEY, KEY),
                (ENV_TIMEOUT_SECONDS, "soon"),
            ]),
            other_site,
        );
        assert!(matches!(invalid, Err(GhostError::Config(ref msg)) if msg.contains(ENV_TIMEOUT_SECONDS)));

        let half_set = load_with_fallback(lookup_from(&[(ENV_API_URL, "https://intended.ghost.io")]), other_site);
        assert!(matches!(half_set, Err(GhostError::Config(ref msg)) if msg.contains(ENV_ADMIN_API_KEY)));

        let from_env = load_with_fallback(
            lookup_from(&[(ENV_API_URL, "https://intended.ghost.io"), (ENV_ADMIN_API_KEY, KEY)]),
            || panic!("file must not be read when the environment is configured"),
        )
        .unwrap();
        assert_eq!(from_env.api_url, "https://intended.ghost.io");
    }

    #[test]
    fn test_load_from_file_toml() {
        let file = write_config(
            ".toml",
            r#"
api_url = "https://toml.ghost.io"
admin_api_key = "650b7a9f8e8c1234567890ab:1234567890abcdef"
timeout_seconds = 5

[batch]
max_parallel = 2
"#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.api_url, "https://toml.ghost.io");
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.accept_version, "v5.0");
        assert_eq!(config.batch.max_parallel, 2);
    }

    #[test]
    fn test_load_from_file_json() {
        let file = write_config(
            ".json",
            r#"{"api_url": "https://json.ghost.io", "admin_api_key": "abc:00ff"}"#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.api_url, "https://json.ghost.io");
        assert_eq!(config.batch, BatchConfig::default());
    }

    #[test]
    fn test_load_from_file_errors() {
        let missing = load_from_file(Some(PathBuf::from("/nonexistent/ghostkit.toml")));
        assert!(matches!(missing, Err(GhostError::Config(_))));

        let invalid = write_config(".json", r#"{ "api_url": "#);
        assert!(load_from_file(Some(invalid.path().to_path_buf())).is_err());

        let incomplete = write_config(".toml", r#"api_url = "https://x.ghost.io""#);
        assert!(load_from_file(Some(incomplete.path().to_path_buf())).is_err());

        let zero_timeout =
            write_config(".json", r#"{"api_url": "https://x", "admin_api_key": "a:00", "timeout_seconds": 0}"#);
        assert!(load_from_file(Some(zero_timeout.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("api_url: x", &PathBuf::from("ghostkit.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_probe_prefers_ghostkit_over_generic_names() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(dir.path().join("ghostkit.json"), "{}").unwrap();

        let found = probe_dirs(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(found.file_name().and_then(|n| n.to_str()), Some("ghostkit.json"));

        let empty = TempDir::new().unwrap();
        assert!(probe_dirs(&[empty.path().to_path_buf()]).is_none());
    }
}
