//! Layered CLI settings: defaults, then TOML file, then environment, then flags.

use anyhow::{bail, Context};
use post_series_core::{default_log_level, parse_capability, Capability, SessionGuard};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DEFAULT_CONFIG_FILE: &str = "post_series.toml";
pub const DEFAULT_DB_FILE: &str = "post_series.sqlite3";

pub const ENV_DB: &str = "POST_SERIES_DB";
pub const ENV_LOG_LEVEL: &str = "POST_SERIES_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "POST_SERIES_LOG_DIR";
pub const ENV_SESSION_KEY: &str = "POST_SERIES_SESSION_KEY";

/// Effective settings for one CLI run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is off when unset.
    pub log_dir: Option<PathBuf>,
    /// Session id shared with whoever requests nonces; random when unset.
    pub session_key: Option<Uuid>,
    pub capabilities: Vec<Capability>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
            session_key: None,
            capabilities: Vec::new(),
        }
    }
}

impl Settings {
    /// Builds the request guard for this run.
    pub fn session_guard(&self) -> SessionGuard {
        let guard = match self.session_key {
            Some(session) => SessionGuard::with_session(session),
            None => SessionGuard::new(),
        };
        self.capabilities
            .iter()
            .fold(guard, |guard, capability| guard.grant(*capability))
    }
}

/// On-disk shape; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    db_path: Option<PathBuf>,
    log_level: Option<String>,
    log_dir: Option<PathBuf>,
    session_key: Option<String>,
    capabilities: Option<Vec<String>>,
}

/// Flag values that win over file and environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

/// Loads settings for this process.
///
/// An explicit `config_path` must exist; the default file is optional.
pub fn load_settings(
    config_path: Option<&Path>,
    overrides: &Overrides,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    apply_overrides(&mut settings, overrides);
    settings.log_dir = settings.log_dir.take().map(absolutize).transpose()?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file.db_path {
        settings.db_path = v;
    }
    if let Some(v) = file.log_level {
        settings.log_level = v;
    }
    if let Some(v) = file.log_dir {
        settings.log_dir = Some(v);
    }
    if let Some(v) = file.session_key {
        settings.session_key = Some(parse_session_key(&v)?);
    }
    if let Some(values) = file.capabilities {
        settings.capabilities = values
            .iter()
            .map(|value| parse_capability(value))
            .collect::<Result<Vec<_>, _>>()?;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(v) = lookup(ENV_DB) {
        settings.db_path = PathBuf::from(v);
    }
    if let Some(v) = lookup(ENV_LOG_LEVEL) {
        settings.log_level = v;
    }
    if let Some(v) = lookup(ENV_LOG_DIR) {
        settings.log_dir = Some(PathBuf::from(v));
    }
    if let Some(v) = lookup(ENV_SESSION_KEY) {
        settings.session_key =
            Some(parse_session_key(&v).with_context(|| format!("invalid {ENV_SESSION_KEY}"))?);
    }
    Ok(())
}

fn apply_overrides(settings: &mut Settings, overrides: &Overrides) {
    if let Some(v) = &overrides.db_path {
        settings.db_path = v.clone();
    }
    if let Some(v) = &overrides.log_level {
        settings.log_level = v.clone();
    }
    if let Some(v) = &overrides.log_dir {
        settings.log_dir = Some(v.clone());
    }
}

fn parse_session_key(raw: &str) -> anyhow::Result<Uuid> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("session_key cannot be empty");
    }
    Uuid::parse_str(trimmed).with_context(|| format!("session_key `{trimmed}` is not a UUID"))
}

fn absolutize(path: PathBuf) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(path))
}
