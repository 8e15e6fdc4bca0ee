use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) stale_after_hours: u64,
    pub(crate) refresh_every_secs: u64,
    pub(crate) poll_interval_ms: u64,
    pub(crate) connect_timeout_secs: u64,
    pub(crate) keys: KeyBindings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stale_after_hours: 12,
            refresh_every_secs: 5 * 60,
            poll_interval_ms: 50,
            connect_timeout_secs: 10,
            keys: KeyBindings::default(),
        }
    }
}

impl Settings {
    pub(crate) fn stale_after(&self) -> chrono::Duration {
        i64::try_from(self.stale_after_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub(crate) fn refresh_every(&self) -> Duration {
        Duration::from_secs(self.refresh_every_secs)
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub(crate) fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }
}

/// Letters pressed together with Ctrl.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct KeyBindings {
    pub(crate) quit: char,
    pub(crate) refresh: char,
    pub(crate) paste: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: 'q',
            refresh: 'r',
            paste: 's',
        }
    }
}

impl KeyBindings {
    pub(crate) fn help_line(&self) -> String {
        format!(
            "<ctrl-{}> quit | <ctrl-{}> refresh | <ctrl-{}> paste",
            self.quit, self.refresh, self.paste
        )
    }
}

pub(crate) fn config_path() -> Option<PathBuf> {
    let mut dir = dirs::config_dir()?;
    dir.push("cpbftpchk");
    dir.push("config.json");
    Some(dir)
}

/// Loads settings from `explicit` or the default location.
///
/// A missing default file yields the built-in defaults; an explicitly named file must exist.
pub(crate) fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    match explicit {
        Some(path) => read_settings(path),
        None => match config_path() {
            Some(path) if path.exists() => read_settings(&path),
            _ => Ok(Settings::default()),
        },
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    let settings = serde_json::from_str(&content)
        .with_context(|| format!("parse config file {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(tag: &str) -> PathBuf {
        let mut base = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        base.push(format!("cpbftpchk-config-{tag}-{nanos}.json"));
        base
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_config_path("partial");
        fs::write(&path, r#"{ "stale_after_hours": 1, "keys": { "paste": "v" } }"#).unwrap();
        let settings = load_settings(Some(&path)).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(settings.stale_after_hours, 1);
        assert_eq!(settings.refresh_every_secs, 300);
        assert_eq!(settings.keys.paste, 'v');
        assert_eq!(settings.keys.quit, 'q');
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = temp_config_path("missing");
        assert!(load_settings(Some(&path)).is_err());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let path = temp_config_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        let result = load_settings(Some(&path));
        let _ = fs::remove_file(&path);
        assert!(result.is_err());
    }

    #[test]
    fn durations_follow_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.stale_after(), chrono::Duration::hours(12));
        assert_eq!(settings.refresh_every(), Duration::from_secs(300));
        assert_eq!(settings.poll_interval(), Duration::from_millis(50));
        assert_eq!(
            settings.keys.help_line(),
            "<ctrl-q> quit | <ctrl-r> refresh | <ctrl-s> paste"
        );
    }
}
