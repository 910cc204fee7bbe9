// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tally_app::{DEFAULT_QUERY_DEBOUNCE, ViewKind, parse_utc_offset, validate_account};
use time::UtcOffset;
use tracing_subscriber::EnvFilter;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_UTC_OFFSET: &str = "+08:00";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub display: Display,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            ui: Ui::default(),
            display: Display::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub default_view: Option<String>,
    pub query_debounce: Option<String>,
    /// Restricts the entries view to one account.
    pub target_account: Option<String>,
    /// Account recorded in the audit log for saved edits.
    pub operator: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Display {
    pub utc_offset: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("TALLY_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set TALLY_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(tally_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [storage], [ui], [display], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            tally_db::validate_db_path(db_path)?;
        }

        self.default_view()
            .with_context(|| format!("invalid [ui].default_view in {}", path.display()))?;
        self.query_debounce()
            .with_context(|| format!("invalid [ui].query_debounce in {}", path.display()))?;

        for (key, account) in [
            ("target_account", &self.ui.target_account),
            ("operator", &self.ui.operator),
        ] {
            if let Some(account) = account
                && let Err(error) = validate_account(account)
            {
                bail!(
                    "[ui].{key} in {} {error}, got {account:?}",
                    path.display()
                );
            }
        }

        self.display_offset()
            .with_context(|| format!("invalid [display].utc_offset in {}", path.display()))?;

        EnvFilter::try_new(self.log_level()).with_context(|| {
            format!(
                "invalid [log].level {:?} in {}; use off, error, warn, info, debug, or trace",
                self.log_level(),
                path.display()
            )
        })?;

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => tally_db::default_db_path(),
        }
    }

    pub fn default_view(&self) -> Result<ViewKind> {
        match self.ui.default_view.as_deref() {
            None => Ok(ViewKind::Entries),
            Some(raw) => ViewKind::parse(raw)
                .ok_or_else(|| anyhow!("unknown view {raw:?}; use entries, users or logs")),
        }
    }

    pub fn query_debounce(&self) -> Result<Duration> {
        match self.ui.query_debounce.as_deref() {
            None => Ok(DEFAULT_QUERY_DEBOUNCE),
            Some(raw) => parse_duration(raw),
        }
    }

    pub fn target_account(&self) -> Option<&str> {
        self.ui.target_account.as_deref()
    }

    pub fn operator(&self) -> Option<&str> {
        self.ui.operator.as_deref()
    }

    pub fn display_offset(&self) -> Result<UtcOffset> {
        parse_utc_offset(
            self.display
                .utc_offset
                .as_deref()
                .unwrap_or(DEFAULT_UTC_OFFSET),
        )
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn logging_enabled(&self) -> bool {
        !self.log_level().eq_ignore_ascii_case("off")
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.file {
            return Ok(PathBuf::from(path));
        }

        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file to a writable path")
        })?;
        let app_dir = data_root.join(tally_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create data directory {}", app_dir.display()))?;
        Ok(app_dir.join("tally.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# tally config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/tally/tally.db)\n# db_path = \"/absolute/path/to/tally.db\"\n\n[ui]\ndefault_view = \"entries\"\nquery_debounce = \"{}ms\"\n# Show only one account's entries.\n# target_account = \"113000001\"\n# Admin account recorded in the audit log when you save or delete a record.\n# operator = \"113000001\"\n\n[display]\nutc_offset = \"{}\"\n\n[log]\nlevel = \"{}\"\n# Optional. Default is tally.log next to the default database.\n# file = \"/absolute/path/to/tally.log\"\n",
            path.display(),
            DEFAULT_QUERY_DEBOUNCE.as_millis(),
            DEFAULT_UTC_OFFSET,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use <N>ms or <N>s (for example 120ms)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;
    use tally_app::{DEFAULT_DISPLAY_OFFSET, ViewKind};
    use time::UtcOffset;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.default_view()?, ViewKind::Entries);
        assert_eq!(config.query_debounce()?, Duration::from_millis(120));
        assert_eq!(config.display_offset()?, DEFAULT_DISPLAY_OFFSET);
        assert_eq!(config.log_level(), "info");
        assert!(config.logging_enabled());
        assert_eq!(config.operator(), None);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\ndefault_view = \"users\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[storage], [ui], [display], and [log]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[ui]\ndefault_view = \"users\"\nquery_debounce = \"300ms\"\ntarget_account = \"113000002\"\noperator = \"113000001\"\n[display]\nutc_offset = \"-05:00\"\n[log]\nlevel = \"debug\"\nfile = \"/tmp/tally-test.log\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.default_view()?, ViewKind::Users);
        assert_eq!(config.query_debounce()?, Duration::from_millis(300));
        assert_eq!(config.target_account(), Some("113000002"));
        assert_eq!(config.operator(), Some("113000001"));
        assert_eq!(config.display_offset()?, UtcOffset::from_hms(-5, 0, 0)?);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_file()?, PathBuf::from("/tmp/tally-test.log"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn unknown_default_view_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\ndefault_view = \"ledger\"\n")?;
        let error = Config::load(&path).expect_err("unknown view should fail");
        let message = format!("{error:#}");
        assert!(message.contains("[ui].default_view"), "{message}");
        assert!(message.contains("use entries, users or logs"), "{message}");
        Ok(())
    }

    #[test]
    fn malformed_accounts_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\noperator = \"12ab\"\n")?;
        let error = Config::load(&path).expect_err("bad operator should fail");
        let message = error.to_string();
        assert!(message.contains("[ui].operator"), "{message}");
        assert!(message.contains("\"12ab\""), "{message}");
        Ok(())
    }

    #[test]
    fn bad_offset_and_log_level_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[display]\nutc_offset = \"8\"\n")?;
        let error = Config::load(&path).expect_err("bad offset should fail");
        assert!(format!("{error:#}").contains("expected a value like +08:00"));

        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"app=verbose\"\n")?;
        let error = Config::load(&path).expect_err("bad level should fail");
        assert!(error.to_string().contains("invalid [log].level"));
        Ok(())
    }

    #[test]
    fn off_level_disables_logging() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"off\"\n")?;
        let config = Config::load(&path)?;
        assert!(!config.logging_enabled());
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TALLY_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TALLY_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn db_path_prefers_storage_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"/explicit/from-config.db\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TALLY_DB_PATH", "/from/env.db");
        }
        let config = Config::load(&path)?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TALLY_DB_PATH");
        }
        assert_eq!(config.db_path()?, PathBuf::from("/explicit/from-config.db"));
        Ok(())
    }

    #[test]
    fn db_path_uses_env_override_when_storage_db_path_missing() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TALLY_DB_PATH", "/from/env-only.db");
        }
        let config = Config::load(&path)?;
        let resolved = config.db_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TALLY_DB_PATH");
        }
        assert_eq!(resolved, PathBuf::from("/from/env-only.db"));
        Ok(())
    }

    #[test]
    fn db_path_rejects_uri_style_storage_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"https://evil.example/tally.db\"\n")?;
        let error = Config::load(&path).expect_err("URI db_path should fail validation");
        assert!(error.to_string().contains("looks like a URI"));
        Ok(())
    }

    #[test]
    fn durations_parse_ms_and_seconds() -> Result<()> {
        assert_eq!(parse_duration("0ms")?, Duration::ZERO);
        assert_eq!(parse_duration("250ms")?, Duration::from_millis(250));
        assert_eq!(parse_duration("2s")?, Duration::from_secs(2));
        let error = parse_duration("soon").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid duration"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        for section in ["[storage]", "[ui]", "[display]", "[log]"] {
            assert!(example.contains(section), "missing {section}");
        }

        std::fs::write(&path, &example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.query_debounce()?, Duration::from_millis(120));
        assert_eq!(config.display_offset()?, DEFAULT_DISPLAY_OFFSET);
        Ok(())
    }
}
