//! Application configuration
//!
//! Read from a JSON file next to the data directory. Every field has a
//! default, so a missing file or a partial one is fine.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::{DomainError, DomainResult};
use crate::repository::SeedSource;

/// India Standard Time, the household's home zone
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;
pub const DEFAULT_DUE_SOON_DAYS: i64 = 7;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// File name inside `data_dir`
    pub database_file: String,
    /// Defaults to `<data_dir>/logs`
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    /// Keep collections in SQLite; memory only when false
    pub persist: bool,
    pub seed: SeedSource,
    /// Offset used to decide what "today" is
    pub utc_offset_minutes: i32,
    /// Window for the upcoming dues view
    pub due_soon_days: i64,
    pub log_retention_files: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            database_file: "homesync.db".to_string(),
            log_dir: None,
            log_level: "info".to_string(),
            persist: true,
            seed: SeedSource::Builtin,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
            log_retention_files: 7,
        }
    }
}

impl AppConfig {
    /// Load from `path`; defaults when the file does not exist
    pub fn load(path: &Path) -> DomainResult<Self> {
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&text)
            .map_err(|e| DomainError::Internal(format!("config {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> DomainResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.database_file.trim().is_empty() {
            return Err(DomainError::validation("databaseFile", "is required"));
        }
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(DomainError::validation(
                "utcOffsetMinutes",
                format!("must be within ±{}", MAX_OFFSET_MINUTES),
            ));
        }
        if self.due_soon_days < 0 {
            return Err(DomainError::validation("dueSoonDays", "must not be negative"));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn utc_offset(&self) -> DomainResult<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .ok_or_else(|| DomainError::validation("utcOffsetMinutes", "is out of range"))
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("logs"))
    }

    pub fn level_filter(&self) -> DomainResult<log::LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| DomainError::validation("logLevel", format!("unknown level {}", self.log_level)))
    }

    pub fn logger_options(&self) -> DomainResult<rolling_logger::LoggerOptions> {
        Ok(rolling_logger::LoggerOptions {
            max_level: self.level_filter()?,
            retention_files: self.log_retention_files.max(1),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = AppConfig::load(&dir.path().join("absent.json")).expect("Load failed");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.utc_offset_minutes, 330);
        assert_eq!(config.database_path(), PathBuf::from("data").join("homesync.db"));
        assert_eq!(config.log_path(), PathBuf::from("data").join("logs"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"persist":false,"seed":"none","dueSoonDays":3}"#).expect("write");

        let config = AppConfig::load(&path).expect("Load failed");
        assert!(!config.persist);
        assert_eq!(config.seed, SeedSource::None);
        assert_eq!(config.due_soon_days, 3);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            log_level: "debug".into(),
            seed: SeedSource::Directory(dir.path().join("seed")),
            ..Default::default()
        };

        config.save(&path).expect("Save failed");
        assert_eq!(AppConfig::load(&path).expect("Load failed"), config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_offset = AppConfig {
            utc_offset_minutes: 15 * 60,
            ..Default::default()
        };
        assert!(matches!(bad_offset.validate(), Err(DomainError::Validation { .. })));

        let bad_file = AppConfig {
            database_file: "  ".into(),
            ..Default::default()
        };
        assert_eq!(
            bad_file.validate(),
            Err(DomainError::validation("databaseFile", "is required"))
        );

        let bad_level = AppConfig {
            log_level: "loud".into(),
            ..Default::default()
        };
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn test_offset_and_logger_options() {
        let config = AppConfig {
            log_level: "warn".into(),
            log_retention_files: 0,
            ..Default::default()
        };
        assert_eq!(config.utc_offset().expect("offset").local_minus_utc(), 330 * 60);
        let options = config.logger_options().expect("options");
        assert_eq!(options.max_level, log::LevelFilter::Warn);
        assert_eq!(options.retention_files, 1);
    }
}
