//! Application configuration module
//!
//! This module centralizes all application configuration settings using `confy`
//! for automatic serialization and OS-specific config directory management.

use crate::constant::{
    APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, DEFAULT_FONT_SIZE, DEFAULT_RECONCILE_DELAY_MS,
    MAX_RECENT_FILES,
};
use crate::engine::{CompactDiffOptions, RenderMode};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Confy(#[from] confy::ConfyError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Config {
    pub settings: Settings,
}

impl Config {
    /// Load configuration from disk, creating default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Settings = confy::load(APP_NAME, None)?;
        info!("Load config from {:?}", Self::config_path()?);
        Ok(Self { settings })
    }

    /// Save current configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, None, &self.settings)?;
        info!("Save config to {:?}", Self::config_path()?);
        Ok(())
    }

    /// Save in the background, since confy writes synchronously
    pub fn save_in_background(&self) {
        let settings = self.settings.clone();
        std::thread::spawn(move || {
            if let Err(e) = confy::store(APP_NAME, None, &settings) {
                tracing::error!("Failed to save settings: {}", e);
            }
        });
    }

    /// Get the application data directory
    /// Falls back to a local "data" directory if platform dirs are unavailable
    pub fn data_dir(&self) -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME) {
            proj_dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from("data")
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(confy::get_configuration_file_path(APP_NAME, None)?)
    }

    /// Add a comparison to the recent list, most recent first
    pub fn add_recent_comparison(&mut self, comparison: RecentComparison) {
        self.settings.push_recent(comparison);
        self.save_in_background();
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::load().unwrap_or_else(|_| Self {
            settings: Settings::default(),
        })
    }
}

/// A pair of files that were compared together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentComparison {
    pub original: PathBuf,
    pub modified: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Highlight only changed characters instead of whole lines
    #[serde(default = "default_compact_mode")]
    pub compact_mode: bool,

    /// Side-by-side or unified rendering
    #[serde(default)]
    pub render_mode: RenderMode,

    /// Delay before the unified view's deleted lines are re-split, in milliseconds
    #[serde(default = "default_reconcile_delay_ms")]
    pub reconcile_delay_ms: u64,

    #[serde(default = "default_font_size")]
    pub font_size: f32,

    #[serde(default)]
    pub recent_comparisons: Vec<RecentComparison>,
}

fn default_compact_mode() -> bool {
    true
}

fn default_reconcile_delay_ms() -> u64 {
    DEFAULT_RECONCILE_DELAY_MS
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compact_mode: default_compact_mode(),
            render_mode: RenderMode::default(),
            reconcile_delay_ms: default_reconcile_delay_ms(),
            font_size: default_font_size(),
            recent_comparisons: Vec::new(),
        }
    }
}

impl Settings {
    /// Options handed to the decoration engine on activation.
    pub fn compact_options(&self) -> CompactDiffOptions {
        CompactDiffOptions {
            enabled: self.compact_mode,
            render_mode: self.render_mode,
            reconcile_delay: Duration::from_millis(self.reconcile_delay_ms),
        }
    }

    fn push_recent(&mut self, comparison: RecentComparison) {
        self.recent_comparisons.retain(|c| c != &comparison);
        self.recent_comparisons.insert(0, comparison);
        self.recent_comparisons.truncate(MAX_RECENT_FILES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(n: usize) -> RecentComparison {
        RecentComparison {
            original: PathBuf::from(format!("a{}.txt", n)),
            modified: PathBuf::from(format!("b{}.txt", n)),
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        let options = settings.compact_options();
        assert!(options.enabled);
        assert_eq!(options.render_mode, RenderMode::TwoPane);
        assert_eq!(options.reconcile_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_recent_comparisons_dedup_and_cap() {
        let mut settings = Settings::default();
        for n in 0..(MAX_RECENT_FILES + 3) {
            settings.push_recent(comparison(n));
        }
        assert_eq!(settings.recent_comparisons.len(), MAX_RECENT_FILES);

        settings.push_recent(comparison(5));
        assert_eq!(settings.recent_comparisons[0], comparison(5));
        assert_eq!(
            settings
                .recent_comparisons
                .iter()
                .filter(|c| **c == comparison(5))
                .count(),
            1
        );
    }

    #[test]
    fn test_settings_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("test_config_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");

        let mut settings = Settings::default();
        settings.compact_mode = false;
        settings.render_mode = RenderMode::SinglePane;
        settings.push_recent(comparison(1));
        confy::store_path(&path, &settings).unwrap();

        let loaded: Settings = confy::load_path(&path).unwrap();
        assert!(!loaded.compact_mode);
        assert_eq!(loaded.render_mode, RenderMode::SinglePane);
        assert_eq!(loaded.recent_comparisons, vec![comparison(1)]);

        let _ = std::fs::remove_dir_all(dir);
    }
}
