//! Engine configuration resource.
//!
//! Loaded from an INI file. Missing keys keep their defaults.
//!
//! # Configuration File Format
//!
//! ```ini
//! [animation]
//! frames_per_step = 12
//!
//! [assets]
//! base_path = ./assets
//! failure_policy = block
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::components::animation::DEFAULT_FRAMES_PER_STEP;
use crate::error::{Result, SpriteError};
use crate::resources::loadprogress::FailurePolicy;

const DEFAULT_CONFIG_PATH: &str = "./spritereel.ini";

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Throttle for animations that do not set their own.
    pub frames_per_step: u32,
    /// Directory asset names are resolved against. Empty means "as given".
    pub base_path: PathBuf,
    /// How failed loads count toward a batch.
    pub failure_policy: FailurePolicy,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            frames_per_step: DEFAULT_FRAMES_PER_STEP,
            base_path: PathBuf::new(),
            failure_policy: FailurePolicy::Block,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load values from the INI file at `config_path`.
    pub fn load_from_file(&mut self) -> Result<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| SpriteError::Config(format!("Failed to load config file: {}", e)))?;

        // [animation] section
        if let Some(fps) = config.getuint("animation", "frames_per_step").ok().flatten() {
            if fps == 0 {
                warn!("frames_per_step = 0 in config, keeping {}", self.frames_per_step);
            } else {
                self.frames_per_step = u32::try_from(fps).unwrap_or(u32::MAX);
            }
        }

        // [assets] section
        if let Some(base) = config.get("assets", "base_path") {
            self.base_path = PathBuf::from(base);
        }
        if let Some(policy) = config.get("assets", "failure_policy") {
            match FailurePolicy::parse(&policy) {
                Some(p) => self.failure_policy = p,
                None => warn!("Unknown failure_policy '{}', keeping {}", policy, self.failure_policy.as_str()),
            }
        }

        info!(
            "Loaded config: frames_per_step={}, base_path={:?}, failure_policy={}",
            self.frames_per_step,
            self.base_path,
            self.failure_policy.as_str()
        );

        Ok(())
    }

    /// Write the current values to `config_path`.
    pub fn save_to_file(&self) -> Result<()> {
        let mut config = Ini::new();

        config.set(
            "animation",
            "frames_per_step",
            Some(self.frames_per_step.to_string()),
        );
        config.set(
            "assets",
            "base_path",
            Some(self.base_path.to_string_lossy().into_owned()),
        );
        config.set(
            "assets",
            "failure_policy",
            Some(self.failure_policy.as_str().to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| SpriteError::Config(format!("Failed to save config file: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// `name` joined onto the base path.
    pub fn resolve(&self, name: &str) -> PathBuf {
        if self.base_path.as_os_str().is_empty() {
            PathBuf::from(name)
        } else {
            self.base_path.join(Path::new(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(file: &str) -> PathBuf {
        std::env::temp_dir().join(format!("spritereel-{}-{}", std::process::id(), file))
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new();
        assert_eq!(config.frames_per_step, 12);
        assert_eq!(config.failure_policy, FailurePolicy::Block);
        assert_eq!(config.resolve("walk.png"), PathBuf::from("walk.png"));
    }

    #[test]
    fn test_resolve_against_base_path() {
        let config = EngineConfig {
            base_path: PathBuf::from("assets/sprites"),
            ..EngineConfig::new()
        };
        assert_eq!(
            config.resolve("walk.png"),
            PathBuf::from("assets/sprites").join("walk.png")
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut config = EngineConfig::with_path(temp_config("missing.ini"));
        assert!(matches!(config.load_from_file(), Err(SpriteError::Config(_))));
        assert_eq!(config.frames_per_step, 12);
    }

    #[test]
    fn test_load_partial_file() {
        let path = temp_config("partial.ini");
        std::fs::write(&path, "[animation]\nframes_per_step = 4\n").unwrap();
        let mut config = EngineConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.frames_per_step, 4);
        assert_eq!(config.failure_policy, FailurePolicy::Block);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_config("saved.ini");
        let config = EngineConfig {
            frames_per_step: 6,
            base_path: PathBuf::from("gfx"),
            failure_policy: FailurePolicy::Settle,
            config_path: path.clone(),
        };
        config.save_to_file().unwrap();

        let mut loaded = EngineConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }
}
