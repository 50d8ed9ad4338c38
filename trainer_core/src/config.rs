//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/artrain/config.toml`.

use crate::catalog::{default_catalog, PlanCatalog};
use crate::promotion::PromotionRules;
use crate::{Error, PlanTargets, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub promotion: PromotionRules,

    /// Replaces the built-in plan catalog when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plans: Vec<PlanTargets>,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn home_relative(fallback: &str) -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(fallback)
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| home_relative(".local/share"))
        .join("artrain")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| home_relative(".config"))
            .join("artrain")
            .join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Configured plans, or the built-in catalog when none are configured
    pub fn plan_catalog(&self) -> PlanCatalog {
        if self.plans.is_empty() {
            default_catalog().clone()
        } else {
            PlanCatalog::new(self.plans.iter().cloned())
        }
    }

    /// Check thresholds and the plan catalog
    pub fn validate(&self) -> Result<()> {
        let rules = &self.promotion;
        if !(0.0..=100.0).contains(&rules.rate_floor_percent) {
            return Err(Error::Config(format!(
                "promotion.rate_floor_percent must be within 0..=100 (got {})",
                rules.rate_floor_percent
            )));
        }
        if rules.reset_after_sessions == 0 {
            return Err(Error::Config(
                "promotion.reset_after_sessions must be at least 1".into(),
            ));
        }
        if rules.inactivity_days <= 0 {
            return Err(Error::Config(format!(
                "promotion.inactivity_days must be positive (got {})",
                rules.inactivity_days
            )));
        }

        let errors = self.plan_catalog().validate();
        if !errors.is_empty() {
            return Err(Error::CatalogValidation(errors.join("; ")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Exercise;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.promotion.rate_floor_percent, 60.0);
        assert_eq!(config.promotion.reset_after_sessions, 60);
        assert_eq!(config.promotion.inactivity_days, 30);
        assert!(config.plans.is_empty());
        assert!(config.data.data_dir.ends_with("artrain"));
        config.validate().unwrap();
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.promotion, parsed.promotion);
        assert_eq!(config.data.data_dir, parsed.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[promotion]
inactivity_days = 14
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.promotion.inactivity_days, 14);
        assert_eq!(config.promotion.reset_after_sessions, 60); // default
    }

    #[test]
    fn test_configured_plans_replace_defaults() {
        let toml_str = r#"
[[plans]]
id = 1
label = "Starter"

[[plans.targets]]
exercise = "Push Ups"
target = 8

[[plans.targets]]
exercise = "Plank"
target = 15
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        config.validate().unwrap();

        let catalog = config.plan_catalog();
        let plan = catalog.resolve(1).unwrap();
        assert_eq!(plan.label, "Starter");
        assert_eq!(plan.target_for(Exercise::PushUp), Some(8));
        assert!(catalog.resolve(2).is_err());
    }

    #[test]
    fn test_unknown_exercise_in_plan_is_rejected() {
        let toml_str = r#"
[[plans]]
id = 1
label = "Starter"

[[plans.targets]]
exercise = "Burpee"
target = 8
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_invalid_thresholds() {
        let mut config = Config::default();
        config.promotion.rate_floor_percent = 120.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.promotion.reset_after_sessions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_validates_catalog() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[[plans]]
id = 2
label = "No entry plan"

[[plans.targets]]
exercise = "Squat"
target = 10
"#,
        )
        .unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(Error::CatalogValidation(_))
        ));
    }

    #[test]
    fn test_gapped_plan_ids_are_rejected() {
        let toml_str = r#"
[[plans]]
id = 1
label = "Starter"
targets = [{ exercise = "Squat", target = 10 }]

[[plans]]
id = 3
label = "Skipped ahead"
targets = [{ exercise = "Squat", target = 20 }]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(Error::CatalogValidation(msg)) if msg.contains("unreachable")
        ));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.promotion.inactivity_days = 21;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.promotion.inactivity_days, 21);
    }
}
