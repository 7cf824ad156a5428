//! Configuration for the property rules
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (property-compat.toml)
//! - Environment variables (PROPERTY_COMPAT__*)
//!
//! ## Example config file (property-compat.toml):
//! ```toml
//! disabled = ["MaxProperties"]
//!
//! [enum]
//! addition_enforcement = "IfPreviouslyConstrained"
//! removal_enforcement = "Strict"
//!
//! [required]
//! new_enforcement = "Strict"
//!
//! [bounds]
//! addition_enforcement = "Strict"
//! tightening_enforcement = "None"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CompatError, Result};
use crate::rules::{
    AdditionEnforcement, Bound, BoundRule, DefaultRule, Enforcement, EnumRule, PropertyRule,
    RemovalEnforcement, RequiredRule, TypeRule,
};

const CONFIG_FILE: &str = "property-compat";

/// Enforcement settings for every rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Rule names to leave out entirely
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Enum rule settings
    #[serde(default, rename = "enum")]
    pub enum_rule: EnumConfig,

    /// Required rule settings
    #[serde(default)]
    pub required: RequiredConfig,

    /// Settings shared by all bound rules
    #[serde(default)]
    pub bounds: BoundsConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumConfig {
    #[serde(default)]
    pub addition_enforcement: AdditionEnforcement,

    #[serde(default)]
    pub removal_enforcement: RemovalEnforcement,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RequiredConfig {
    #[serde(default)]
    pub new_enforcement: Enforcement,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundsConfig {
    #[serde(default)]
    pub addition_enforcement: Enforcement,

    #[serde(default)]
    pub tightening_enforcement: Enforcement,
}

impl ValidationConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            format!("{}.toml", CONFIG_FILE),
            format!(".{}.toml", CONFIG_FILE),
            format!("config/{}.toml", CONFIG_FILE),
        ];

        for location in config_locations {
            tracing::debug!(%location, "checking config location");
            builder = builder.add_source(File::with_name(&location).required(false));
        }

        // XDG config directory
        if let Some(dirs) = directories::ProjectDirs::from("dev", "familiar", CONFIG_FILE) {
            let xdg_config = dirs.config_dir().join(format!("{}.toml", CONFIG_FILE));
            if xdg_config.exists() {
                tracing::debug!(path = %xdg_config.display(), "loading XDG config");
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            tracing::debug!(path = %path.display(), "loading explicit config");
            builder = builder.add_source(File::from(path).required(true));
        }

        // PROPERTY_COMPAT__ENUM__ADDITION_ENFORCEMENT=Strict
        builder = builder.add_source(
            Environment::with_prefix("PROPERTY_COMPAT")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("disabled")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.check_disabled()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The configured rules, in evaluation order, minus disabled ones
    pub fn rules(&self) -> Result<Vec<Box<dyn PropertyRule>>> {
        self.check_disabled()?;
        let mut rules = self.all_rules();
        rules.retain(|rule| !self.disabled.iter().any(|d| d == rule.name()));
        Ok(rules)
    }

    fn all_rules(&self) -> Vec<Box<dyn PropertyRule>> {
        let bounds = self.bounds;
        let mut rules: Vec<Box<dyn PropertyRule>> = vec![
            Box::new(DefaultRule),
            Box::new(EnumRule::new(
                self.enum_rule.addition_enforcement,
                self.enum_rule.removal_enforcement,
            )),
            Box::new(TypeRule),
            Box::new(RequiredRule::new(self.required.new_enforcement)),
        ];
        rules.extend(Bound::ALL.iter().map(|bound| {
            Box::new(BoundRule::new(*bound).with_enforcement(
                bounds.addition_enforcement,
                bounds.tightening_enforcement,
            )) as Box<dyn PropertyRule>
        }));
        rules
    }

    fn check_disabled(&self) -> Result<()> {
        let known = self.all_rules();
        match self
            .disabled
            .iter()
            .find(|name| !known.iter().any(|rule| rule.name() == name.as_str()))
        {
            Some(unknown) => Err(CompatError::UnknownRule(unknown.clone())),
            None => Ok(()),
        }
    }
}
