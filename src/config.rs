// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfile repository configuration.
//!
//! Specify the layout of the YAML configuration that a dotfile repository
//! keeps at its top-level. Fetching the file is left to the caller.
//!
//! # General Layout
//!
//! The configuration is a mapping with a single `data` section:
//!
//! ```yaml
//! data:
//!   gitUser:
//!     name: John Doe
//!     email: john@doe.com
//!   platform: linux
//!   modules:
//!     shell:
//!       enabled: true
//!       zsh_extras: true
//!     git:
//!       enabled: false
//! ```
//!
//! Only `data.modules` is mandatory. Everything else is checked by
//! [`Config::validate`], which reports problems as warnings instead of failing.

use crate::{catalog, platform::Platform};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};
use std::{collections::BTreeSet, str::FromStr};
use tracing::{debug, warn};

/// Parsed dotfile repository configuration.
#[derive(Default, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub data: ConfigData,
}

impl Config {
    /// Lookup state of module by name.
    pub fn module(&self, name: impl AsRef<str>) -> Option<&ModuleState> {
        self.data.modules.get(name.as_ref())
    }

    /// Check if module exists and is enabled.
    pub fn is_enabled(&self, name: impl AsRef<str>) -> bool {
        self.module(name).is_some_and(ModuleState::is_enabled)
    }

    /// Platform the configuration was written for, if it names a known one.
    pub fn platform(&self) -> Option<Platform> {
        self.data.platform.as_deref()?.parse().ok()
    }

    /// Names of all enabled modules.
    pub fn enabled_modules(&self) -> BTreeSet<String> {
        self.data
            .modules
            .iter()
            .filter(|(_, state)| state.is_enabled())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Copy configuration with `enabled` flag of modules overridden.
    ///
    /// Only modules that already exist are touched, and only their `enabled`
    /// flag changes. Overrides naming unknown modules are skipped.
    pub fn with_module_overrides<'a>(
        &self,
        overrides: impl IntoIterator<Item = (&'a String, &'a bool)>,
    ) -> Self {
        let mut config = self.clone();
        for (name, enabled) in overrides {
            match config.data.modules.get_mut(name) {
                Some(state) => state.enabled = Some(*enabled),
                None => debug!("skip override of unknown module {name:?}"),
            }
        }

        config
    }

    /// Check configuration against recommended layout.
    ///
    /// Never fails. Caller decides what to do with reported violations.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.data.git_user.name.trim().is_empty() {
            warnings.push(ConfigWarning::MissingGitUser("name"));
        }
        if self.data.git_user.email.trim().is_empty() {
            warnings.push(ConfigWarning::MissingGitUser("email"));
        }
        if let Some(name) = &self.data.platform {
            if name.parse::<Platform>().is_err() {
                warnings.push(ConfigWarning::UnknownPlatform(name.clone()));
            }
        }

        for known in catalog::KNOWN_MODULES {
            if !self.data.modules.contains_key(known.name) {
                warnings.push(ConfigWarning::MissingModule(known.name.to_string()));
            }
        }

        for (name, state) in &self.data.modules {
            if state.enabled.is_none() {
                warnings.push(ConfigWarning::MissingEnabled(name.clone()));
            }
        }

        warnings
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let root: Value = serde_yaml_ng::from_str(data)?;

        // INVARIANT: Check required shape before handing over to serde, so
        // callers get told exactly which key is wrong.
        let root_map = root.as_mapping().ok_or(ConfigError::Shape("root"))?;
        let data_map = lookup_mapping(root_map, "data").ok_or(ConfigError::Shape("data"))?;
        lookup_mapping(data_map, "modules").ok_or(ConfigError::Shape("data.modules"))?;

        Ok(serde_yaml_ng::from_value(root)?)
    }
}

fn lookup_mapping<'a>(map: &'a Mapping, key: &str) -> Option<&'a Mapping> {
    map.get(key).and_then(Value::as_mapping)
}

/// Contents of `data` section.
#[derive(Default, Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigData {
    /// Identity used for commits made from deployed git configuration.
    #[serde(default)]
    pub git_user: GitUser,

    /// Platform the configuration was written for. Kept verbatim, see
    /// [`Config::platform`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Repository policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<RepositoryPolicy>,

    /// Module states keyed by module name.
    pub modules: IndexMap<String, ModuleState>,
}

/// Git user identity.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GitUser {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,
}

/// Repository policy record.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryPolicy {
    /// Repository is publicly visible.
    #[serde(default)]
    pub public: bool,

    /// Secrets are allowed to be templated into deployed files.
    #[serde(default)]
    pub allow_secrets: bool,
}

/// State of a single module.
///
/// Extra keys next to `enabled` are kept as named properties. Only scalar
/// values are kept, anything else is dropped while parsing.
#[derive(Default, Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "RawModuleState")]
pub struct ModuleState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(flatten)]
    pub properties: IndexMap<String, PropertyValue>,
}

impl ModuleState {
    /// Construct new module state with no properties.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            properties: IndexMap::new(),
        }
    }

    /// Module is enabled. Missing `enabled` flag counts as disabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    /// Truthiness of named property. Missing property counts as false.
    pub fn property_is_truthy(&self, name: impl AsRef<str>) -> bool {
        self.properties
            .get(name.as_ref())
            .is_some_and(PropertyValue::is_truthy)
    }
}

#[derive(Deserialize)]
struct RawModuleState {
    #[serde(default)]
    enabled: Option<bool>,

    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

impl From<RawModuleState> for ModuleState {
    fn from(raw: RawModuleState) -> Self {
        let mut properties = IndexMap::new();
        for (key, value) in raw.extra {
            match PropertyValue::from_yaml(&value) {
                Some(property) => {
                    properties.insert(key, property);
                }
                None => warn!("drop module property {key:?}, only scalar values are supported"),
            }
        }

        Self {
            enabled: raw.enabled,
            properties,
        }
    }
}

/// Scalar value of a module property.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl PropertyValue {
    /// Truthiness as template conditionals see it.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Number(value) => *value != 0.0,
            Self::String(value) => !value.is_empty(),
        }
    }

    fn from_yaml(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(value) => Some(Self::Bool(*value)),
            Value::Number(value) => value.as_f64().map(Self::Number),
            Value::String(value) => Some(Self::String(value.clone())),
            _ => None,
        }
    }
}

/// Soft violation of the recommended configuration layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigWarning {
    /// Recommended module is not listed.
    #[error("recommended module {0:?} is missing from data.modules")]
    MissingModule(String),

    /// Module does not state whether it is enabled.
    #[error("module {0:?} has no enabled flag, treating it as disabled")]
    MissingEnabled(String),

    /// Git user identity field is empty.
    #[error("data.gitUser.{0} is empty")]
    MissingGitUser(&'static str),

    /// Platform field names no known platform.
    #[error("data.platform {0:?} is not one of linux, darwin, windows")]
    UnknownPlatform(String),
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Document is not valid YAML, or does not fit the expected types.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Required key is missing or not a mapping.
    #[error("configuration key {0:?} is missing or is not a mapping")]
    Shape(&'static str),
}

/// Friendly result alias :3
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
