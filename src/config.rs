//! Runner configuration loaded from JSON.
//!
//! A configuration names the run, caps the worker count and declares command
//! collections, each a list of shell checks. Everything that can be checked
//! without running a probe (worker count, duplicate names, regex syntax) is
//! validated on load, so a bad file never gets as far as the runner.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::probe::{Attributes, PROBE_PREFIX};
use crate::tools::{output_pattern, CommandCheck, CommandCollection, DEFAULT_KIND};

fn default_name() -> String {
    "diagnostics".to_string()
}

fn default_workers() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    60
}

/// Top-level configuration of one diagnostic run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Prefix of every qualified probe name
    #[serde(default = "default_name")]
    pub name: String,
    /// Maximum number of probes executing at once
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
    /// Console table title; the table's default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// One command collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionConfig {
    /// Registration name, unique within the run
    pub name: String,
    /// Collection type label shown in qualified names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Values for `{placeholder}`s in check descriptions
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub checks: Vec<CheckConfig>,
}

/// One shell check, exposed as the probe `test_<name>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckConfig {
    pub name: String,
    pub description: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr_pattern: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            workers: default_workers(),
            collections: Vec::new(),
            title: None,
        }
    }
}

impl RunnerConfig {
    /// Load and validate configuration from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| {
            log::warn!("[Config] Failed to read config file {:?}: {}", path, err);
            ConfigurationError::ConfigFile {
                path: path.display().to_string(),
                reason: err.to_string(),
            }
        })?;

        let config = Self::from_json(&contents).map_err(|err| match err {
            ConfigurationError::ConfigFile { reason, .. } => ConfigurationError::ConfigFile {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;

        log::info!(
            "[Config] Loaded {} collections from {:?}",
            config.collections.len(),
            path
        );
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(contents: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            serde_json::from_str(contents).map_err(|err| ConfigurationError::ConfigFile {
                path: "<inline>".to_string(),
                reason: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check everything that would otherwise only fail once the run started.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.workers == 0 {
            return Err(ConfigurationError::InvalidWorkerCount { workers: 0 });
        }

        let mut names = HashSet::new();
        for collection in &self.collections {
            if !names.insert(collection.name.as_str()) {
                return Err(ConfigurationError::DuplicateName {
                    role: "a test collection",
                    name: collection.name.clone(),
                });
            }
            collection.validate()?;
        }
        Ok(())
    }

    /// Build one command collection per configured entry, paired with its name.
    pub fn build_collections(
        &self,
    ) -> Result<Vec<(String, CommandCollection)>, ConfigurationError> {
        self.collections
            .iter()
            .map(|collection| Ok((collection.name.clone(), collection.build()?)))
            .collect()
    }
}

impl CollectionConfig {
    fn validate(&self) -> Result<(), ConfigurationError> {
        let mut methods = HashSet::new();
        for check in &self.checks {
            if !methods.insert(check.method_name()) {
                return Err(ConfigurationError::DuplicateProbe {
                    collection: self.name.clone(),
                    probe: check.method_name(),
                });
            }
            check.build(&self.name)?;
        }
        Ok(())
    }

    pub fn build(&self) -> Result<CommandCollection, ConfigurationError> {
        let kind = self.kind.as_deref().unwrap_or(DEFAULT_KIND);
        let mut collection = CommandCollection::new(kind);
        for (key, value) in &self.attributes {
            collection = collection.with_attribute(key.as_str(), value.as_str());
        }
        for check in &self.checks {
            collection.add_check(&check.name, check.description.as_str(), check.build(&self.name)?);
        }
        Ok(collection)
    }
}

impl CheckConfig {
    fn method_name(&self) -> String {
        if self.name.starts_with(PROBE_PREFIX) {
            self.name.clone()
        } else {
            format!("{}{}", PROBE_PREFIX, self.name)
        }
    }

    /// Compile this entry into a runnable check.
    pub fn build(&self, collection: &str) -> Result<CommandCheck, ConfigurationError> {
        let mut check = CommandCheck::new(self.command.as_str())
            .timeout(Duration::from_secs(self.timeout_secs));
        if let Some(code) = self.exit_code {
            check = check.exit_code(code);
        }
        if let Some(pattern) = &self.stdout_pattern {
            check = check.stdout_matches(self.compile(collection, pattern)?);
        }
        if let Some(pattern) = &self.stderr_pattern {
            check = check.stderr_matches(self.compile(collection, pattern)?);
        }
        Ok(check)
    }

    fn compile(&self, collection: &str, pattern: &str) -> Result<regex::Regex, ConfigurationError> {
        output_pattern(pattern).map_err(|err| ConfigurationError::InvalidPattern {
            check: format!("{}.{}", collection, self.name),
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })
    }
}
