// CommandCollection: a test collection assembled at runtime from command checks

use tracing::warn;

use crate::probe::{Attributes, ProbeFailure, ProbeMethod, TestCollection, PROBE_PREFIX};

use super::command::CommandCheck;

/// Collection kind used when none is configured.
pub const DEFAULT_KIND: &str = "CommandChecks";

struct NamedCheck {
    method: String,
    description: String,
    check: CommandCheck,
}

/// Probes backed by shell commands, one per added check.
pub struct CommandCollection {
    kind: String,
    attributes: Attributes,
    checks: Vec<NamedCheck>,
}

impl CommandCollection {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Attributes::new(),
            checks: Vec::new(),
        }
    }

    /// Bind a value for `{key}` placeholders in check descriptions.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add a check exposed as the probe `test_<name>`.
    ///
    /// A name already carrying the probe prefix is used unchanged.
    pub fn add_check(
        &mut self,
        name: &str,
        description: impl Into<String>,
        check: CommandCheck,
    ) -> &mut Self {
        let method = if name.starts_with(PROBE_PREFIX) {
            name.to_string()
        } else {
            format!("{}{}", PROBE_PREFIX, name)
        };
        self.checks.push(NamedCheck {
            method,
            description: description.into(),
            check,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl Default for CommandCollection {
    fn default() -> Self {
        Self::new(DEFAULT_KIND)
    }
}

impl TestCollection for CommandCollection {
    fn probes(&self) -> Vec<ProbeMethod<Self>> {
        self.checks
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                ProbeMethod::new(
                    entry.method.clone(),
                    entry.description.clone(),
                    move |collection: &CommandCollection| match collection.checks.get(index) {
                        Some(entry) => entry.check.probe(),
                        None => {
                            warn!("Command check #{} vanished before it ran.", index);
                            Err(ProbeFailure::Unexpected {
                                message: format!("no command check at index {}", index),
                            })
                        }
                    },
                )
            })
            .collect()
    }

    fn attributes(&self) -> Attributes {
        self.attributes.clone()
    }

    fn kind(&self) -> String {
        self.kind.clone()
    }
}
