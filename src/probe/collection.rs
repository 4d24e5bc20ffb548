// TestCollection: explicit capability exposing probe methods
//
// Collections are plain caller-owned values. The runner only borrows them for
// the duration of a run, sharing one reference across all worker threads, so
// any interior state a probe mutates must be synchronized by the collection.

use std::collections::BTreeMap;
use std::fmt;

use super::ProbeOutcome;

/// Attribute bindings a collection exposes to its description templates.
pub type Attributes = BTreeMap<String, String>;

/// One probe method declared by a collection.
pub struct ProbeMethod<C> {
    name: String,
    description: String,
    call: Box<dyn Fn(&C) -> ProbeOutcome + Send + Sync>,
}

impl<C> ProbeMethod<C> {
    /// Declare a probe.
    ///
    /// `description` is a template: `{attr}` is replaced with the collection
    /// attribute `attr` at discovery time. Plain methods fit `call` directly:
    ///
    /// ```ignore
    /// ProbeMethod::new("test_resolve", "Can {hostname} resolve?", Self::test_resolve)
    /// ```
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, call: F) -> Self
    where
        F: Fn(&C) -> ProbeOutcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            call: Box::new(call),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn into_call(self) -> Box<dyn Fn(&C) -> ProbeOutcome + Send + Sync> {
        self.call
    }
}

impl<C> fmt::Debug for ProbeMethod<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeMethod")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A group of related probes.
///
/// Only methods whose name starts with [`PROBE_PREFIX`](super::PROBE_PREFIX)
/// are picked up by discovery; others are ignored, which makes it easy to
/// switch a probe off by renaming it.
pub trait TestCollection: Sync {
    /// Every probe method this collection declares.
    fn probes(&self) -> Vec<ProbeMethod<Self>>
    where
        Self: Sized;

    /// Values available to description placeholders.
    fn attributes(&self) -> Attributes {
        Attributes::new()
    }

    /// Collection type label used in qualified probe names.
    fn kind(&self) -> String {
        short_type_name::<Self>()
    }
}

fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
