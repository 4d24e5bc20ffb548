// Probe discovery
//
// Turns a registered collection into runnable probes. Discovery is pure: it
// renders descriptions and builds qualified names but never calls a probe.

use serde::Serialize;
use tracing::debug;

use crate::error::ConfigurationError;

use super::{render_description, ProbeOutcome, TestCollection};

/// Name prefix marking a collection method as a probe.
pub const PROBE_PREFIX: &str = "test_";

/// Identity and description of a discovered probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeInfo {
    /// `<run>::<kind>(<collection>)::<method>`
    pub qualified_name: String,
    pub description: String,
    pub collection: String,
    pub method: String,
}

/// A discovered probe bound to the collection it belongs to.
pub struct Probe<'a> {
    info: ProbeInfo,
    call: Box<dyn Fn() -> ProbeOutcome + Send + Sync + 'a>,
}

impl<'a> Probe<'a> {
    pub fn info(&self) -> &ProbeInfo {
        &self.info
    }

    /// Invoke the probe once.
    pub fn invoke(&self) -> ProbeOutcome {
        (self.call)()
    }

    #[cfg(test)]
    pub(crate) fn from_fn<F>(info: ProbeInfo, call: F) -> Self
    where
        F: Fn() -> ProbeOutcome + Send + Sync + 'a,
    {
        Self {
            info,
            call: Box::new(call),
        }
    }
}

impl std::fmt::Debug for Probe<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe").field("info", &self.info).finish()
    }
}

/// Type-erased discovery, implemented for every [`TestCollection`].
pub trait Discover: Sync {
    fn discover<'a>(
        &'a self,
        run_name: &str,
        collection_name: &str,
    ) -> Result<Vec<Probe<'a>>, ConfigurationError>;
}

impl<C: TestCollection> Discover for C {
    fn discover<'a>(
        &'a self,
        run_name: &str,
        collection_name: &str,
    ) -> Result<Vec<Probe<'a>>, ConfigurationError> {
        discover(self, run_name, collection_name)
    }
}

/// Discover the probes of `collection`, ordered lexically by method name.
pub fn discover<'a, C: TestCollection>(
    collection: &'a C,
    run_name: &str,
    collection_name: &str,
) -> Result<Vec<Probe<'a>>, ConfigurationError> {
    let kind = collection.kind();
    let attributes = collection.attributes();

    let mut methods: Vec<_> = collection
        .probes()
        .into_iter()
        .filter(|method| {
            let keep = method.name().starts_with(PROBE_PREFIX);
            if !keep {
                debug!(
                    "Skipping `{}` of '{}': name lacks the `{}` prefix.",
                    method.name(),
                    collection_name,
                    PROBE_PREFIX
                );
            }
            keep
        })
        .collect();
    methods.sort_by(|a, b| a.name().cmp(b.name()));

    if let Some(pair) = methods.windows(2).find(|pair| pair[0].name() == pair[1].name()) {
        return Err(ConfigurationError::DuplicateProbe {
            collection: collection_name.to_string(),
            probe: pair[0].name().to_string(),
        });
    }

    methods
        .into_iter()
        .map(|method| {
            let description =
                render_description(method.name(), method.description(), &attributes)?;
            let info = ProbeInfo {
                qualified_name: format!(
                    "{}::{}({})::{}",
                    run_name,
                    kind,
                    collection_name,
                    method.name()
                ),
                description,
                collection: collection_name.to_string(),
                method: method.name().to_string(),
            };
            let call = method.into_call();
            Ok(Probe {
                info,
                call: Box::new(move || call(collection)),
            })
        })
        .collect()
}
