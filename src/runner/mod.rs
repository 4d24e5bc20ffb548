//! Runner facade.
//!
//! A [`Runner`] owns the registrations for one run: named test collections,
//! named output sinks and result observers. Calling [`Runner::run`] discovers
//! every probe, executes them on a bounded [`WorkerPool`], collects one result
//! per probe and dispatches the full list to each output in registration
//! order. [`Runner::scope`] wraps registration and run in one call and always
//! attempts the run, even when setup reported an error.
//!
//! Lifecycle: `Open` (registrations accepted) → `Running` → `Dispatched`, or
//! `Failed` when discovery rejects the configuration before any probe runs.
//! Registering or running again once the runner has left `Open` is a
//! [`ConfigurationError::RunnerClosed`].

use std::fmt;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{log_configuration_error, ConfigurationError};
use crate::observer::{LogObserver, ResultObserver};
use crate::output::OutputSink;
use crate::probe::{Discover, Probe, ProbeInfo, TestCollection};
use crate::result::RunReport;

mod collector;
mod dispatch;
mod pool;

pub use collector::ResultCollector;
pub use pool::WorkerPool;


/// Where a runner is in its one-shot lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Open,
    Running,
    /// Every output has been invoked.
    Dispatched,
    /// Discovery failed; no probe ran and no output was invoked.
    Failed,
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunnerState::Open => "open",
            RunnerState::Running => "running",
            RunnerState::Dispatched => "dispatched",
            RunnerState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Something that can be registered on a runner.
///
/// Shared references to a [`TestCollection`] become collections; mutable
/// references to an [`OutputSink`] become outputs.
pub enum Target<'a> {
    Collection(&'a dyn Discover),
    Output(&'a mut dyn OutputSink),
}

impl<'a, C: TestCollection + 'a> From<&'a C> for Target<'a> {
    fn from(collection: &'a C) -> Self {
        Target::Collection(collection)
    }
}

impl<'a, S: OutputSink + 'a> From<&'a mut S> for Target<'a> {
    fn from(output: &'a mut S) -> Self {
        Target::Output(output)
    }
}

/// Registers collections and outputs, then runs every probe once.
pub struct Runner<'a> {
    name: String,
    pool: WorkerPool,
    state: RunnerState,
    log_results: bool,
    collections: Vec<(String, &'a dyn Discover)>,
    outputs: Vec<(String, &'a mut dyn OutputSink)>,
    observers: Vec<&'a dyn ResultObserver>,
}

impl<'a> Runner<'a> {
    /// `name` prefixes qualified probe names; `workers` caps concurrency.
    pub fn new(name: impl Into<String>, workers: usize) -> Result<Self, ConfigurationError> {
        Ok(Self {
            name: name.into(),
            pool: WorkerPool::new(workers)?,
            state: RunnerState::Open,
            log_results: true,
            collections: Vec::new(),
            outputs: Vec::new(),
            observers: Vec::new(),
        })
    }

    /// Build a runner, let `setup` register on it, then run.
    ///
    /// The run is attempted whatever `setup` returns. A setup error is logged
    /// and returned once the outputs have been dispatched.
    pub fn scope<F>(
        name: impl Into<String>,
        workers: usize,
        setup: F,
    ) -> Result<RunReport, ConfigurationError>
    where
        F: FnOnce(&mut Runner<'a>) -> Result<(), ConfigurationError>,
    {
        let mut runner = Runner::new(name, workers)?;
        let setup_result = setup(&mut runner);
        let report = runner.run();

        match setup_result {
            Ok(()) => report,
            Err(err) => {
                log_configuration_error(&err, "runner setup");
                Err(err)
            }
        }
    }

    /// Stop emitting the per-result OK/FAILED log lines.
    pub fn without_log_observer(mut self) -> Self {
        self.log_results = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// Register a collection or an output; the target's type decides which.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        target: impl Into<Target<'a>>,
    ) -> Result<(), ConfigurationError> {
        let name = name.into();
        match target.into() {
            Target::Collection(collection) => self.add_collection(name, collection),
            Target::Output(output) => self.add_output(name, output),
        }
    }

    pub fn register_collection<C: TestCollection>(
        &mut self,
        name: impl Into<String>,
        collection: &'a C,
    ) -> Result<(), ConfigurationError> {
        self.add_collection(name.into(), collection)
    }

    pub fn register_output<S: OutputSink>(
        &mut self,
        name: impl Into<String>,
        output: &'a mut S,
    ) -> Result<(), ConfigurationError> {
        self.add_output(name.into(), output)
    }

    /// Notify `observer` of every result as it completes.
    pub fn add_observer(
        &mut self,
        observer: &'a dyn ResultObserver,
    ) -> Result<(), ConfigurationError> {
        self.ensure_open()?;
        self.observers.push(observer);
        Ok(())
    }

    /// Discover every probe without running any.
    pub fn plan(&self) -> Result<Vec<ProbeInfo>, ConfigurationError> {
        Ok(self
            .discover_all()?
            .iter()
            .map(|probe| probe.info().clone())
            .collect())
    }

    /// Discover, execute, collect and dispatch. Runs at most once.
    pub fn run(&mut self) -> Result<RunReport, ConfigurationError> {
        self.ensure_open()?;
        self.state = RunnerState::Running;
        let started = Instant::now();

        let probes = match self.discover_all() {
            Ok(probes) => probes,
            Err(err) => {
                log_configuration_error(&err, "probe discovery");
                self.state = RunnerState::Failed;
                return Err(err);
            }
        };
        info!(
            "Running {} probes from {} collections on {} workers.",
            probes.len(),
            self.collections.len(),
            self.pool.workers()
        );

        let log_observer: &'static LogObserver = &LogObserver;
        let mut observers: Vec<&dyn ResultObserver> = Vec::with_capacity(self.observers.len() + 1);
        if self.log_results {
            observers.push(log_observer);
        }
        observers.extend(self.observers.iter().copied());

        let expected = probes.iter().map(|probe| probe.info().clone()).collect();
        let mut collector = ResultCollector::new(expected, observers);
        self.pool.execute(&probes, &mut collector);
        let results = collector.finish();
        drop(probes);

        let sink_failures = dispatch::dispatch(&mut self.outputs, &results);
        self.state = RunnerState::Dispatched;

        Ok(RunReport {
            name: self.name.clone(),
            results,
            sink_failures,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn add_collection(
        &mut self,
        name: String,
        collection: &'a dyn Discover,
    ) -> Result<(), ConfigurationError> {
        self.ensure_open()?;
        if self.collections.iter().any(|(existing, _)| *existing == name) {
            return Err(ConfigurationError::DuplicateName {
                role: "a test collection",
                name,
            });
        }
        debug!("Registered '{}' as a test collection.", name);
        self.collections.push((name, collection));
        Ok(())
    }

    fn add_output(
        &mut self,
        name: String,
        output: &'a mut dyn OutputSink,
    ) -> Result<(), ConfigurationError> {
        self.ensure_open()?;
        if self.outputs.iter().any(|(existing, _)| *existing == name) {
            return Err(ConfigurationError::DuplicateName {
                role: "an output",
                name,
            });
        }
        debug!("Registered '{}' as an output.", name);
        self.outputs.push((name, output));
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), ConfigurationError> {
        if self.state == RunnerState::Open {
            Ok(())
        } else {
            Err(ConfigurationError::RunnerClosed {
                runner: self.name.clone(),
                state: self.state.to_string(),
            })
        }
    }

    fn discover_all(&self) -> Result<Vec<Probe<'a>>, ConfigurationError> {
        let mut probes = Vec::new();
        for (collection_name, collection) in &self.collections {
            let collection: &'a dyn Discover = *collection;
            probes.extend(collection.discover(&self.name, collection_name)?);
        }
        Ok(probes)
    }
}

impl fmt::Debug for Runner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let collections: Vec<&str> = self.collections.iter().map(|(n, _)| n.as_str()).collect();
        let outputs: Vec<&str> = self.outputs.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("Runner")
            .field("name", &self.name)
            .field("workers", &self.pool.workers())
            .field("state", &self.state)
            .field("collections", &collections)
            .field("outputs", &outputs)
            .finish()
    }
}
