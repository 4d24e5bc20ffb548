// CommandCheck: probe helper running a shell command with expectations
//
// The command runs through `sh -c` in its own process group on a
// current-thread tokio runtime. The timeout belongs to the check, not to the
// runner: when it expires the whole process group is killed, so background
// jobs the command started go down with it, and the check fails.

use std::process::Stdio;
use std::time::Duration;

use regex::{Regex, RegexBuilder};
use tokio::runtime::Builder;
use tokio::time;

use crate::probe::{ProbeFailure, ProbeOutcome};

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Message reported by a check whose expectations all held.
pub const SUCCESS_MESSAGE: &str = "Good";

/// Pass/fail verdict of one command check with its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub passed: bool,
    pub message: String,
}

/// Compile an output pattern the way command checks match it (multi-line).
pub fn output_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).multi_line(true).build()
}

/// A shell command plus what its exit code and output must look like.
#[derive(Debug, Clone)]
pub struct CommandCheck {
    command: String,
    exit_code: Option<i32>,
    stdout_pattern: Option<Regex>,
    stderr_pattern: Option<Regex>,
    timeout: Duration,
}

impl CommandCheck {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            exit_code: None,
            stdout_pattern: None,
            stderr_pattern: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    pub fn stdout_matches(mut self, pattern: Regex) -> Self {
        self.stdout_pattern = Some(pattern);
        self
    }

    pub fn stderr_matches(mut self, pattern: Regex) -> Self {
        self.stderr_pattern = Some(pattern);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the command and report whether it met its expectations.
    pub fn run(&self) -> CheckReport {
        match self.probe() {
            Ok(()) => CheckReport {
                passed: true,
                message: SUCCESS_MESSAGE.to_string(),
            },
            Err(failure) => CheckReport {
                passed: false,
                message: failure.reason(),
            },
        }
    }

    /// Run the command as a probe body.
    ///
    /// Expectations are checked in order (exit code, stdout, stderr) and the
    /// first unmet one becomes the failure reason.
    pub fn probe(&self) -> ProbeOutcome {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(self.run_async())
    }

    async fn run_async(&self) -> ProbeOutcome {
        let mut command = std::process::Command::new("sh");
        command
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut command = tokio::process::Command::from(command);
        command.kill_on_drop(true);
        let child = command.spawn()?;
        let group = child.id();

        let output = match time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                if let Some(group) = group {
                    kill_process_group(group);
                }
                return Err(ProbeFailure::assertion(format!(
                    "Test timed out after '{}' seconds.",
                    format_secs(self.timeout)
                )))
            }
        };

        if let Some(expected) = self.exit_code {
            if output.status.code() != Some(expected) {
                let actual = output
                    .status
                    .code()
                    .map_or_else(|| "terminated by signal".to_string(), |c| c.to_string());
                return Err(ProbeFailure::assertion(format!(
                    "Exit code is '{}' instead of the expected '{}'.",
                    actual, expected
                )));
            }
        }

        if let Some(pattern) = &self.stdout_pattern {
            if !pattern.is_match(&String::from_utf8_lossy(&output.stdout)) {
                return Err(ProbeFailure::assertion(format!(
                    "STDOUT did not match regex '{}'.",
                    pattern.as_str()
                )));
            }
        }

        if let Some(pattern) = &self.stderr_pattern {
            if !pattern.is_match(&String::from_utf8_lossy(&output.stderr)) {
                return Err(ProbeFailure::assertion(format!(
                    "STDERR did not match regex '{}'.",
                    pattern.as_str()
                )));
            }
        }

        Ok(())
    }
}

/// SIGKILL every process in the group led by `pid`.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(err) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        tracing::debug!("Could not kill process group {}: {}", pid, err);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

fn format_secs(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{}", duration.as_secs_f64())
    }
}
