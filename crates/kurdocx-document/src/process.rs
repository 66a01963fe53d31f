// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blocking subprocess runner shared by every external collaborator.
//
// Stdout and stderr go to one anonymous temporary file, so the captured log
// interleaves both streams in the order the child wrote them. An optional
// deadline is enforced by polling; on expiry the child is killed.

use std::io::{Read, Seek, SeekFrom};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use kurdocx_core::error::{ConvertError, Result};
use tracing::{debug, instrument, warn};

/// How often a child with a deadline is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How a captured run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The child exited on its own. `None` when it was ended by a signal.
    Exited(Option<i32>),
    /// The deadline passed and the child was killed.
    TimedOut(Duration),
}

/// Exit information plus the combined stdout/stderr log of one run.
#[derive(Debug, Clone)]
pub struct CapturedRun {
    pub outcome: RunOutcome,
    pub log: String,
}

impl CapturedRun {
    /// Exit code 0 is the only success.
    pub fn succeeded(&self) -> bool {
        self.outcome == RunOutcome::Exited(Some(0))
    }

    /// The exit code, if the child exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self.outcome {
            RunOutcome::Exited(code) => code,
            RunOutcome::TimedOut(_) => None,
        }
    }

    /// Turn anything but a clean exit into an error naming `tool`.
    pub fn into_success(self, tool: &str) -> Result<String> {
        match self.outcome {
            RunOutcome::Exited(Some(0)) => Ok(self.log),
            RunOutcome::Exited(code) => Err(ConvertError::ExternalTool {
                tool: tool.to_string(),
                detail: format!(
                    "exit status {}: {}",
                    code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
                    self.log.trim()
                ),
            }),
            RunOutcome::TimedOut(after) => Err(ConvertError::ToolTimeout {
                tool: tool.to_string(),
                after,
            }),
        }
    }
}

/// Run `command` to completion, capturing its combined output.
///
/// Fails only when the child cannot be started or the log cannot be read
/// back; a non-zero exit or a timeout is reported through [`RunOutcome`].
#[instrument(skip(command), fields(program = ?command.get_program()))]
pub fn run_captured(
    tool: &str,
    command: &mut Command,
    timeout: Option<Duration>,
) -> Result<CapturedRun> {
    let mut log_file = tempfile::tempfile()?;
    let stdout = log_file.try_clone()?;
    let stderr = log_file.try_clone()?;

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .spawn()
        .map_err(|err| ConvertError::ExternalTool {
            tool: tool.to_string(),
            detail: format!("failed to start: {err}"),
        })?;

    let outcome = match timeout {
        None => RunOutcome::Exited(child.wait()?.code()),
        Some(limit) => {
            let deadline = Instant::now() + limit;
            loop {
                if let Some(status) = child.try_wait()? {
                    break RunOutcome::Exited(status.code());
                }
                if Instant::now() >= deadline {
                    warn!(tool, timeout_secs = limit.as_secs(), "Deadline passed, killing child");
                    // The child may exit between try_wait and kill.
                    let _ = child.kill();
                    child.wait()?;
                    break RunOutcome::TimedOut(limit);
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    };

    log_file.seek(SeekFrom::Start(0))?;
    let mut raw = Vec::new();
    log_file.read_to_end(&mut raw)?;
    let log = String::from_utf8_lossy(&raw).into_owned();

    debug!(tool, ?outcome, log_bytes = raw.len(), "Child finished");
    Ok(CapturedRun { outcome, log })
}

/// Whether `program` can be started at all.
///
/// The exit status is ignored: tools disagree on their version flag, and a
/// program that runs but rejects `args` is still installed.
pub fn command_available(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        command
    }

    #[test]
    fn captures_stdout_and_stderr_together() {
        let run = run_captured("sh", &mut sh("echo out; echo err 1>&2"), None).unwrap();
        assert!(run.succeeded());
        assert!(run.log.contains("out"));
        assert!(run.log.contains("err"));
    }

    #[test]
    fn non_zero_exit_is_not_an_error() {
        let run = run_captured("sh", &mut sh("echo broken; exit 3"), None).unwrap();
        assert!(!run.succeeded());
        assert_eq!(run.exit_code(), Some(3));

        let err = run.into_success("sh").unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn deadline_kills_the_child() {
        let started = Instant::now();
        let run = run_captured(
            "sh",
            &mut sh("sleep 5"),
            Some(Duration::from_millis(200)),
        )
        .unwrap();
        assert!(matches!(run.outcome, RunOutcome::TimedOut(_)));
        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(matches!(
            run.into_success("sh"),
            Err(ConvertError::ToolTimeout { .. })
        ));
    }

    #[test]
    fn missing_program_fails_to_start() {
        let mut command = Command::new("kurdocx-definitely-not-installed");
        let err = run_captured("missing", &mut command, None).unwrap_err();
        assert!(err.to_string().contains("failed to start"));
        assert!(!command_available("kurdocx-definitely-not-installed", &["--version"]));
    }

    #[test]
    fn installed_program_with_failing_status_is_available() {
        assert!(command_available("sh", &["-c", "exit 1"]));
    }
}
