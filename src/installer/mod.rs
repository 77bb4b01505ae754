//! Driver installation via the external system utility
//!
//! Each descriptor file is handed to the platform installer utility as one
//! synchronous subprocess. The utility's exit code is the sole success
//! signal; whatever it prints is captured as diagnostic detail. A failed or
//! even unlaunchable subprocess is a per-task failure, never a process-level
//! error, so one bad driver cannot take down the sweep.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::InstallerConfig;

/// Placeholder expanded to the descriptor path in argument templates
const PATH_PLACEHOLDER: &str = "{path}";

/// How often a time-limited subprocess is polled for completion
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of a single installation attempt.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub path: PathBuf,
    pub succeeded: bool,
    /// Failure diagnostic; `None` on success
    pub detail: Option<String>,
}

impl InstallOutcome {
    fn success(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            succeeded: true,
            detail: None,
        }
    }

    fn failure(path: &Path, detail: String) -> Self {
        Self {
            path: path.to_path_buf(),
            succeeded: false,
            detail: Some(detail),
        }
    }
}

/// Wraps the external driver-installation utility.
#[derive(Debug, Clone)]
pub struct DriverInstaller {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl DriverInstaller {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &InstallerConfig) -> Self {
        let timeout = match config.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self::new(config.program.clone(), config.args.clone(), timeout)
    }

    /// Name of the external utility, for preflight checks and messages.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Attempt to install one driver package.
    pub fn install(&self, path: &Path) -> InstallOutcome {
        match self.run_utility(path) {
            Ok(output) if output.status.success() => InstallOutcome::success(path),
            Ok(output) => InstallOutcome::failure(path, describe_failure(&output)),
            Err(err) => InstallOutcome::failure(path, format!("{err:#}")),
        }
    }

    fn run_utility(&self, path: &Path) -> Result<Output> {
        let mut command = self.build_command(path);

        let Some(timeout) = self.timeout else {
            return command
                .output()
                .with_context(|| format!("failed to launch {}", self.program));
        };

        let mut child = command
            .spawn()
            .with_context(|| format!("failed to launch {}", self.program))?;
        let deadline = Instant::now() + timeout;

        loop {
            let status = child
                .try_wait()
                .with_context(|| format!("failed to poll {}", self.program))?;
            if status.is_some() {
                return child
                    .wait_with_output()
                    .with_context(|| format!("failed to collect output from {}", self.program));
            }
            if Instant::now() >= deadline {
                child.kill().ok();
                child.wait_with_output().ok();
                anyhow::bail!("{} timed out after {}s", self.program, timeout.as_secs());
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn build_command(&self, path: &Path) -> Command {
        let path_text = path.display().to_string();
        let mut substituted = false;

        let mut command = Command::new(&self.program);
        for arg in &self.args {
            if arg.contains(PATH_PLACEHOLDER) {
                command.arg(arg.replace(PATH_PLACEHOLDER, &path_text));
                substituted = true;
            } else {
                command.arg(arg);
            }
        }
        // Templates without a placeholder get the path appended
        if !substituted {
            command.arg(&path_text);
        }

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

/// Condense a failed utility run into a one-line diagnostic.
fn describe_failure(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let diagnostic = first_line(stderr.trim()).or_else(|| first_line(stdout.trim()));

    match diagnostic {
        Some(line) => format!("{} ({})", output.status, line),
        None => output.status.to_string(),
    }
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().next().filter(|line| !line.is_empty())
}
