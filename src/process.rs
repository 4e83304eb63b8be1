//! External process execution.
//!
//! Every git or build command goes through a [`CommandRunner`], so the
//! workflow can be driven against a recording runner in tests.

use crate::constants::PROCESS_POLL_MS;
use crate::error::{Result, SyncError};
use colored::Colorize;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Callback invoked before each external command runs.
pub type CommandLogger = fn(dir: &Path, program: &str, args: &[&str]);

pub fn no_op_logger(_dir: &Path, _program: &str, _args: &[&str]) {}

pub fn verbose_logger(dir: &Path, program: &str, args: &[&str]) {
    eprintln!(
        "  {} {} {}",
        "$".dimmed(),
        format!("{} {}", program, args.join(" ")).dimmed(),
        format!("({})", dir.display()).dimmed()
    );
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs a program in a directory and reports its captured output.
///
/// Only spawn failures and timeouts are errors; a non-zero exit is
/// reported through [`CommandOutput::success`].
pub trait CommandRunner: Send + Sync {
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Runner backed by real child processes.
#[derive(Debug, Clone, Copy)]
pub struct SystemRunner {
    timeout: Option<Duration>,
    logger: CommandLogger,
}

impl SystemRunner {
    pub fn new(timeout: Option<Duration>, logger: CommandLogger) -> Self {
        Self { timeout, logger }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(None, no_op_logger)
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput> {
        (self.logger)(dir, program, args);

        let spawn_failed = |source| SyncError::SpawnFailed {
            program: program.to_string(),
            source,
        };

        let mut child = Command::new(program)
            .current_dir(dir)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_failed)?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.timeout {
            Some(timeout) => wait_with_timeout(&mut child, timeout).map_err(|err| match err {
                WaitError::TimedOut => SyncError::CommandTimedOut {
                    command: format!("{} {}", program, args.join(" ")),
                    timeout,
                },
                WaitError::Io(source) => spawn_failed(source),
            })?,
            None => child.wait().map_err(spawn_failed)?,
        };

        Ok(CommandOutput {
            success: status.success(),
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }
}

enum WaitError {
    TimedOut,
    Io(std::io::Error),
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::result::Result<ExitStatus, WaitError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(WaitError::Io)? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            // Killing may race with a natural exit; either way the child is reaped.
            let _ = child.kill();
            let _ = child.wait();
            return Err(WaitError::TimedOut);
        }
        thread::sleep(Duration::from_millis(PROCESS_POLL_MS));
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default()
}
