//src/runner.rs

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::command::ToolCommand;
use crate::error::TrimError;
use crate::types::RunResult;

/// How often a bounded wait checks on the child.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs an external command to completion and reports what it printed.
///
/// Everything that assembles commands or interprets their output talks to
/// this trait, never to `std::process` directly.
pub trait ToolRunner {
    fn run(&self, command: &ToolCommand) -> Result<RunResult, TrimError>;
}

/// Decode captured stderr. Invalid UTF-8 is not fatal: the bytes are kept in
/// a lossy textual form instead.
pub fn decode_stderr(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(text) => text.to_string(),
        Err(e) => {
            log::debug!("stderr is not valid UTF-8 ({e}); keeping a lossy copy");
            String::from_utf8_lossy(raw).into_owned()
        }
    }
}

/// [`ToolRunner`] backed by a real child process.
#[derive(Debug, Clone, Default)]
pub struct SubprocessRunner {
    timeout: Option<Duration>,
    cancel: Arc<AtomicBool>,
}

impl SubprocessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the child if it is still running after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Flag another thread can raise to stop the running child.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Wait for `child`, killing it when the deadline passes or cancellation
    /// is requested. Returns the exit code and whether it was stopped.
    fn wait(&self, child: &mut Child, program: &str) -> Result<(i32, bool), TrimError> {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        loop {
            let status = child.try_wait().map_err(|source| TrimError::Spawn {
                program: program.to_string(),
                source,
            })?;
            if let Some(status) = status {
                return Ok((status.code().unwrap_or(-1), false));
            }

            let expired = deadline.is_some_and(|d| Instant::now() >= d);
            if expired || self.cancel.load(Ordering::Relaxed) {
                log::warn!(
                    "Stopping {program}: {}",
                    if expired { "timeout reached" } else { "cancelled" }
                );
                // The child may have exited between try_wait and kill
                let _ = child.kill();
                let _ = child.wait();
                return Ok((-1, true));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        buf
    })
}

impl ToolRunner for SubprocessRunner {
    fn run(&self, command: &ToolCommand) -> Result<RunResult, TrimError> {
        log::debug!("Running subprocess with command: {:?}", command.argv());

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TrimError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        // Pipes must be drained while the child runs
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let (exit_code, timed_out) = self.wait(&mut child, &command.program)?;

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        Ok(RunResult {
            exit_code,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: decode_stderr(&stderr),
            timed_out,
        })
    }
}
