//src/status.rs

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::command::ToolCommand;
use crate::error::TrimError;
use crate::runner::ToolRunner;

/// Outcome recorded in the status sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    pub fn from_exit_code(exit_code: i32) -> Self {
        if exit_code == 0 {
            Status::Pass
        } else {
            Status::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "pass",
            Status::Fail => "fail",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write the sentinel. It never carries error text; that goes to the log.
pub fn write_status<P: AsRef<Path>>(path: P, status: Status) -> Result<(), TrimError> {
    let path = path.as_ref();
    fs::write(path, status.as_str()).map_err(|e| TrimError::io(path, e))?;
    log::debug!("Wrote status '{}' to {}", status, path.display());
    Ok(())
}

/// Program name and version, as listed in the versions file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolVersion {
    pub program: String,
    pub version: String,
}

/// Ask the tool for its version. Whatever it prints is kept, even with a
/// non-zero exit code; `"undefined"` only when nothing was printed or the
/// command could not run at all.
pub fn probe_version(runner: &dyn ToolRunner, command: &ToolCommand) -> ToolVersion {
    let version = match runner.run(command) {
        Ok(result) if !result.stdout.trim().is_empty() => {
            if !result.success() {
                log::debug!("Version query exited with code {}", result.exit_code);
            }
            result.stdout.trim().to_string()
        }
        Ok(result) => {
            log::debug!("Version query printed nothing (exit code {})", result.exit_code);
            String::from("undefined")
        }
        Err(e) => {
            log::debug!("Version probe failed: {e}");
            String::from("undefined")
        }
    };
    ToolVersion {
        program: String::from("Trimmomatic"),
        version,
    }
}

pub fn write_versions<P: AsRef<Path>>(path: P, versions: &[ToolVersion]) -> Result<(), TrimError> {
    let path = path.as_ref();
    let text = serde_json::to_string(versions)?;
    fs::write(path, text).map_err(|e| TrimError::io(path, e))
}
