use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Hands a finished script to whatever executes it. Success means the
/// presentation application accepted the script; nothing else is observed.
pub trait ScriptRunner {
    fn run(&self, script: &str) -> Result<()>;
}

/// Executes scripts through the `osascript` command line tool, feeding the
/// script over stdin.
pub struct Osascript {
    program: PathBuf,
}

impl Default for Osascript {
    fn default() -> Self {
        Self::with_program("osascript")
    }
}

impl Osascript {
    /// Use a different interpreter binary, mostly for tests.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ScriptRunner for Osascript {
    fn run(&self, script: &str) -> Result<()> {
        debug!(program = %self.program.display(), "spawning script interpreter");
        let mut child = Command::new(&self.program)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| Error::ExternalExecution {
                message: format!("failed to start {}: {err}", self.program.display()),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(script.as_bytes())
                .map_err(|err| Error::ExternalExecution {
                    message: format!("failed to send script: {err}"),
                })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|err| Error::ExternalExecution {
                message: format!("failed to wait for {}: {err}", self.program.display()),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("{} exited with {}", self.program.display(), output.status),
                detail => detail.to_string(),
            };
            Err(Error::ExternalExecution { message })
        }
    }
}

/// Writes the script to a file instead of running it.
pub struct ScriptFile {
    path: PathBuf,
}

impl ScriptFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScriptRunner for ScriptFile {
    fn run(&self, script: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, script)?;
        info!(path = %self.path.display(), "wrote deck script");
        Ok(())
    }
}
