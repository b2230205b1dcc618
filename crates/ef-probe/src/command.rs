//! Running ffprobe and ffmpeg.
//!
//! [`ToolCommand`] collects arguments, runs the program with no stdin and a
//! deadline, and turns every failure into [`ef_core::Error::Tool`] tagged
//! with the program's file name.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use ef_core::Error;
use tokio::process::Command;

/// Deadline for a probe or an encoder listing.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Text a tool printed before exiting successfully.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(&mut self, args: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Run to completion and capture its output.
    ///
    /// # Errors
    ///
    /// [`Error::Tool`] when the program cannot be spawned, exits non-zero
    /// (stderr is included) or outlives the timeout. A timed-out process is
    /// killed.
    pub async fn execute(&self) -> ef_core::Result<ToolOutput> {
        let tool = tool_name(&self.program);
        let failed = |message: String| Error::tool(tool.clone(), message);

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failed(format!("failed to spawn: {e}")))?;
        tracing::trace!(tool = %tool, args = ?self.args, "spawned");

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| failed(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| failed(format!("waiting for exit: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(failed(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(ToolOutput { stdout, stderr })
    }
}

fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .unwrap_or(program.as_os_str())
        .to_string_lossy()
        .into_owned()
}
