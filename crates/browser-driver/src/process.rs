use std::process::Stdio;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::types::{DriverRequest, DriverResponse};
use crate::{DriverError, Result};

// ─── DriverProcess ────────────────────────────────────────────────────────

/// A running actuator sidecar subprocess.
///
/// Requests are written as JSON lines to stdin; responses are read as JSONL
/// from stdout. The child is long-lived because the automation session is
/// stateful (one active page/context). Stderr is captured in a background
/// task and surfaced on process exit errors.
pub(crate) struct DriverProcess {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    stdin: Option<ChildStdin>,
    /// Stderr output collected by a background reader task.
    stderr_buf: Arc<Mutex<String>>,
}

impl DriverProcess {
    /// Spawn the configured sidecar command.
    pub(crate) fn spawn(command: &str, args: &[String]) -> Result<Self> {
        let mut cmd = Command::new(command);
        cmd.args(args);
        Self::from_command(cmd)
    }

    /// Spawn an arbitrary command as a mock sidecar.
    /// Used in unit tests to inject a command that emits fixed JSON lines.
    #[cfg(test)]
    pub(crate) fn spawn_command(cmd: Command) -> Result<Self> {
        Self::from_command(cmd)
    }

    fn from_command(mut cmd: Command) -> Result<Self> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(DriverError::Io)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DriverError::Process("stdout not captured".into()))?;

        let stdin = child.stdin.take();

        // Drain stderr into a buffer so exit errors can include it.
        let stderr_buf = Arc::new(Mutex::new(String::new()));
        if let Some(stderr) = child.stderr.take() {
            let buf = Arc::clone(&stderr_buf);
            tokio::spawn(async move {
                let mut reader = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    if let Ok(mut b) = buf.lock() {
                        if !b.is_empty() {
                            b.push('\n');
                        }
                        b.push_str(&line);
                    }
                }
            });
        }

        let lines = BufReader::new(stdout).lines();
        Ok(Self {
            child,
            lines,
            stdin,
            stderr_buf,
        })
    }

    /// Send one request and read the next response line.
    ///
    /// Unknown message types emitted by the sidecar (progress events,
    /// debug chatter with a `"type"` field) are silently skipped.
    pub(crate) async fn call(&mut self, request: &DriverRequest) -> Result<DriverResponse> {
        self.send(request).await?;
        match self.next_response().await? {
            Some(response) => Ok(response),
            None => {
                let stderr = self
                    .stderr_buf
                    .lock()
                    .ok()
                    .map(|b| b.clone())
                    .unwrap_or_default();
                let msg = if stderr.is_empty() {
                    "sidecar exited before responding".to_string()
                } else {
                    format!("sidecar exited before responding\nstderr: {stderr}")
                };
                Err(DriverError::Process(msg))
            }
        }
    }

    async fn send(&mut self, request: &DriverRequest) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| DriverError::Process("stdin already closed".into()))?;

        let mut buf = serde_json::to_vec(request)
            .map_err(|e| DriverError::Process(format!("failed to serialize request: {e}")))?;
        buf.push(b'\n');

        stdin.write_all(&buf).await.map_err(DriverError::Io)?;
        stdin.flush().await.map_err(DriverError::Io)?;

        Ok(())
    }

    /// Read the next non-empty JSONL line from stdout and deserialize it.
    ///
    /// Returns `Ok(None)` on EOF (sidecar exited).
    async fn next_response(&mut self) -> Result<Option<DriverResponse>> {
        loop {
            match self.lines.next_line().await {
                Err(e) => return Err(DriverError::Io(e)),
                Ok(None) => return Ok(None),
                Ok(Some(line)) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<DriverResponse>(trimmed) {
                        Ok(response) => return Ok(Some(response)),
                        Err(e) => {
                            // Valid JSON with an unrecognised "type" is a
                            // message from a newer sidecar: skip it.
                            if is_unknown_message_type(trimmed) {
                                continue;
                            }
                            return Err(DriverError::Parse {
                                line: trimmed.to_owned(),
                                source: e,
                            });
                        }
                    }
                }
            }
        }
    }

    /// Kill the subprocess (best-effort; errors are silently ignored).
    pub(crate) async fn kill(&mut self) {
        let _ = self.child.kill().await;
    }
}

/// Check if a JSON line has a `"type"` field with a value we don't recognise.
/// If it's not valid JSON, it's a genuine parse error.
fn is_unknown_message_type(line: &str) -> bool {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(line) {
        v.get("type").is_some()
    } else {
        false
    }
}
