//! Running the external command-line tools (`yt-dlp`, `ffmpeg`).
//!
//! Every invocation is bounded by a timeout and the child is killed if the
//! timeout fires. stdin is closed so a tool can never block on a prompt.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;

/// How long `--version` probes may take.
const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from running an external tool
#[derive(Debug, Clone, thiserror::Error)]
pub enum ToolError {
    #[error("Failed to run {tool}: {message}")]
    Spawn { tool: String, message: String },

    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },
}

fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

/// Run `program args...`, returning its output when it exits successfully.
pub async fn run<I, S>(program: &Path, args: I, timeout: Duration) -> Result<Output, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let tool = tool_name(program);
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!("Running {:?}", command.as_std());

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(ToolError::Spawn {
                tool,
                message: e.to_string(),
            });
        }
        Err(_) => {
            return Err(ToolError::Timeout {
                tool,
                secs: timeout.as_secs(),
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ToolError::Failed {
            tool,
            status: output.status.to_string(),
            stderr: stderr.trim().chars().take(500).collect(),
        });
    }

    Ok(output)
}

/// First line of `program <flag>` output, if the tool runs at all.
pub async fn version(program: &Path, flag: &str) -> Option<String> {
    let output = run(program, [flag], VERSION_PROBE_TIMEOUT).await.ok()?;
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}
