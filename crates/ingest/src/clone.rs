use crate::error::{IngestError, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::time::timeout;

/// `git clone --depth 1` into `target` under a hard timeout.
///
/// The child is killed if the timeout fires; prompts for credentials are
/// disabled so a private URL fails instead of hanging.
pub(crate) async fn clone_shallow(url: &str, target: &Path, limit: Duration) -> Result<()> {
    let mut child = tokio::process::Command::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg("--quiet")
        .arg("--")
        .arg(url)
        .arg(target)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(IngestError::GitUnavailable)?;

    let mut stderr_pipe = child.stderr.take();
    let run = async {
        let mut stderr = Vec::new();
        if let Some(pipe) = stderr_pipe.as_mut() {
            pipe.read_to_end(&mut stderr).await?;
        }
        let status = child.wait().await?;
        Ok::<_, std::io::Error>((status, stderr))
    };

    let (status, stderr) = match timeout(limit, run).await {
        Ok(finished) => finished?,
        Err(_) => {
            // reap before the caller removes the checkout directory
            if let Err(err) = child.kill().await {
                log::warn!("Failed to kill timed out git clone: {err}");
            }
            return Err(IngestError::CloneTimeout {
                secs: limit.as_secs(),
            });
        }
    };

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
        log::warn!("git clone of {url} failed: {stderr}");
        return Err(IngestError::CloneFailed { stderr });
    }

    log::debug!("Cloned {url} into {}", target.display());
    Ok(())
}
