//! [`EncodeEngine`] backed by the system `ffmpeg` binary and a temporary staging directory.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context;

use crate::encode::engine::{EncodeEngine, EncodeJob};
use crate::foundation::error::{ReelError, ReelResult};

pub struct FfmpegEngine {
    binary: PathBuf,
    staging: Option<tempfile::TempDir>,
}

impl FfmpegEngine {
    /// Use `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self::with_binary("ffmpeg")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            staging: None,
        }
    }

    pub fn staging_dir(&self) -> Option<&Path> {
        self.staging.as_ref().map(|d| d.path())
    }

    fn staged(&self, name: &str) -> ReelResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(ReelError::validation(format!(
                "staged name '{name}' must be a plain file name"
            )));
        }
        let dir = self
            .staging_dir()
            .ok_or_else(|| ReelError::engine("ffmpeg engine not initialized"))?;
        Ok(dir.join(name))
    }
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Return `true` when `binary -version` runs successfully.
pub fn is_ffmpeg_available(binary: &Path) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// `frame=<n>` from one `-progress` line.
fn progress_frame(line: &str) -> Option<u64> {
    line.trim().strip_prefix("frame=")?.trim().parse().ok()
}

impl EncodeEngine for FfmpegEngine {
    fn init(&mut self) -> ReelResult<()> {
        if self.staging.is_some() {
            return Ok(());
        }
        if !is_ffmpeg_available(&self.binary) {
            return Err(ReelError::engine(format!(
                "'{}' is required for encoding, but could not be run",
                self.binary.display()
            )));
        }
        let dir = tempfile::Builder::new()
            .prefix("slidereel-")
            .tempdir()
            .context("create ffmpeg staging directory")?;
        tracing::debug!(dir = %dir.path().display(), "ffmpeg staging ready");
        self.staging = Some(dir);
        Ok(())
    }

    fn write_input(&mut self, name: &str, bytes: &[u8]) -> ReelResult<()> {
        let path = self.staged(name)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("write staged input '{}'", path.display()))?;
        Ok(())
    }

    fn run(&mut self, job: &EncodeJob, on_progress: &mut dyn FnMut(f64)) -> ReelResult<()> {
        let dir = self
            .staging_dir()
            .ok_or_else(|| ReelError::engine("ffmpeg engine not initialized"))?
            .to_path_buf();

        let mut cmd = Command::new(&self.binary);
        cmd.current_dir(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .args([
                "-hide_banner",
                "-nostdin",
                "-y",
                "-loglevel",
                "error",
                "-progress",
                "pipe:1",
                "-nostats",
            ])
            .args(&job.args);
        tracing::debug!(args = ?job.args, "spawning ffmpeg");

        let mut child = cmd
            .spawn()
            .map_err(|e| ReelError::engine(format!("failed to spawn ffmpeg: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::engine("failed to open ffmpeg stdout"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::engine("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok::<_, std::io::Error>(bytes)
        });

        let expected = job.expected_frames.max(1) as f64;
        for line in BufReader::new(stdout).lines() {
            let Ok(line) = line else { break };
            if let Some(frame) = progress_frame(&line) {
                on_progress((frame as f64 / expected).min(1.0));
            }
        }

        let status = child
            .wait()
            .map_err(|e| ReelError::engine(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| ReelError::engine("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| ReelError::engine(format!("ffmpeg stderr read failed: {e}")))?;

        if !status.success() {
            return Err(ReelError::engine(format!(
                "ffmpeg exited with status {status}: {}",
                String::from_utf8_lossy(&stderr_bytes).trim()
            )));
        }
        on_progress(1.0);
        Ok(())
    }

    fn read_output(&mut self, name: &str) -> ReelResult<Vec<u8>> {
        let path = self.staged(name)?;
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read encoded output '{}'", path.display()))?;
        Ok(bytes)
    }

    fn cleanup(&mut self) -> ReelResult<()> {
        let Some(dir) = self.staging_dir() else {
            return Ok(());
        };
        let entries = std::fs::read_dir(dir).context("list ffmpeg staging directory")?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("remove staged file '{}'", path.display()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
