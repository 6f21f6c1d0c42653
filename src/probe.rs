// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::ProbeError;

/// Marker preceding the duration in ffmpeg/ffprobe diagnostic output
const DURATION_MARKER: &str = "Duration: ";

/// Media duration abstraction for testability
#[async_trait]
pub trait DurationProber: Send + Sync {
    /// Return the duration of `path` as `HH:MM:SS`
    async fn probe(&self, path: &Path) -> Result<String, ProbeError>;
}

/// Prober that shells out to `ffprobe` (or anything printing the same banner)
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: PathBuf,
}

impl FfprobeProber {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl DurationProber for FfprobeProber {
    async fn probe(&self, path: &Path) -> Result<String, ProbeError> {
        let output = Command::new(&self.program)
            .arg("-hide_banner")
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProbeError::LaunchFailed {
                program: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(ProbeError::ExitStatus {
                path: path.to_path_buf(),
                status: output.status.to_string(),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);

        parse_duration(&stderr)
            .or_else(|| parse_duration(&stdout))
            .ok_or_else(|| ProbeError::NoDuration {
                path: path.to_path_buf(),
            })
    }
}

/// Find `Duration: HH:MM:SS.ff` in probe output and return `HH:MM:SS`
pub fn parse_duration(output: &str) -> Option<String> {
    output
        .match_indices(DURATION_MARKER)
        .map(|(pos, _)| &output[pos + DURATION_MARKER.len()..])
        .find_map(match_timestamp)
}

/// Match `HH:MM:SS.f+` at the start of `s`
fn match_timestamp(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    if bytes.len() < 10 {
        return None;
    }

    let digits_at = |i: usize| bytes[i].is_ascii_digit() && bytes[i + 1].is_ascii_digit();
    let shape_ok = digits_at(0)
        && bytes[2] == b':'
        && digits_at(3)
        && bytes[5] == b':'
        && digits_at(6)
        && bytes[8] == b'.'
        && bytes[9].is_ascii_digit();

    shape_ok.then(|| s[..8].to_string())
}
