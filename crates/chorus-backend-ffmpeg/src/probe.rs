//! Duration probing with ffprobe.

use std::path::{Path, PathBuf};
use std::process::Command;

use chorus_engine::Probe;
use chorus_spec::{AudioAsset, ProbeError};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::locate::{find_executable, FfmpegConfig};

/// Probe backed by an `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    ffprobe: PathBuf,
}

impl FfprobeProbe {
    /// Locates `ffprobe` according to `config`.
    pub fn new(config: &FfmpegConfig) -> Result<Self, ProbeError> {
        let ffprobe = find_executable("ffprobe", config.ffmpeg_dir.as_deref())
            .ok_or(ProbeError::ProbeNotFound)?;
        Ok(Self { ffprobe })
    }

    /// Uses the executable at `path` as is.
    pub fn with_executable(path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: path.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.ffprobe
    }
}

impl Probe for FfprobeProbe {
    #[instrument(skip(self, path), fields(path = %path.display()))]
    fn probe(&self, path: &Path) -> Result<AudioAsset, ProbeError> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "quiet", "-hide_banner", "-print_format", "json"])
            .args(["-show_streams", "-select_streams", "a:0"])
            .arg(path)
            .output()
            .map_err(|source| ProbeError::SpawnFailed {
                path: path.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::ProcessFailed {
                path: path.to_path_buf(),
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let asset = parse_probe_output(path, &output.stdout)?;
        debug!(duration_secs = asset.duration_secs, "probed asset");
        Ok(asset)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    duration: Option<String>,
    sample_rate: Option<String>,
    duration_ts: Option<u64>,
}

/// Reads an asset's duration from ffprobe's JSON stream listing.
pub fn parse_probe_output(path: &Path, json: &[u8]) -> Result<AudioAsset, ProbeError> {
    let parsed: ProbeOutput =
        serde_json::from_slice(json).map_err(|e| ProbeError::malformed(path, e.to_string()))?;
    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| ProbeError::NoAudioStream {
            path: path.to_path_buf(),
        })?;

    let duration_secs: f64 = stream
        .duration
        .as_deref()
        .ok_or_else(|| ProbeError::malformed(path, "stream has no duration"))?
        .parse()
        .map_err(|_| ProbeError::malformed(path, "duration is not a number"))?;
    if !duration_secs.is_finite() || duration_secs < 0.0 {
        return Err(ProbeError::malformed(
            path,
            format!("invalid duration {}", duration_secs),
        ));
    }

    let sample_rate = stream
        .sample_rate
        .as_deref()
        .and_then(|rate| rate.parse::<f64>().ok());
    let duration_samples = match (sample_rate, stream.duration_ts) {
        (Some(rate), _) => (duration_secs * rate).round() as u64,
        (None, Some(ts)) => ts,
        (None, None) => 0,
    };

    Ok(AudioAsset::new(path, duration_secs, duration_samples))
}
