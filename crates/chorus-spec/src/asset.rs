//! Assets and the schedule primitives generated for them.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// A probed audio file. Immutable once probed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioAsset {
    /// Identity of the asset.
    pub path: PathBuf,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Duration in samples at the asset's own rate.
    pub duration_samples: u64,
}

impl AudioAsset {
    pub fn new(path: impl Into<PathBuf>, duration_secs: f64, duration_samples: u64) -> Self {
        Self {
            path: path.into(),
            duration_secs,
            duration_samples,
        }
    }
}

/// Returns the file stem of a path, or "asset" when it has none.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string())
}

/// One span of a randomized duration schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    /// Length in seconds.
    pub length_secs: f64,
}

impl Segment {
    pub fn new(length_secs: f64) -> Self {
        Self { length_secs }
    }
}

/// Sum of segment lengths.
pub fn total_length(segments: &[Segment]) -> f64 {
    segments.iter().map(|s| s.length_secs).sum()
}

/// A per-channel gain vector in dB.
///
/// A muted point holds `f64::NEG_INFINITY` on every channel; channels are
/// never silenced individually.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GainPoint {
    channels: Vec<f64>,
}

impl GainPoint {
    /// Creates an audible gain point from per-channel dB values.
    pub fn new(channels: Vec<f64>) -> Self {
        Self { channels }
    }

    /// Creates a point that mutes all `channel_count` channels.
    pub fn silent(channel_count: usize) -> Self {
        Self {
            channels: vec![f64::NEG_INFINITY; channel_count],
        }
    }

    /// Per-channel values in dB.
    pub fn channels(&self) -> &[f64] {
        &self.channels
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Value for one channel.
    pub fn get(&self, channel: usize) -> Option<f64> {
        self.channels.get(channel).copied()
    }

    /// True if every channel is the silent sentinel.
    pub fn is_silent(&self) -> bool {
        !self.channels.is_empty() && self.channels.iter().all(|v| is_silent_db(*v))
    }
}

/// True if a dB value is the silent sentinel.
pub fn is_silent_db(value: f64) -> bool {
    value == f64::NEG_INFINITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_point() {
        let point = GainPoint::silent(2);
        assert!(point.is_silent());
        assert_eq!(point.channel_count(), 2);
        assert!(!GainPoint::new(vec![-6.0, f64::NEG_INFINITY]).is_silent());
    }

    #[test]
    fn test_stem() {
        let path = Path::new("/lib/PROCESSED/Hirundo rustica-04.mp3.opus");
        assert_eq!(file_stem(path), "Hirundo rustica-04.mp3");
        assert_eq!(file_stem(Path::new("/")), "asset");
    }

    #[test]
    fn test_total_length() {
        let segments = [Segment::new(2.5), Segment::new(3.0), Segment::new(4.5)];
        assert_eq!(total_length(&segments), 10.0);
    }
}
