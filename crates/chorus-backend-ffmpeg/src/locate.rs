//! Locating the ffmpeg executables.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the directory that holds ffmpeg and ffprobe.
pub const FFMPEG_DIR_ENV: &str = "CHORUS_FFMPEG_DIR";

/// Default timeout for one ffmpeg invocation (1 hour).
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

/// Configuration shared by the probe and the transformer.
#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    /// Directory holding `ffmpeg` and `ffprobe`.
    pub ffmpeg_dir: Option<PathBuf>,
    /// Kill an ffmpeg invocation after this long.
    pub timeout: Duration,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_dir: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FfmpegConfig {
    /// Sets the directory holding the executables.
    pub fn ffmpeg_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ffmpeg_dir = Some(dir.into());
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Finds `name` in `dir`, then in `CHORUS_FFMPEG_DIR`, then on PATH.
pub fn find_executable(name: &str, dir: Option<&Path>) -> Option<PathBuf> {
    // Config override first
    if let Some(dir) = dir {
        if let Some(path) = in_dir(dir, name) {
            return Some(path);
        }
    }

    if let Some(dir) = std::env::var_os(FFMPEG_DIR_ENV) {
        if let Some(path) = in_dir(Path::new(&dir), name) {
            return Some(path);
        }
    }

    which::which(name).ok()
}

fn in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    let candidates = if cfg!(windows) {
        vec![format!("{}.exe", name), name.to_string()]
    } else {
        vec![name.to_string()]
    };
    candidates
        .into_iter()
        .map(|candidate| dir.join(candidate))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = FfmpegConfig::default()
            .ffmpeg_dir("/opt/ffmpeg/bin")
            .timeout_secs(90);

        assert_eq!(config.ffmpeg_dir, Some(PathBuf::from("/opt/ffmpeg/bin")));
        assert_eq!(config.timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_explicit_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        let name = if cfg!(windows) { "ffprobe.exe" } else { "ffprobe" };
        std::fs::write(dir.path().join(name), b"").unwrap();

        let found = find_executable("ffprobe", Some(dir.path())).unwrap();
        assert_eq!(found, dir.path().join(name));
    }

    #[test]
    fn test_missing_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_executable("chorus-no-such-tool", Some(dir.path())).is_none());
    }
}
