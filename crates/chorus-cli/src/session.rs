//! Per-invocation state shared by the commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chorus_backend_ffmpeg::{FfmpegConfig, FfmpegTransformer, FfprobeProbe};
use chorus_engine::rng::random_seed;
use chorus_engine::Pipeline;
use chorus_spec::{ChorusConfig, LibraryLayout, WorkerConfig};

/// Global options collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Library root holding the raw assets.
    pub library: PathBuf,
    /// JSON configuration file.
    pub config_path: Option<PathBuf>,
    /// Base seed for every stage.
    pub seed: Option<u64>,
    /// Worker-pool width for every parallel stage.
    pub workers: Option<usize>,
    /// Directory holding ffmpeg and ffprobe.
    pub ffmpeg_dir: Option<PathBuf>,
    pub mix_candidates: Option<usize>,
    pub mix_duration_secs: Option<f64>,
}

/// Loads the configuration file (or defaults) and applies command-line
/// overrides, then validates the result.
pub fn load_config(options: &SessionOptions) -> Result<ChorusConfig> {
    let mut config = match &options.config_path {
        Some(path) => ChorusConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ChorusConfig::default(),
    };

    if let Some(width) = options.workers {
        config.workers = WorkerConfig {
            mix: config.workers.mix,
            ..WorkerConfig::uniform(width)
        };
    }
    if let Some(count) = options.mix_candidates {
        config.mix_candidates = count;
    }
    if let Some(secs) = options.mix_duration_secs {
        config.mix_duration_secs = secs;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Loaded configuration plus the located engine executables.
pub struct Session {
    pub config: ChorusConfig,
    pub layout: LibraryLayout,
    pub seed: u64,
    pub probe: FfprobeProbe,
    pub engine: FfmpegTransformer,
}

impl Session {
    /// Loads configuration and locates ffmpeg and ffprobe.
    pub fn open(options: &SessionOptions) -> Result<Self> {
        let config = load_config(options)?;
        let ffmpeg = ffmpeg_config(options.ffmpeg_dir.as_deref(), &config);
        let probe = FfprobeProbe::new(&ffmpeg).context("Failed to locate ffprobe")?;
        let engine = FfmpegTransformer::new(&ffmpeg).context("Failed to locate ffmpeg")?;

        Ok(Self {
            layout: LibraryLayout::new(&options.library),
            seed: options.seed.unwrap_or_else(random_seed),
            config,
            probe,
            engine,
        })
    }

    /// Builds the stage pipeline over this session's library.
    pub fn pipeline(&self) -> Result<Pipeline<'_, FfprobeProbe, FfmpegTransformer>> {
        let pipeline = Pipeline::new(&self.config, self.layout.clone(), &self.probe, &self.engine)?;
        Ok(pipeline.with_seed(self.seed))
    }
}

/// Backend settings derived from the run configuration.
pub fn ffmpeg_config(ffmpeg_dir: Option<&Path>, config: &ChorusConfig) -> FfmpegConfig {
    let ffmpeg = FfmpegConfig::default().timeout_secs(config.job_timeout_secs);
    match ffmpeg_dir {
        Some(dir) => ffmpeg.ffmpeg_dir(dir),
        None => ffmpeg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overrides_apply_on_top_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chorus.json");
        std::fs::write(&path, r#"{ "channels": 4, "workers": { "mix": 2 } }"#).unwrap();

        let config = load_config(&SessionOptions {
            config_path: Some(path),
            workers: Some(3),
            mix_duration_secs: Some(90.0),
            ..SessionOptions::default()
        })
        .unwrap();

        assert_eq!(config.channels, 4);
        assert_eq!(config.workers.automate, 3);
        assert_eq!(config.workers.probe, 3);
        assert_eq!(config.workers.mix, 2);
        assert_eq!(config.mix_duration_secs, 90.0);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let result = load_config(&SessionOptions {
            workers: Some(0),
            ..SessionOptions::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_ffmpeg_config_uses_job_timeout() {
        let config = ChorusConfig {
            job_timeout_secs: 42,
            ..ChorusConfig::default()
        };
        let ffmpeg = ffmpeg_config(Some(Path::new("/opt/ffmpeg")), &config);
        assert_eq!(ffmpeg.timeout.as_secs(), 42);
        assert_eq!(ffmpeg.ffmpeg_dir, Some(PathBuf::from("/opt/ffmpeg")));
    }
}
