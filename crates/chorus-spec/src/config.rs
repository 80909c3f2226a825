//! Load-time configuration.
//!
//! A [`ChorusConfig`] is built once (from defaults or a JSON file), validated,
//! and then passed by reference into every component. Nothing mutates it after
//! load.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ScheduleError};
use crate::validation::{
    validate_finite, validate_non_negative, validate_ordered, validate_positive,
    validate_unit_interval,
};

/// Default reference sample rate for every processed file.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Default crossfade between volume levels, in seconds.
pub const DEFAULT_FADE_SECS: f64 = 0.5;

/// Default worker-pool width for each stage.
pub const DEFAULT_WORKERS: usize = 8;

/// Extensions recognized as audio, compared case-insensitively.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "m4a", "mp4", "wav", "aiff", "aif", "mp3", "mp2", "webm", "ogg", "vorbis", "opus", "flac",
];

/// Static configuration for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChorusConfig {
    /// Reference sample rate (Hz) for all processed audio, including the mix.
    pub sample_rate: u32,
    /// Channel count of automated renders and the final mix.
    pub channels: u16,
    /// Crossfade duration between volume levels, in seconds.
    pub fade_secs: f64,
    /// Recognized audio extensions, without the dot.
    pub extensions: Vec<String>,
    /// Shortest randomized segment, in seconds.
    pub min_segment_secs: f64,
    /// Longest randomized segment, in seconds.
    pub max_segment_secs: f64,
    /// Quietest drawn level in dB.
    pub quietest_db: f64,
    /// Loudest drawn level in dB.
    pub loudest_db: f64,
    /// Probability that a gain point mutes every channel.
    pub silence_probability: f64,
    /// Finite dB value substituted for silence in engine expressions.
    pub silence_floor_db: f64,
    /// Lowest playback-rate ratio for pitch variants.
    pub lowest_pitch_ratio: f64,
    /// Highest playback-rate ratio for pitch variants.
    pub highest_pitch_ratio: f64,
    /// Pitch variants generated per standardized asset.
    pub variants_per_asset: usize,
    /// Duration cap for a pitch-shifted variant, in seconds.
    pub max_variant_secs: f64,
    /// How many processed assets the final mix samples.
    pub mix_candidates: usize,
    /// Length of the final render, in seconds.
    pub mix_duration_secs: f64,
    /// Kill an engine invocation after this many seconds.
    pub job_timeout_secs: u64,
    /// Worker-pool width per stage.
    pub workers: WorkerConfig,
    /// Codec arguments handed to the engine.
    pub codec: CodecConfig,
}

impl Default for ChorusConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 2,
            fade_secs: DEFAULT_FADE_SECS,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            min_segment_secs: 1.0,
            max_segment_secs: 20.0,
            quietest_db: -24.0,
            loudest_db: 0.0,
            silence_probability: 0.25,
            silence_floor_db: -120.0,
            lowest_pitch_ratio: 1.0 / 20.0,
            highest_pitch_ratio: 1.0 / 2.0,
            variants_per_asset: 8,
            max_variant_secs: 300.0,
            mix_candidates: 64,
            mix_duration_secs: 3600.0,
            job_timeout_secs: 3600,
            workers: WorkerConfig::default(),
            codec: CodecConfig::default(),
        }
    }
}

impl ChorusConfig {
    /// Parses a configuration from JSON and validates it.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Example
    /// ```
    /// use chorus_spec::ChorusConfig;
    ///
    /// let config = ChorusConfig::from_json(r#"{ "channels": 4, "fade_secs": 1.0 }"#).unwrap();
    /// assert_eq!(config.channels, 4);
    /// assert_eq!(config.sample_rate, 48_000);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ChorusConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Checks every bound. Called before any job is built.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        validate_positive("sample_rate", f64::from(self.sample_rate))?;
        validate_positive("channels", f64::from(self.channels))?;
        validate_non_negative("fade_secs", self.fade_secs)?;
        validate_positive("min_segment_secs", self.min_segment_secs)?;
        validate_ordered(
            ("min_segment_secs", self.min_segment_secs),
            ("max_segment_secs", self.max_segment_secs),
        )?;
        validate_ordered(
            ("quietest_db", self.quietest_db),
            ("loudest_db", self.loudest_db),
        )?;
        validate_unit_interval("silence_probability", self.silence_probability)?;
        validate_finite("silence_floor_db", self.silence_floor_db)?;
        validate_positive("lowest_pitch_ratio", self.lowest_pitch_ratio)?;
        validate_ordered(
            ("lowest_pitch_ratio", self.lowest_pitch_ratio),
            ("highest_pitch_ratio", self.highest_pitch_ratio),
        )?;
        validate_positive("max_variant_secs", self.max_variant_secs)?;
        validate_positive("mix_duration_secs", self.mix_duration_secs)?;
        validate_positive("job_timeout_secs", self.job_timeout_secs as f64)?;
        self.workers.validate()
    }

    /// Returns true if the path carries one of the recognized audio extensions.
    pub fn is_audio_file(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|known| known.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

/// Worker-pool width for each stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerConfig {
    pub probe: usize,
    pub standardize: usize,
    pub pitch_shift: usize,
    pub automate: usize,
    pub mix: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            probe: DEFAULT_WORKERS,
            standardize: DEFAULT_WORKERS,
            pitch_shift: DEFAULT_WORKERS,
            automate: DEFAULT_WORKERS,
            mix: 1,
        }
    }
}

impl WorkerConfig {
    /// Uses the same width for every stage.
    pub fn uniform(width: usize) -> Self {
        Self {
            probe: width,
            standardize: width,
            pitch_shift: width,
            automate: width,
            mix: width,
        }
    }

    fn validate(&self) -> Result<(), ScheduleError> {
        for (name, width) in [
            ("workers.probe", self.probe),
            ("workers.standardize", self.standardize),
            ("workers.pitch_shift", self.pitch_shift),
            ("workers.automate", self.automate),
            ("workers.mix", self.mix),
        ] {
            validate_positive(name, width as f64)?;
        }
        Ok(())
    }
}

/// Codec arguments for the engine's outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Arguments for mono outputs (standardized files and pitch variants).
    pub mono_args: Vec<String>,
    /// Arguments for multi-channel outputs (automated renders and the mix).
    pub multichannel_args: Vec<String>,
    /// Extension of every processed file, without the dot.
    pub extension: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            mono_args: vec!["-vn".into(), "-acodec".into(), "libopus".into()],
            multichannel_args: vec!["-vn".into(), "-acodec".into(), "libopus".into()],
            extension: "opus".into(),
        }
    }
}
