//! Chorus Integration Test Infrastructure
//!
//! Stand-ins for the external engine so pipeline scenarios run without
//! ffmpeg:
//!
//! - [`FakeProbe`] reports a fixed duration for every asset, with per-name
//!   overrides and failures.
//! - [`FakeEngine`] writes each job's destination file and fails the jobs
//!   whose destination contains a marker.
//! - [`Library`] creates a temporary library of empty source files.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p chorus-tests
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chorus_engine::{Probe, Transformer};
use chorus_spec::{
    file_stem, AudioAsset, EffectDescriptor, ProbeError, RenderJob, ScriptArtifact,
    TransformError,
};
use tempfile::TempDir;

/// Probe returning canned durations.
#[derive(Debug, Clone)]
pub struct FakeProbe {
    default_secs: f64,
    durations: HashMap<String, f64>,
    failing: Vec<String>,
}

impl FakeProbe {
    /// Every asset lasts `default_secs`.
    pub fn new(default_secs: f64) -> Self {
        Self {
            default_secs,
            durations: HashMap::new(),
            failing: Vec::new(),
        }
    }

    /// Assets whose stem is `stem` last `secs`.
    pub fn with_duration(mut self, stem: &str, secs: f64) -> Self {
        self.durations.insert(stem.to_string(), secs);
        self
    }

    /// Assets whose file name contains `marker` have no audio stream.
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.failing.push(marker.to_string());
        self
    }
}

impl Probe for FakeProbe {
    fn probe(&self, path: &Path) -> Result<AudioAsset, ProbeError> {
        let name = path.to_string_lossy();
        if self.failing.iter().any(|m| name.contains(m.as_str())) {
            return Err(ProbeError::NoAudioStream {
                path: path.to_path_buf(),
            });
        }
        let secs = self
            .durations
            .get(&file_stem(path))
            .copied()
            .unwrap_or(self.default_secs);
        Ok(AudioAsset::new(path, secs, (secs * 48_000.0).round() as u64))
    }
}

/// Engine that touches each destination instead of rendering it.
#[derive(Debug, Default)]
pub struct FakeEngine {
    failing: Vec<String>,
    jobs: Mutex<Vec<RenderJob>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs whose destination contains `marker` fail like a crashed engine.
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.failing.push(marker.to_string());
        self
    }

    /// Every job the engine was asked to run, in call order.
    pub fn jobs(&self) -> Vec<RenderJob> {
        self.jobs.lock().map(|jobs| jobs.clone()).unwrap_or_default()
    }

    /// Script artifacts seen so far.
    pub fn scripts(&self) -> Vec<ScriptArtifact> {
        self.jobs()
            .into_iter()
            .filter_map(|job| match job.effects {
                EffectDescriptor::Script { script } => Some(script),
                EffectDescriptor::Chain { .. } => None,
            })
            .collect()
    }
}

impl Transformer for FakeEngine {
    fn transform(&self, job: &RenderJob) -> Result<(), TransformError> {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.push(job.clone());
        }
        let destination = job.destination.to_string_lossy();
        if self.failing.iter().any(|m| destination.contains(m.as_str())) {
            return Err(TransformError::process_failed(
                1,
                "Invalid data found when processing input",
            ));
        }
        std::fs::write(&job.destination, b"")?;
        Ok(())
    }
}

/// A temporary library root holding empty source files.
pub struct Library {
    dir: TempDir,
    sources: Vec<PathBuf>,
}

impl Library {
    /// Creates a library with one empty file per name.
    pub fn with_sources<S: AsRef<str>>(names: &[S]) -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let mut sources = Vec::with_capacity(names.len());
        for name in names {
            let path = dir.path().join(name.as_ref());
            std::fs::write(&path, b"")?;
            sources.push(path);
        }
        Ok(Self { dir, sources })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

/// Names `clip00.wav`, `clip01.wav`, ... for `count` sources.
pub fn clip_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("clip{:02}.wav", i)).collect()
}
