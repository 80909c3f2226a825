//! Render jobs: engine-agnostic descriptions of one transformation each.
//!
//! A [`RenderJob`] names its sources, the effect chain or script to apply,
//! the output parameters and a destination path. Jobs are immutable once
//! built and own nothing beyond their descriptor.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::hash::content_hash;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Standardize,
    PitchShift,
    Automate,
    Mix,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 4] = [
        Stage::Standardize,
        Stage::PitchShift,
        Stage::Automate,
        Stage::Mix,
    ];

    /// Returns the string identifier for this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Standardize => "standardize",
            Stage::PitchShift => "pitch_shift",
            Stage::Automate => "automate",
            Stage::Mix => "mix",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input of a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSource {
    pub path: PathBuf,
    /// Loop the input indefinitely.
    pub loop_forever: bool,
    /// Seek to this offset before reading.
    pub start_offset_secs: Option<f64>,
}

impl JobSource {
    /// A plain input read once from the start.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loop_forever: false,
            start_offset_secs: None,
        }
    }

    /// An input looped forever from a loop-in offset.
    pub fn looped_from(path: impl Into<PathBuf>, offset_secs: f64) -> Self {
        Self {
            path: path.into(),
            loop_forever: true,
            start_offset_secs: Some(offset_secs),
        }
    }
}

/// A filter graph carried by reference rather than inline.
///
/// The id is the BLAKE3 hash of the contents, so identical scripts share an
/// artifact name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptArtifact {
    id: String,
    contents: String,
    output_label: String,
}

impl ScriptArtifact {
    /// Creates an artifact whose final output pad is `output_label`.
    pub fn new(contents: impl Into<String>, output_label: impl Into<String>) -> Self {
        let contents = contents.into();
        Self {
            id: content_hash(contents.as_bytes()),
            contents,
            output_label: output_label.into(),
        }
    }

    /// Content hash (64 lowercase hex characters).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Label of the pad the engine should map to the output, without brackets.
    pub fn output_label(&self) -> &str {
        &self.output_label
    }

    /// File name under which the artifact is materialized.
    pub fn file_name(&self) -> String {
        format!("{}.graph", self.id)
    }
}

/// How the engine should transform the sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectDescriptor {
    /// A short effect chain applied to the single input.
    Chain { filters: String },
    /// A filter graph passed out-of-band.
    Script { script: ScriptArtifact },
}

/// Codec and format parameters of a job's output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputParams {
    pub codec_args: Vec<String>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Truncate the output to this duration.
    pub max_duration_secs: Option<f64>,
    /// Metadata tags written into the output container.
    pub metadata: Vec<(String, String)>,
}

impl OutputParams {
    /// Tags the output with the sample rate it was played back at.
    pub fn with_rate_comment(mut self, rate: u32) -> Self {
        self.metadata
            .push(("comment".to_string(), format!("via samplerate {}", rate)));
        self
    }
}

/// One unit of work for the external engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderJob {
    pub stage: Stage,
    pub sources: Vec<JobSource>,
    pub effects: EffectDescriptor,
    pub output: OutputParams,
    pub destination: PathBuf,
}

/// All jobs of one stage. Job order carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobBatch {
    pub stage: Stage,
    pub jobs: Vec<RenderJob>,
}

impl JobBatch {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            jobs: Vec::new(),
        }
    }

    pub fn push(&mut self, job: RenderJob) {
        debug_assert_eq!(job.stage, self.stage);
        self.jobs.push(job);
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
