//! Mix: one fan-in render over a sampled population of automated assets.

use std::fmt::Write as _;

use chorus_spec::{
    ChorusConfig, EffectDescriptor, JobBatch, JobSource, LibraryLayout, MixPlan, OutputParams,
    RenderJob, ScriptArtifact, Stage,
};

use super::ensure_stage_dir;
use crate::error::EngineResult;

const OUTPUT_LABEL: &str = "out";

/// Name of the final render, built from the input count, the duration and a
/// random disambiguator.
pub fn mix_file_name(
    count: usize,
    duration_secs: f64,
    disambiguator: u32,
    extension: &str,
) -> String {
    format!(
        "mix-{}x-{:.0}s-{:08x}.{}",
        count, duration_secs, disambiguator, extension
    )
}

/// Renders the fan-in graph for `inputs` streams.
///
/// Looped and seeked inputs carry no coherent timeline, so timestamps are
/// regenerated per input and again after mixing.
pub fn mix_script(inputs: usize, channels: u16) -> ScriptArtifact {
    let mut graph = String::new();
    for i in 0..inputs {
        let _ = writeln!(graph, "[{}:a]asetpts=N/SR/TB[a{}];", i, i);
    }
    for i in 0..inputs {
        let _ = write!(graph, "[a{}]", i);
    }
    let _ = write!(
        graph,
        "amix=inputs={}:duration=longest,asetpts=N/SR/TB,dynaudnorm",
        inputs
    );
    if channels == 2 {
        graph.push_str(",stereowiden");
    }
    let _ = write!(graph, "[{}]", OUTPUT_LABEL);
    ScriptArtifact::new(graph, OUTPUT_LABEL)
}

/// Builds the single mix job for `plan`, written to `file_name` under the
/// library root.
pub fn build_mix(
    config: &ChorusConfig,
    layout: &LibraryLayout,
    plan: &MixPlan,
    file_name: &str,
) -> EngineResult<JobBatch> {
    let out_dir = layout.output_dir(Stage::Mix);
    ensure_stage_dir(&out_dir)?;

    let mut batch = JobBatch::new(Stage::Mix);
    if plan.is_empty() {
        return Ok(batch);
    }

    let sources = plan
        .entries
        .iter()
        .map(|entry| JobSource::looped_from(&entry.asset.path, entry.offset_secs))
        .collect();

    batch.push(RenderJob {
        stage: Stage::Mix,
        sources,
        effects: EffectDescriptor::Script {
            script: mix_script(plan.len(), plan.channels),
        },
        output: OutputParams {
            codec_args: config.codec.multichannel_args.clone(),
            sample_rate: config.sample_rate,
            channels: plan.channels,
            max_duration_secs: Some(plan.duration_secs),
            metadata: Vec::new(),
        },
        destination: out_dir.join(file_name),
    });
    Ok(batch)
}
