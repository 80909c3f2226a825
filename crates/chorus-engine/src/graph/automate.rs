//! Automate: spread each mono asset over the output channels with its own
//! randomized volume/pan curve.
//!
//! The filter graph splits the mono source into one copy per channel, runs
//! each copy through that channel's envelope expressions as successive gain
//! stages, and merges the copies back into one interleaved stream. Graphs grow
//! with the number of segments, so they always travel as script artifacts.

use std::fmt::Write as _;
use std::path::Path;

use chorus_spec::{
    file_stem, AudioAsset, ChorusConfig, EffectDescriptor, JobBatch, JobSource, LibraryLayout,
    OutputParams, RenderJob, ScheduleError, ScriptArtifact, Stage,
};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use super::ensure_stage_dir;
use crate::automation::{compile_automation, AutomationTrack};
use crate::error::EngineResult;
use crate::probe::SkippedAsset;
use crate::schedule::{generate_schedule, Schedule};

/// Label of the merged output pad.
const OUTPUT_LABEL: &str = "out";

/// An asset with its generated schedule and compiled track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomationPlan {
    pub asset: AudioAsset,
    pub schedule: Schedule,
    pub track: AutomationTrack,
}

/// Generates and compiles a schedule for every asset, single-threaded.
///
/// Assets with no usable duration are skipped. Any other schedule error means
/// the configured bounds are invalid and is returned.
pub fn plan_automation<R: Rng + ?Sized>(
    config: &ChorusConfig,
    assets: &[AudioAsset],
    rng: &mut R,
) -> Result<(Vec<AutomationPlan>, Vec<SkippedAsset>), ScheduleError> {
    let mut plans = Vec::with_capacity(assets.len());
    let mut skipped = Vec::new();
    for asset in assets {
        if !(asset.duration_secs.is_finite() && asset.duration_secs > 0.0) {
            let err = ScheduleError::NotPositive {
                name: "asset duration",
                value: asset.duration_secs,
            };
            warn!(path = %asset.path.display(), "skipping asset with no duration");
            skipped.push(SkippedAsset::from_error(&asset.path, &err));
            continue;
        }
        let schedule = generate_schedule(rng, asset.duration_secs, config)?;
        let track = compile_automation(&schedule.segments, &schedule.gains, config.fade_secs)?;
        debug!(
            path = %asset.path.display(),
            segments = schedule.segments.len(),
            breakpoints = track.breakpoints().len(),
            "compiled automation"
        );
        plans.push(AutomationPlan {
            asset: asset.clone(),
            schedule,
            track,
        });
    }
    Ok((plans, skipped))
}

/// Renders the filter graph for one track.
pub fn automation_script(track: &AutomationTrack, floor_db: f64) -> ScriptArtifact {
    let channels = track.channel_count();
    let mut graph = String::new();

    let _ = write!(graph, "[0:a]asplit={}", channels);
    for c in 0..channels {
        let _ = write!(graph, "[src{}]", c);
    }
    graph.push_str(";\n");

    for c in 0..channels {
        let stages: Vec<String> = track
            .envelopes(c, floor_db)
            .iter()
            .map(|e| format!("volume='{}':eval=frame", e.render()))
            .collect();
        let chain = if stages.is_empty() {
            "anull".to_string()
        } else {
            stages.join(",")
        };
        let _ = writeln!(graph, "[src{}]{}[ch{}];", c, chain, c);
    }

    for c in 0..channels {
        let _ = write!(graph, "[ch{}]", c);
    }
    if channels > 1 {
        let _ = write!(graph, "amerge=inputs={}[{}]", channels, OUTPUT_LABEL);
    } else {
        let _ = write!(graph, "anull[{}]", OUTPUT_LABEL);
    }

    ScriptArtifact::new(graph, OUTPUT_LABEL)
}

/// Output name for an automated render.
pub fn automated_file_name(source: &Path, extension: &str) -> String {
    format!("{}.{}", file_stem(source), extension)
}

/// Builds one job per planned asset.
pub fn build_automate(
    config: &ChorusConfig,
    layout: &LibraryLayout,
    plans: &[AutomationPlan],
) -> EngineResult<JobBatch> {
    let out_dir = layout.output_dir(Stage::Automate);
    ensure_stage_dir(&out_dir)?;

    let mut batch = JobBatch::new(Stage::Automate);
    for plan in plans {
        let script = automation_script(&plan.track, config.silence_floor_db);
        batch.push(RenderJob {
            stage: Stage::Automate,
            sources: vec![JobSource::file(&plan.asset.path)],
            effects: EffectDescriptor::Script { script },
            output: OutputParams {
                codec_args: config.codec.multichannel_args.clone(),
                sample_rate: config.sample_rate,
                channels: config.channels,
                max_duration_secs: None,
                metadata: Vec::new(),
            },
            destination: out_dir.join(automated_file_name(
                &plan.asset.path,
                &config.codec.extension,
            )),
        });
    }
    Ok(batch)
}
