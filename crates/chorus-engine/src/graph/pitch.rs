//! Pitch shift: several slowed or sped-up variants of every standardized asset.
//!
//! Pitch and duration change together: the samples are reinterpreted at the
//! drawn rate, then resampled back to the reference rate.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chorus_spec::{
    file_stem, ChorusConfig, EffectDescriptor, JobBatch, JobSource, LibraryLayout, OutputParams,
    RenderJob, Stage,
};
use rand::Rng;
use tracing::debug;

use super::{ensure_stage_dir, silence_trim_filter};
use crate::error::EngineResult;
use crate::schedule::{generate_pitch_factors, pitch_rate};

/// Output name for a variant: the source stem tagged with its playback rate.
pub fn variant_file_name(source: &Path, rate: u32, extension: &str) -> String {
    format!("{}-{}.{}", file_stem(source), rate, extension)
}

/// Builds one job per (asset, drawn rate) pair.
///
/// All factors are drawn before any job is returned. Factors that round to
/// a rate already drawn for the same asset are dropped so every job has its
/// own destination.
pub fn build_pitch_shift<R: Rng + ?Sized>(
    config: &ChorusConfig,
    layout: &LibraryLayout,
    assets: &[PathBuf],
    rng: &mut R,
) -> EngineResult<JobBatch> {
    let out_dir = layout.output_dir(Stage::PitchShift);
    ensure_stage_dir(&out_dir)?;

    let mut batch = JobBatch::new(Stage::PitchShift);
    for asset in assets {
        let factors = generate_pitch_factors(
            rng,
            config.variants_per_asset,
            config.lowest_pitch_ratio,
            config.highest_pitch_ratio,
        )?;
        let rates: BTreeSet<u32> = factors
            .iter()
            .map(|f| pitch_rate(*f, config.sample_rate))
            .collect();
        if rates.len() < factors.len() {
            debug!(
                asset = %asset.display(),
                dropped = factors.len() - rates.len(),
                "dropped duplicate pitch rates"
            );
        }

        for rate in rates {
            batch.push(RenderJob {
                stage: Stage::PitchShift,
                sources: vec![JobSource::file(asset)],
                effects: EffectDescriptor::Chain {
                    filters: format!(
                        "{},asetrate={},aresample={}",
                        silence_trim_filter(),
                        rate,
                        config.sample_rate
                    ),
                },
                output: OutputParams {
                    codec_args: config.codec.mono_args.clone(),
                    sample_rate: config.sample_rate,
                    channels: 1,
                    max_duration_secs: Some(config.max_variant_secs),
                    metadata: Vec::new(),
                }
                .with_rate_comment(rate),
                destination: out_dir.join(variant_file_name(asset, rate, &config.codec.extension)),
            });
        }
    }
    Ok(batch)
}
