//! Standardize: every raw asset becomes a mono file at the reference rate.

use std::path::{Path, PathBuf};

use chorus_spec::{
    ChorusConfig, EffectDescriptor, JobBatch, JobSource, LibraryLayout, OutputParams, RenderJob,
    Stage,
};

use super::{ensure_stage_dir, silence_trim_filter, HIGHPASS_HZ};
use crate::error::EngineResult;

/// Output name for a standardized asset: the full source file name plus the
/// processed extension, so sources differing only by extension stay distinct.
pub fn standardized_file_name(source: &Path, extension: &str) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string());
    format!("{}.{}", name, extension)
}

/// Builds one job per raw asset.
///
/// The chain forces mono, removes rumble, trims silence at both ends,
/// resamples to the reference rate and normalizes loudness.
pub fn build_standardize(
    config: &ChorusConfig,
    layout: &LibraryLayout,
    sources: &[PathBuf],
) -> EngineResult<JobBatch> {
    let out_dir = layout.output_dir(Stage::Standardize);
    ensure_stage_dir(&out_dir)?;

    let filters = format!(
        "aformat=channel_layouts=mono,highpass=f={},{},aresample={},dynaudnorm",
        HIGHPASS_HZ,
        silence_trim_filter(),
        config.sample_rate
    );

    let mut batch = JobBatch::new(Stage::Standardize);
    for source in sources {
        batch.push(RenderJob {
            stage: Stage::Standardize,
            sources: vec![JobSource::file(source)],
            effects: EffectDescriptor::Chain {
                filters: filters.clone(),
            },
            output: OutputParams {
                codec_args: config.codec.mono_args.clone(),
                sample_rate: config.sample_rate,
                channels: 1,
                max_duration_secs: None,
                metadata: Vec::new(),
            }
            .with_rate_comment(config.sample_rate),
            destination: out_dir.join(standardized_file_name(source, &config.codec.extension)),
        });
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_mono_job_per_source() {
        let dir = tempfile::tempdir().unwrap();
        let layout = LibraryLayout::new(dir.path());
        let config = ChorusConfig::default();
        let sources = vec![dir.path().join("wren.WAV"), dir.path().join("wren.mp3")];

        let batch = build_standardize(&config, &layout, &sources).unwrap();

        assert_eq!(batch.len(), 2);
        assert!(layout.processed().is_dir());
        let job = &batch.jobs[0];
        assert_eq!(job.output.channels, 1);
        assert_eq!(job.destination, layout.processed().join("wren.WAV.opus"));
        assert_ne!(batch.jobs[0].destination, batch.jobs[1].destination);
        let EffectDescriptor::Chain { filters } = &job.effects else {
            panic!("expected an inline chain");
        };
        assert_eq!(
            filters,
            "aformat=channel_layouts=mono,highpass=f=200,\
             silenceremove=1:0:-50dB:-1:0:-50dB,aresample=48000,dynaudnorm"
        );
    }

    #[test]
    fn test_directory_creation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = LibraryLayout::new(dir.path());
        let config = ChorusConfig::default();
        build_standardize(&config, &layout, &[]).unwrap();
        let batch = build_standardize(&config, &layout, &[]).unwrap();
        assert!(batch.is_empty());
    }
}
