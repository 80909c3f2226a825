//! Plan command implementation
//!
//! Dry run of the automation stage for one asset: prints the generated
//! schedule, breakpoints, envelope expressions and filter graph as JSON
//! without invoking ffmpeg.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chorus_backend_ffmpeg::FfprobeProbe;
use chorus_engine::graph::{automation_script, plan_automation, AutomationPlan};
use chorus_engine::rng::{create_stage_rng, random_seed};
use chorus_engine::Probe;
use chorus_spec::{AudioAsset, ChorusConfig, Stage};
use serde::Serialize;

use crate::session::{ffmpeg_config, load_config, SessionOptions};

/// Envelope expressions of one output channel, in application order.
#[derive(Debug, Serialize)]
pub struct ChannelEnvelopes {
    pub channel: usize,
    pub expressions: Vec<String>,
}

/// Everything the automation stage would render for one asset.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub seed: u64,
    #[serde(flatten)]
    pub plan: AutomationPlan,
    pub envelopes: Vec<ChannelEnvelopes>,
    pub script: String,
}

/// Builds the report for `asset` under `config`.
pub fn build_report(config: &ChorusConfig, asset: AudioAsset, seed: u64) -> Result<PlanReport> {
    let mut rng = create_stage_rng(seed, Stage::Automate);
    let (mut plans, skipped) = plan_automation(config, std::slice::from_ref(&asset), &mut rng)?;
    let Some(plan) = plans.pop() else {
        let reason = skipped
            .first()
            .map(|s| s.message.clone())
            .unwrap_or_else(|| "no plan generated".to_string());
        anyhow::bail!("Cannot plan {}: {}", asset.path.display(), reason);
    };

    let envelopes = (0..plan.track.channel_count())
        .map(|channel| ChannelEnvelopes {
            channel,
            expressions: plan
                .track
                .envelopes(channel, config.silence_floor_db)
                .iter()
                .map(|e| e.render())
                .collect(),
        })
        .collect();
    let script = automation_script(&plan.track, config.silence_floor_db)
        .contents()
        .to_string();

    Ok(PlanReport {
        seed,
        plan,
        envelopes,
        script,
    })
}

/// Probes `asset` (unless `duration_secs` is given) and prints its plan.
pub fn run(
    asset: &Path,
    duration_secs: Option<f64>,
    options: &SessionOptions,
) -> Result<ExitCode> {
    let config = load_config(options)?;
    let seed = options.seed.unwrap_or_else(random_seed);

    let asset = match duration_secs {
        Some(secs) => AudioAsset::new(
            asset,
            secs,
            (secs * f64::from(config.sample_rate)).round().max(0.0) as u64,
        ),
        None => {
            let ffmpeg = ffmpeg_config(options.ffmpeg_dir.as_deref(), &config);
            let probe = FfprobeProbe::new(&ffmpeg).context("Failed to locate ffprobe")?;
            probe
                .probe(asset)
                .with_context(|| format!("Failed to probe {}", asset.display()))?
        }
    };

    let report = build_report(&config, asset, seed)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_for_fixed_duration() {
        let config = ChorusConfig::default();
        let report = build_report(&config, AudioAsset::new("/lib/owl.opus", 60.0, 0), 5).unwrap();

        let segments = report.plan.schedule.segments.len();
        assert_eq!(report.plan.track.breakpoints().len(), 2 * segments);
        assert_eq!(report.envelopes.len(), 2);
        assert!(report
            .envelopes
            .iter()
            .all(|c| c.expressions.len() == 2 * segments - 1));
        assert!(report.script.ends_with("amerge=inputs=2[out]"));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["seed"], 5);
        assert!(value["schedule"]["segments"].is_array());
        assert!(value["track"]["breakpoints"].is_array());
    }

    #[test]
    fn test_same_seed_same_plan() {
        let config = ChorusConfig::default();
        let a = build_report(&config, AudioAsset::new("/lib/a.opus", 30.0, 0), 9).unwrap();
        let b = build_report(&config, AudioAsset::new("/lib/a.opus", 30.0, 0), 9).unwrap();
        assert_eq!(a.script, b.script);
    }

    #[test]
    fn test_zero_duration_cannot_be_planned() {
        let config = ChorusConfig::default();
        assert!(build_report(&config, AudioAsset::new("/lib/a.opus", 0.0, 0), 1).is_err());
    }
}
