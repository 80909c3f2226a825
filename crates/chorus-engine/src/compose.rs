//! Mix composer: samples the asset population for the final render.

use std::path::PathBuf;

use chorus_spec::validation::validate_positive;
use chorus_spec::{MixEntry, MixPlan, ScheduleError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::EngineResult;
use crate::probe::{probe_all, Probe, SkippedAsset};

/// A mix plan plus the sampled assets that could not be used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedMix {
    pub plan: MixPlan,
    pub skipped: Vec<SkippedAsset>,
}

/// Samples up to `count` distinct assets from `pool` and gives each a random
/// loop-in offset in `[0, duration)`.
///
/// `count` is clamped to the pool size. Sampled assets that fail to probe or
/// report no duration are dropped from the plan and listed as skipped, so
/// the plan may hold fewer than `count` entries.
pub fn plan_mix<P, R>(
    pool: &[PathBuf],
    count: usize,
    render_duration_secs: f64,
    channels: u16,
    probe: &P,
    probe_width: usize,
    rng: &mut R,
) -> EngineResult<ComposedMix>
where
    P: Probe + ?Sized,
    R: Rng + ?Sized,
{
    validate_positive("mix_duration_secs", render_duration_secs)?;
    validate_positive("channels", f64::from(channels))?;

    let count = count.min(pool.len());
    let sampled: Vec<PathBuf> = pool.choose_multiple(rng, count).cloned().collect();
    let (assets, mut skipped) = probe_all(probe, &sampled, probe_width)?;

    let mut entries = Vec::with_capacity(assets.len());
    for asset in assets {
        if !(asset.duration_secs.is_finite() && asset.duration_secs > 0.0) {
            let err = ScheduleError::NotPositive {
                name: "asset duration",
                value: asset.duration_secs,
            };
            warn!(path = %asset.path.display(), "leaving asset with no duration out of the mix");
            skipped.push(SkippedAsset::from_error(&asset.path, &err));
            continue;
        }
        let offset_secs = rng.gen_range(0.0..asset.duration_secs);
        entries.push(MixEntry { asset, offset_secs });
    }

    info!(
        pool = pool.len(),
        sampled = count,
        planned = entries.len(),
        "planned mix"
    );
    Ok(ComposedMix {
        plan: MixPlan {
            entries,
            duration_secs: render_duration_secs,
            channels,
        },
        skipped,
    })
}
