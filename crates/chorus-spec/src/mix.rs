//! Final mix plan.

use serde::Serialize;

use crate::asset::AudioAsset;

/// One sampled asset and the offset its loop starts from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixEntry {
    pub asset: AudioAsset,
    /// Loop-in point in `[0, asset.duration_secs)`.
    pub offset_secs: f64,
}

/// A sampled population of processed assets for the fan-in render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixPlan {
    pub entries: Vec<MixEntry>,
    /// Length of the final render, in seconds.
    pub duration_secs: f64,
    pub channels: u16,
}

impl MixPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
