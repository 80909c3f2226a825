//! Duration probing of asset lists.

use std::path::{Path, PathBuf};

use chorus_spec::{AudioAsset, BackendError, ProbeError};
use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::error::EngineResult;

/// Reads duration information for one asset.
pub trait Probe: Sync {
    /// Probes `path`, failing if it has no audio stream or the probe fails.
    fn probe(&self, path: &Path) -> Result<AudioAsset, ProbeError>;
}

/// An input left out of a stage, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedAsset {
    pub path: PathBuf,
    pub code: &'static str,
    pub message: String,
}

impl SkippedAsset {
    /// Records an asset skipped because of `error`.
    pub fn from_error<E: BackendError>(path: impl Into<PathBuf>, error: &E) -> Self {
        Self {
            path: path.into(),
            code: error.code(),
            message: error.message(),
        }
    }
}

/// Probes every path on a pool of `width` workers.
///
/// Results keep input order. Failed probes become [`SkippedAsset`]s instead of
/// failing the call.
pub fn probe_all<P: Probe + ?Sized>(
    probe: &P,
    paths: &[PathBuf],
    width: usize,
) -> EngineResult<(Vec<AudioAsset>, Vec<SkippedAsset>)> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(width.max(1))
        .thread_name(|i| format!("chorus-probe-{}", i))
        .build()?;

    let outcomes: Vec<(PathBuf, Result<AudioAsset, ProbeError>)> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| (path.clone(), probe.probe(path)))
            .collect()
    });

    let mut assets = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(asset) => assets.push(asset),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping asset that failed to probe");
                skipped.push(SkippedAsset::from_error(path, &e));
            }
        }
    }
    Ok((assets, skipped))
}
