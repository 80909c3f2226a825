//! Stage-by-stage orchestration.
//!
//! Each stage method takes the settled outputs of the previous stage, builds
//! its batch, and runs it to completion before returning. Random draws for a
//! stage all happen on the calling thread before its batch is dispatched.

use std::path::PathBuf;

use chorus_spec::{ChorusConfig, LibraryLayout, Stage};
use rand::Rng;
use tracing::{info, warn};

use crate::compose::plan_mix;
use crate::error::EngineResult;
use crate::executor::{BatchResult, Executor, ShutdownHandle, Transformer};
use crate::graph::{
    build_automate, build_mix, build_pitch_shift, build_standardize, mix_file_name,
    plan_automation,
};
use crate::probe::{probe_all, Probe, SkippedAsset};
use crate::rng::{create_stage_rng, random_seed};

/// Outcome of one stage: job results plus inputs that never became jobs.
#[derive(Debug)]
pub struct StageReport {
    pub batch: BatchResult,
    pub skipped: Vec<SkippedAsset>,
}

impl StageReport {
    pub fn stage(&self) -> Stage {
        self.batch.stage
    }

    /// Files written by the stage.
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.batch.outputs()
    }

    /// True if every job succeeded and nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.batch.failed() == 0 && self.skipped.is_empty()
    }
}

/// Drives the four stages over one library.
pub struct Pipeline<'a, P: ?Sized, T: ?Sized> {
    config: &'a ChorusConfig,
    layout: LibraryLayout,
    probe: &'a P,
    engine: &'a T,
    seed: u64,
    shutdown: ShutdownHandle,
}

impl<'a, P, T> Pipeline<'a, P, T>
where
    P: Probe + ?Sized,
    T: Transformer + ?Sized,
{
    /// Validates `config` and creates a pipeline with a fresh random seed.
    pub fn new(
        config: &'a ChorusConfig,
        layout: LibraryLayout,
        probe: &'a P,
        engine: &'a T,
    ) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            layout,
            probe,
            engine,
            seed: random_seed(),
            shutdown: ShutdownHandle::default(),
        })
    }

    /// Pins the base seed every stage derives its random stream from.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn layout(&self) -> &LibraryLayout {
        &self.layout
    }

    /// Handle that cancels every job not yet started, in any stage.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    fn executor(&self, width: usize) -> Executor {
        Executor::with_shutdown(width, self.shutdown.clone())
    }

    /// Converts raw assets into standardized mono files.
    pub fn standardize(&self, sources: &[PathBuf]) -> EngineResult<StageReport> {
        let batch = build_standardize(self.config, &self.layout, sources)?;
        let result = self
            .executor(self.config.workers.standardize)
            .execute(&batch, self.engine)?;
        Ok(StageReport {
            batch: result,
            skipped: Vec::new(),
        })
    }

    /// Renders pitch variants of standardized assets.
    pub fn pitch_shift(&self, assets: &[PathBuf]) -> EngineResult<StageReport> {
        let mut rng = create_stage_rng(self.seed, Stage::PitchShift);
        let batch = build_pitch_shift(self.config, &self.layout, assets, &mut rng)?;
        let result = self
            .executor(self.config.workers.pitch_shift)
            .execute(&batch, self.engine)?;
        Ok(StageReport {
            batch: result,
            skipped: Vec::new(),
        })
    }

    /// Probes processed assets, compiles their automation and renders them.
    pub fn automate(&self, assets: &[PathBuf]) -> EngineResult<StageReport> {
        let (probed, mut skipped) = probe_all(self.probe, assets, self.config.workers.probe)?;
        let mut rng = create_stage_rng(self.seed, Stage::Automate);
        let (plans, unplanned) = plan_automation(self.config, &probed, &mut rng)?;
        skipped.extend(unplanned);

        let batch = build_automate(self.config, &self.layout, &plans)?;
        let result = self
            .executor(self.config.workers.automate)
            .execute(&batch, self.engine)?;
        Ok(StageReport {
            batch: result,
            skipped,
        })
    }

    /// Samples automated assets and renders the final mix.
    pub fn mix(&self, pool: &[PathBuf]) -> EngineResult<StageReport> {
        let mut rng = create_stage_rng(self.seed, Stage::Mix);
        let composed = plan_mix(
            pool,
            self.config.mix_candidates,
            self.config.mix_duration_secs,
            self.config.channels,
            self.probe,
            self.config.workers.probe,
            &mut rng,
        )?;
        let file_name = mix_file_name(
            composed.plan.len(),
            composed.plan.duration_secs,
            rng.gen(),
            &self.config.codec.extension,
        );

        let batch = build_mix(self.config, &self.layout, &composed.plan, &file_name)?;
        let result = self
            .executor(self.config.workers.mix)
            .execute(&batch, self.engine)?;
        Ok(StageReport {
            batch: result,
            skipped: composed.skipped,
        })
    }

    /// Runs every stage in order, feeding each the outputs of the last.
    ///
    /// Automation covers both the standardized assets and their variants.
    /// Stops early, returning the stages run so far, once shutdown is raised.
    pub fn run(&self, sources: &[PathBuf]) -> EngineResult<Vec<StageReport>> {
        info!(seed = self.seed, sources = sources.len(), "starting run");
        let mut reports = Vec::with_capacity(Stage::ALL.len());

        let standardized = self.standardize(sources)?;
        let mut processed = standardized.outputs();
        reports.push(standardized);
        if self.stopped() {
            return Ok(reports);
        }

        let variants = self.pitch_shift(&processed)?;
        processed.extend(variants.outputs());
        reports.push(variants);
        if self.stopped() {
            return Ok(reports);
        }

        let automated = self.automate(&processed)?;
        let pool = automated.outputs();
        reports.push(automated);
        if self.stopped() {
            return Ok(reports);
        }

        reports.push(self.mix(&pool)?);
        Ok(reports)
    }

    fn stopped(&self) -> bool {
        let stopped = self.shutdown.is_shutdown();
        if stopped {
            warn!("shutdown requested, skipping remaining stages");
        }
        stopped
    }
}
