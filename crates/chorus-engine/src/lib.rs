//! Chorus Engine
//!
//! Turns a library of short recordings into render jobs for an external
//! audio engine and runs them.
//!
//! # Overview
//!
//! A run moves strictly forward through four stages:
//!
//! 1. **Standardize** - every raw asset becomes a mono file at the reference rate
//! 2. **PitchShift** - several slowed or sped-up variants of each standardized asset
//! 3. **Automate** - each processed asset gets its own randomized volume/pan curve
//! 4. **Mix** - a sampled population of automated assets is looped and mixed down
//!
//! Each stage reads only the previous stage's outputs. All random draws for a
//! stage happen before its batch is dispatched; the batch then runs on a
//! bounded worker pool where one job's failure never affects its siblings.
//!
//! # Crate Structure
//!
//! - [`schedule`] - Randomized duration, gain and pitch schedules
//! - [`automation`] - Crossfaded automation tracks and envelope expressions
//! - [`graph`] - Per-stage job builders
//! - [`compose`] - Mix population sampling
//! - [`executor`] - Bounded-concurrency batch execution
//! - [`probe`] - Duration probing
//! - [`pipeline`] - Stage-by-stage orchestration
//! - [`rng`] - Seeded random sources
//!
//! The external engine is reached only through the [`Probe`] and
//! [`Transformer`] traits.

pub mod automation;
pub mod compose;
pub mod error;
pub mod executor;
pub mod graph;
pub mod pipeline;
pub mod probe;
pub mod rng;
pub mod schedule;

pub use automation::{compile_automation, AutomationTrack, Breakpoint, EnvelopeExpression};
pub use compose::{plan_mix, ComposedMix};
pub use error::{EngineError, EngineResult};
pub use executor::{BatchResult, Executor, JobResult, ShutdownHandle, Transformer};
pub use graph::AutomationPlan;
pub use pipeline::{Pipeline, StageReport};
pub use probe::{probe_all, Probe, SkippedAsset};
pub use schedule::{
    generate_durations, generate_gains, generate_pitch_factors, generate_schedule, pitch_rate,
    Schedule,
};
