//! Chorus data model
//!
//! Types shared by every Chorus crate: the immutable run configuration, the
//! assets and schedule primitives, render jobs and batches, the mix plan, and
//! the error taxonomy.
//!
//! # Modules
//!
//! - [`config`]: Load-time configuration
//! - [`asset`]: Audio assets, segments and gain points
//! - [`job`]: Render jobs, effect descriptors and batches
//! - [`mix`]: Final mix plan
//! - [`layout`]: Stage directories under a library root
//! - [`error`]: Error types
//! - [`validation`]: Numeric bound checks
//! - [`hash`]: Content hashing and seed derivation

pub mod asset;
pub mod config;
pub mod error;
pub mod hash;
pub mod job;
pub mod layout;
pub mod mix;
pub mod validation;

pub use asset::{file_stem, is_silent_db, total_length, AudioAsset, GainPoint, Segment};
pub use config::{ChorusConfig, CodecConfig, WorkerConfig};
pub use error::{
    BackendError, ConfigError, ProbeError, ScheduleError, ScriptWriteError, TransformError,
};
pub use job::{
    EffectDescriptor, JobBatch, JobSource, OutputParams, RenderJob, ScriptArtifact, Stage,
};
pub use layout::LibraryLayout;
pub use mix::{MixEntry, MixPlan};
