//! Job graph builders, one per stage.
//!
//! Each builder turns the previous stage's resolved asset list into a
//! [`JobBatch`](chorus_spec::JobBatch) and makes sure its output directory
//! exists. Builders never list directories themselves.

mod automate;
mod mix;
mod pitch;
mod standardize;

pub use automate::{
    automated_file_name, automation_script, build_automate, plan_automation, AutomationPlan,
};
pub use mix::{build_mix, mix_file_name, mix_script};
pub use pitch::{build_pitch_shift, variant_file_name};
pub use standardize::{build_standardize, standardized_file_name};

use std::path::Path;

use crate::error::{EngineError, EngineResult};

/// Cutoff of the high-pass applied during standardization.
pub const HIGHPASS_HZ: u32 = 200;

/// Level below which leading and trailing audio counts as silence.
pub const SILENCE_THRESHOLD_DB: i32 = -50;

/// Trims silence at both ends of a stream.
pub(crate) fn silence_trim_filter() -> String {
    format!(
        "silenceremove=1:0:{db}dB:-1:0:{db}dB",
        db = SILENCE_THRESHOLD_DB
    )
}

/// Creates a stage output directory. Safe to call repeatedly.
pub(crate) fn ensure_stage_dir(dir: &Path) -> EngineResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| EngineError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
