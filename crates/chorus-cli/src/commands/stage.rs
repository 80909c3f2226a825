//! Single-stage command implementation
//!
//! Each stage lists the directories earlier stages wrote and runs one batch.

use std::process::ExitCode;

use anyhow::{Context, Result};
use chorus_spec::Stage;
use tracing::info;

use crate::discover::discover_stage_inputs;
use crate::interrupt::raise_on_ctrl_c;
use crate::session::{Session, SessionOptions};
use crate::summary::RunSummary;

/// Runs one stage over the current contents of its input directories.
pub fn run(stage: Stage, options: &SessionOptions, json: bool) -> Result<ExitCode> {
    let session = Session::open(options)?;
    let inputs = discover_stage_inputs(&session.layout, stage, &session.config)?;
    info!(
        stage = %stage,
        inputs = inputs.len(),
        "discovered inputs"
    );

    let pipeline = session.pipeline()?;
    raise_on_ctrl_c(pipeline.shutdown_handle()).context("Failed to install Ctrl-C handler")?;
    let report = match stage {
        Stage::Standardize => pipeline.standardize(&inputs)?,
        Stage::PitchShift => pipeline.pitch_shift(&inputs)?,
        Stage::Automate => pipeline.automate(&inputs)?,
        Stage::Mix => pipeline.mix(&inputs)?,
    };

    let summary = RunSummary::new(session.seed, std::slice::from_ref(&report));
    summary.print(json)?;
    Ok(summary.exit_code())
}
