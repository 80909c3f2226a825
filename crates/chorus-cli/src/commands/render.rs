//! Render command implementation
//!
//! Runs every stage end to end over a library.

use std::process::ExitCode;

use anyhow::{Context, Result};
use chorus_spec::Stage;
use tracing::info;

use crate::discover::discover_stage_inputs;
use crate::interrupt::raise_on_ctrl_c;
use crate::session::{Session, SessionOptions};
use crate::summary::RunSummary;

/// Runs standardize, pitch shift, automate and mix in order.
pub fn run(options: &SessionOptions, json: bool) -> Result<ExitCode> {
    let session = Session::open(options)?;
    let sources = discover_stage_inputs(&session.layout, Stage::Standardize, &session.config)?;
    info!(
        library = %session.layout.root().display(),
        sources = sources.len(),
        "discovered library"
    );

    let pipeline = session.pipeline()?;
    raise_on_ctrl_c(pipeline.shutdown_handle()).context("Failed to install Ctrl-C handler")?;
    let reports = pipeline.run(&sources)?;

    let summary = RunSummary::new(session.seed, &reports);
    summary.print(json)?;
    Ok(summary.exit_code())
}
