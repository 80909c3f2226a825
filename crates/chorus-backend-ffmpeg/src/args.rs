//! Rendering a job into an ffmpeg argument vector.

use std::ffi::OsString;
use std::path::Path;

use chorus_spec::{EffectDescriptor, RenderJob};

/// Builds the ffmpeg arguments for `job`, writing to `output`.
///
/// `script_path` must point at the materialized script when the job carries
/// a script artifact; it is ignored for effect chains.
pub fn build_args(job: &RenderJob, output: &Path, script_path: Option<&Path>) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
        .into_iter()
        .map(OsString::from)
        .collect();

    for source in &job.sources {
        if source.loop_forever {
            args.push("-stream_loop".into());
            args.push("-1".into());
        }
        if let Some(offset) = source.start_offset_secs {
            args.push("-ss".into());
            args.push(format_secs(offset).into());
        }
        args.push("-i".into());
        args.push(source.path.clone().into_os_string());
    }

    match &job.effects {
        EffectDescriptor::Chain { filters } => {
            args.push("-af".into());
            args.push(filters.into());
        }
        EffectDescriptor::Script { script } => {
            args.push("-filter_complex_script".into());
            if let Some(path) = script_path {
                args.push(path.as_os_str().to_owned());
            }
            args.push("-map".into());
            args.push(format!("[{}]", script.output_label()).into());
        }
    }

    args.push("-ar".into());
    args.push(job.output.sample_rate.to_string().into());
    args.push("-ac".into());
    args.push(job.output.channels.to_string().into());
    args.extend(job.output.codec_args.iter().map(OsString::from));

    if let Some(max) = job.output.max_duration_secs {
        args.push("-t".into());
        args.push(format_secs(max).into());
    }
    for (key, value) in &job.output.metadata {
        args.push("-metadata".into());
        args.push(format!("{}={}", key, value).into());
    }

    args.push(output.as_os_str().to_owned());
    args
}

fn format_secs(secs: f64) -> String {
    format!("{:.3}", secs)
}
