//! Running render jobs with ffmpeg.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use chorus_engine::Transformer;
use chorus_spec::{EffectDescriptor, RenderJob, ScriptArtifact, ScriptWriteError, TransformError};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, instrument};

use crate::args::build_args;
use crate::locate::{find_executable, FfmpegConfig};
use crate::process::{wait_with_timeout, Exit};

/// Transformer backed by an `ffmpeg` executable.
#[derive(Debug, Clone)]
pub struct FfmpegTransformer {
    ffmpeg: PathBuf,
    timeout: Duration,
}

impl FfmpegTransformer {
    /// Locates `ffmpeg` according to `config`.
    pub fn new(config: &FfmpegConfig) -> Result<Self, TransformError> {
        let ffmpeg = find_executable("ffmpeg", config.ffmpeg_dir.as_deref())
            .ok_or(TransformError::EngineNotFound)?;
        Ok(Self::with_executable(ffmpeg, config.timeout))
    }

    /// Uses the executable at `path` as is.
    pub fn with_executable(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            ffmpeg: path.into(),
            timeout,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transformer for FfmpegTransformer {
    #[instrument(
        skip(self, job),
        fields(stage = %job.stage, destination = %job.destination.display())
    )]
    fn transform(&self, job: &RenderJob) -> Result<(), TransformError> {
        // Held until ffmpeg exits.
        let scripts = match &job.effects {
            EffectDescriptor::Script { script } => Some(write_script(script)?),
            EffectDescriptor::Chain { .. } => None,
        };
        let script_path = scripts.as_ref().map(|(_, path)| path.as_path());

        let output = temp_output(&job.destination)?;
        let args = build_args(job, output.path(), script_path);
        debug!(args = ?args, "spawning ffmpeg");

        let child = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(TransformError::SpawnFailed)?;

        match wait_with_timeout(child, self.timeout).map_err(TransformError::SpawnFailed)? {
            Exit::TimedOut => {
                return Err(TransformError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                })
            }
            Exit::Finished { status, stderr } if !status.success() => {
                return Err(TransformError::process_failed(
                    status.code().unwrap_or(-1),
                    stderr.trim(),
                ));
            }
            Exit::Finished { .. } => {}
        }

        output
            .persist(&job.destination)
            .map_err(|e| TransformError::PersistFailed {
                path: job.destination.clone(),
                source: e.error,
            })?;
        Ok(())
    }
}

/// Materializes a script artifact in a fresh temporary directory.
fn write_script(script: &ScriptArtifact) -> Result<(TempDir, PathBuf), ScriptWriteError> {
    let dir = tempfile::Builder::new()
        .prefix("chorus-graph-")
        .tempdir()
        .map_err(|source| ScriptWriteError {
            path: std::env::temp_dir(),
            source,
        })?;
    let path = dir.path().join(script.file_name());
    std::fs::write(&path, script.contents()).map_err(|source| ScriptWriteError {
        path: path.clone(),
        source,
    })?;
    Ok((dir, path))
}

/// Creates the temporary output beside `destination`, keeping its extension
/// so ffmpeg picks the same container.
fn temp_output(destination: &Path) -> Result<NamedTempFile, TransformError> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let suffix = destination
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let file = tempfile::Builder::new()
        .prefix(".chorus-")
        .suffix(&suffix)
        .tempfile_in(dir)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_spec::{JobSource, OutputParams, Stage};

    fn job(destination: PathBuf, effects: EffectDescriptor) -> RenderJob {
        RenderJob {
            stage: Stage::Automate,
            sources: vec![JobSource::file("/lib/PROCESSED/owl.wav.opus")],
            effects,
            output: OutputParams {
                codec_args: vec![],
                sample_rate: 48_000,
                channels: 2,
                max_duration_secs: None,
                metadata: vec![],
            },
            destination,
        }
    }

    #[test]
    fn test_temp_output_keeps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = temp_output(&dir.path().join("owl.opus")).unwrap();
        assert_eq!(file.path().parent().unwrap(), dir.path());
        assert_eq!(file.path().extension().unwrap(), "opus");
    }

    #[test]
    fn test_write_script_uses_content_address() {
        let script = ScriptArtifact::new("[0:a]anull[out]", "out");
        let (_dir, path) = write_script(&script).unwrap();
        assert_eq!(path.file_name().unwrap().to_string_lossy(), script.file_name());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[0:a]anull[out]");
    }

    #[test]
    fn test_missing_engine_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FfmpegTransformer::with_executable(
            "/nonexistent/chorus/ffmpeg",
            Duration::from_secs(5),
        );
        let destination = dir.path().join("out.opus");
        let err = engine
            .transform(&job(
                destination.clone(),
                EffectDescriptor::Chain {
                    filters: "anull".into(),
                },
            ))
            .unwrap_err();

        assert!(matches!(err, TransformError::SpawnFailed(_)));
        assert!(!destination.exists());
    }

    #[cfg(unix)]
    mod fake_engine {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Writes an executable shell script standing in for ffmpeg.
        fn fake_ffmpeg(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("ffmpeg");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_success_moves_output_into_place() {
            let dir = tempfile::tempdir().unwrap();
            // Copies the script argument into the output (the last argument).
            let ffmpeg = fake_ffmpeg(
                dir.path(),
                "for last; do :; done\n\
                 while [ $# -gt 0 ]; do\n\
                 if [ \"$1\" = -filter_complex_script ]; then cat \"$2\" > \"$last\"; fi\n\
                 shift\n\
                 done",
            );
            let engine = FfmpegTransformer::with_executable(ffmpeg, Duration::from_secs(10));
            let destination = dir.path().join("owl.opus");
            let script = ScriptArtifact::new("[0:a]anull[out]", "out");

            engine
                .transform(&job(destination.clone(), EffectDescriptor::Script { script }))
                .unwrap();

            assert_eq!(
                std::fs::read_to_string(&destination).unwrap(),
                "[0:a]anull[out]"
            );
            let leftovers: Vec<_> = std::fs::read_dir(dir.path())
                .unwrap()
                .filter_map(Result::ok)
                .filter(|e| e.file_name().to_string_lossy().starts_with(".chorus-"))
                .collect();
            assert!(leftovers.is_empty());
        }

        #[test]
        fn test_failure_leaves_no_destination() {
            let dir = tempfile::tempdir().unwrap();
            let ffmpeg = fake_ffmpeg(
                dir.path(),
                "for last; do :; done\necho partial > \"$last\"\necho 'Invalid data' >&2\nexit 1",
            );
            let engine = FfmpegTransformer::with_executable(ffmpeg, Duration::from_secs(10));
            let destination = dir.path().join("owl.opus");

            let err = engine
                .transform(&job(
                    destination.clone(),
                    EffectDescriptor::Chain {
                        filters: "anull".into(),
                    },
                ))
                .unwrap_err();

            match err {
                TransformError::ProcessFailed { exit_code, stderr } => {
                    assert_eq!(exit_code, 1);
                    assert_eq!(stderr, "Invalid data");
                }
                other => panic!("unexpected error: {}", other),
            }
            assert!(!destination.exists());
        }

        #[test]
        fn test_timeout_kills_engine() {
            let dir = tempfile::tempdir().unwrap();
            let ffmpeg = fake_ffmpeg(dir.path(), "exec sleep 5");
            let engine = FfmpegTransformer::with_executable(ffmpeg, Duration::from_millis(200));
            let destination = dir.path().join("owl.opus");

            let err = engine
                .transform(&job(
                    destination.clone(),
                    EffectDescriptor::Chain {
                        filters: "anull".into(),
                    },
                ))
                .unwrap_err();

            assert!(matches!(err, TransformError::Timeout { .. }));
            assert!(!destination.exists());
        }
    }
}
