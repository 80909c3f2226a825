//! Chorus ffmpeg Backend
//!
//! Runs Chorus render jobs and duration probes through `ffmpeg` and `ffprobe`
//! subprocesses.
//!
//! # Overview
//!
//! - [`FfprobeProbe`] implements [`chorus_engine::Probe`] by asking `ffprobe`
//!   for the first audio stream as JSON.
//! - [`FfmpegTransformer`] implements [`chorus_engine::Transformer`] by
//!   rendering a [`RenderJob`](chorus_spec::RenderJob) into an `ffmpeg`
//!   argument vector and running it.
//!
//! Filter graphs carried as script artifacts are written to a temporary
//! directory and passed with `-filter_complex_script`, never inline. Outputs
//! are written next to their destination under a temporary name and renamed
//! into place only when `ffmpeg` succeeds, so a failed or killed job leaves
//! nothing at the destination.
//!
//! # Locating ffmpeg
//!
//! Both executables are searched for in:
//!
//! 1. The directory configured with [`FfmpegConfig::ffmpeg_dir`]
//! 2. The `CHORUS_FFMPEG_DIR` environment variable
//! 3. System PATH
//!
//! # Example
//!
//! ```ignore
//! use chorus_backend_ffmpeg::{FfmpegConfig, FfmpegTransformer, FfprobeProbe};
//!
//! let config = FfmpegConfig::default().timeout_secs(600);
//! let probe = FfprobeProbe::new(&config)?;
//! let engine = FfmpegTransformer::new(&config)?;
//! ```

pub mod args;
pub mod locate;
pub mod probe;
pub mod process;
pub mod transform;

pub use args::build_args;
pub use locate::{find_executable, FfmpegConfig, FFMPEG_DIR_ENV};
pub use probe::{parse_probe_output, FfprobeProbe};
pub use transform::FfmpegTransformer;
