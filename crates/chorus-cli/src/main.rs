//! Chorus CLI - procedural ambient soundscape rendering
//!
//! This binary turns a library of short recordings into long-form ambient
//! soundscapes by driving ffmpeg through the Chorus stages.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use chorus_cli::commands;
use chorus_cli::logging;
use chorus_cli::session::SessionOptions;
use chorus_spec::Stage;

/// Chorus - Procedural Ambient Soundscape Generator
#[derive(Parser)]
#[command(name = "chorus")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Library root holding the raw assets
    #[arg(short, long, global = true, default_value = ".")]
    library: PathBuf,

    /// JSON configuration file (defaults apply to missing fields)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base seed for every random draw (random if omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Worker-pool width for every parallel stage
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Directory containing the ffmpeg and ffprobe executables
    #[arg(long, global = true, env = "CHORUS_FFMPEG_DIR")]
    ffmpeg_dir: Option<PathBuf>,

    /// Output machine-readable JSON (no colored output)
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args)]
struct MixArgs {
    /// How many automated assets the mix samples
    #[arg(long)]
    candidates: Option<usize>,

    /// Length of the final render in seconds
    #[arg(long)]
    duration: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage end to end: standardize, pitch, automate, mix
    Render {
        #[command(flatten)]
        mix: MixArgs,
    },

    /// Convert raw assets into standardized mono files under PROCESSED/
    Standardize,

    /// Render pitch-shifted variants of PROCESSED/ into PROCESSED/VARIANTS/
    Pitch,

    /// Render volume/pan automated files into PROCESSED/VOLUMEPROCESSED/
    Automate,

    /// Mix a sample of automated files into a final render under MIX/
    Mix {
        #[command(flatten)]
        mix: MixArgs,
    },

    /// Print the automation plan for one asset as JSON without rendering
    Plan {
        /// Asset to plan
        asset: PathBuf,

        /// Use this duration in seconds instead of probing the asset
        #[arg(long)]
        duration: Option<f64>,
    },
}

impl GlobalArgs {
    fn session_options(&self, mix: Option<&MixArgs>) -> SessionOptions {
        SessionOptions {
            library: self.library.clone(),
            config_path: self.config.clone(),
            seed: self.seed,
            workers: self.workers,
            ffmpeg_dir: self.ffmpeg_dir.clone(),
            mix_candidates: mix.and_then(|m| m.candidates),
            mix_duration_secs: mix.and_then(|m| m.duration),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let global = &cli.global;
    let result = match &cli.command {
        Commands::Render { mix } => {
            commands::render::run(&global.session_options(Some(mix)), global.json)
        }
        Commands::Standardize => {
            commands::stage::run(Stage::Standardize, &global.session_options(None), global.json)
        }
        Commands::Pitch => {
            commands::stage::run(Stage::PitchShift, &global.session_options(None), global.json)
        }
        Commands::Automate => {
            commands::stage::run(Stage::Automate, &global.session_options(None), global.json)
        }
        Commands::Mix { mix } => {
            commands::stage::run(Stage::Mix, &global.session_options(Some(mix)), global.json)
        }
        Commands::Plan { asset, duration } => {
            commands::plan::run(asset, *duration, &global.session_options(None))
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
