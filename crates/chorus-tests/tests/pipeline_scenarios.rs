//! End-to-end pipeline scenarios against the fake probe and engine.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p chorus-tests --test pipeline_scenarios
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use chorus_cli::discover::discover_stage_inputs;
use chorus_engine::{Pipeline, StageReport};
use chorus_spec::{ChorusConfig, LibraryLayout, Stage, TransformError};
use chorus_tests::{clip_names, FakeEngine, FakeProbe, Library};

fn config() -> ChorusConfig {
    ChorusConfig {
        variants_per_asset: 2,
        mix_candidates: 8,
        mix_duration_secs: 300.0,
        ..ChorusConfig::default()
    }
}

/// Regular files directly inside `dir`, sorted.
fn listing(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}

// ============================================================================
// Batch Isolation
// ============================================================================

#[test]
fn one_failed_job_does_not_sink_the_batch() {
    let library = Library::with_sources(&clip_names(20)).unwrap();
    let config = config();
    let engine = FakeEngine::new().failing_on("clip07");
    let probe = FakeProbe::new(30.0);
    let pipeline = Pipeline::new(&config, LibraryLayout::new(library.root()), &probe, &engine)
        .unwrap()
        .with_seed(3);

    let report = pipeline.standardize(library.sources()).unwrap();

    assert_eq!(report.batch.results.len(), 20);
    assert_eq!(report.batch.succeeded(), 19);
    assert_eq!(report.batch.failed(), 1);
    assert_eq!(engine.jobs().len(), 20);

    let failure = report.batch.failures().next().unwrap();
    assert!(matches!(
        failure.error(),
        Some(TransformError::ProcessFailed { exit_code: 1, .. })
    ));
    assert!(!failure.destination.exists());

    let processed = listing(&pipeline.layout().processed());
    assert_eq!(processed.len(), 19);
    assert_eq!(processed, report.outputs());
}

// ============================================================================
// Full Runs
// ============================================================================

#[test]
fn full_run_fans_in_to_one_mix() {
    let library = Library::with_sources(&clip_names(3)).unwrap();
    let config = config();
    let engine = FakeEngine::new();
    let probe = FakeProbe::new(45.0);
    let pipeline = Pipeline::new(&config, LibraryLayout::new(library.root()), &probe, &engine)
        .unwrap()
        .with_seed(42);

    let reports = pipeline.run(library.sources()).unwrap();

    let stages: Vec<Stage> = reports.iter().map(StageReport::stage).collect();
    assert_eq!(stages, Stage::ALL.to_vec());
    assert!(reports.iter().all(StageReport::is_clean));

    let standardized = reports[0].outputs().len();
    let variants = reports[1].outputs().len();
    assert_eq!(standardized, 3);
    assert!((3..=6).contains(&variants));
    assert_eq!(reports[2].outputs().len(), standardized + variants);

    let mix = &reports[3].outputs();
    assert_eq!(mix.len(), 1);
    assert_eq!(mix[0].parent().unwrap(), pipeline.layout().mixes());
    let name = mix[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("mix-"), "unexpected mix name {}", name);

    // The automated files are what the mix stage sampled from.
    let automated = listing(&pipeline.layout().automated());
    assert_eq!(automated.len(), standardized + variants);
    let mix_job = engine
        .jobs()
        .into_iter()
        .find(|job| job.stage == Stage::Mix)
        .unwrap();
    assert_eq!(mix_job.sources.len(), automated.len().min(config.mix_candidates));
    assert!(mix_job
        .sources
        .iter()
        .all(|source| automated.contains(&source.path)));
}

#[test]
fn unprobeable_and_empty_assets_are_skipped() {
    let library = Library::with_sources(&clip_names(3)).unwrap();
    let config = ChorusConfig {
        variants_per_asset: 1,
        ..config()
    };
    let engine = FakeEngine::new();
    let probe = FakeProbe::new(20.0)
        .failing_on("clip01")
        .with_duration("clip02.wav", 0.0);
    let pipeline = Pipeline::new(&config, LibraryLayout::new(library.root()), &probe, &engine)
        .unwrap()
        .with_seed(5);

    let reports = pipeline.run(library.sources()).unwrap();
    let automate = &reports[2];

    // clip01 and its variant fail to probe; the standardized clip02 is empty.
    let codes: Vec<&str> = automate.skipped.iter().map(|s| s.code).collect();
    assert_eq!(codes.iter().filter(|c| **c == "PROBE_004").count(), 2);
    assert_eq!(codes.iter().filter(|c| **c == "SCHEDULE_002").count(), 1);
    assert_eq!(automate.batch.failed(), 0);
    assert_eq!(automate.outputs().len(), 3);
}

#[test]
fn same_seed_renders_same_graphs() {
    let render = |seed: u64| {
        let library = Library::with_sources(&clip_names(4)).unwrap();
        let config = config();
        let engine = FakeEngine::new();
        let probe = FakeProbe::new(60.0);
        let pipeline =
            Pipeline::new(&config, LibraryLayout::new(library.root()), &probe, &engine)
                .unwrap()
                .with_seed(seed);
        pipeline.run(library.sources()).unwrap();
        engine
            .scripts()
            .iter()
            .filter(|script| !script.contents().contains("amix"))
            .map(|script| script.id().to_string())
            .collect::<BTreeSet<_>>()
    };

    assert_eq!(render(9), render(9));
}

// ============================================================================
// Single Stages From Directory Listings
// ============================================================================

#[test]
fn mix_stage_reads_automated_directory() {
    let library = Library::with_sources::<&str>(&[]).unwrap();
    let layout = LibraryLayout::new(library.root());
    std::fs::create_dir_all(layout.automated()).unwrap();
    for name in ["a.opus", "b.opus", "c.opus"] {
        std::fs::write(layout.automated().join(name), b"").unwrap();
    }

    let config = ChorusConfig {
        mix_candidates: 2,
        ..config()
    };
    let engine = FakeEngine::new();
    let probe = FakeProbe::new(10.0);
    let pipeline = Pipeline::new(&config, layout.clone(), &probe, &engine)
        .unwrap()
        .with_seed(1);

    let pool = discover_stage_inputs(&layout, Stage::Mix, &config).unwrap();
    assert_eq!(pool.len(), 3);
    let report = pipeline.mix(&pool).unwrap();

    assert!(report.is_clean());
    let outputs = report.outputs();
    assert_eq!(outputs.len(), 1);
    assert!(outputs[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("mix-2x-300s-"));
    let scripts = engine.scripts();
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].contents().contains("amix=inputs=2"));
}

#[test]
fn empty_mix_pool_renders_nothing() {
    let library = Library::with_sources::<&str>(&[]).unwrap();
    let config = config();
    let engine = FakeEngine::new();
    let probe = FakeProbe::new(10.0);
    let pipeline = Pipeline::new(&config, LibraryLayout::new(library.root()), &probe, &engine)
        .unwrap();

    let report = pipeline.mix(&[]).unwrap();
    assert!(report.batch.results.is_empty());
    assert!(engine.jobs().is_empty());
}

// ============================================================================
// Reruns
// ============================================================================

#[test]
fn rerun_does_not_take_previous_mix_as_source() {
    let library = Library::with_sources(&["owl.wav"]).unwrap();
    let layout = LibraryLayout::new(library.root());
    let config = config();
    let engine = FakeEngine::new();
    let probe = FakeProbe::new(30.0);

    let mut discovered = Vec::new();
    for seed in [1, 2] {
        let sources = discover_stage_inputs(&layout, Stage::Standardize, &config).unwrap();
        let pipeline = Pipeline::new(&config, layout.clone(), &probe, &engine)
            .unwrap()
            .with_seed(seed);
        let reports = pipeline.run(&sources).unwrap();
        assert_eq!(reports.len(), 4);
        discovered.push(sources);
    }

    assert_eq!(discovered[0], vec![library.root().join("owl.wav")]);
    assert_eq!(discovered[1], discovered[0]);
    assert_eq!(listing(&layout.mixes()).len(), 2);
    assert_eq!(listing(&layout.processed()).len(), 1);
}

#[test]
fn pitch_stage_rerun_does_not_grow() {
    let library = Library::with_sources(&clip_names(2)).unwrap();
    let layout = LibraryLayout::new(library.root());
    let config = config();
    let engine = FakeEngine::new();
    let probe = FakeProbe::new(30.0);
    let pipeline = Pipeline::new(&config, layout.clone(), &probe, &engine)
        .unwrap()
        .with_seed(8);
    pipeline.standardize(library.sources()).unwrap();

    let mut counts = Vec::new();
    for _ in 0..2 {
        let inputs = discover_stage_inputs(&layout, Stage::PitchShift, &config).unwrap();
        assert_eq!(inputs.len(), 2);
        let report = pipeline.pitch_shift(&inputs).unwrap();
        assert!(report.is_clean());
        counts.push(listing(&layout.variants()).len());
    }

    assert!(counts[0] >= 2);
    assert_eq!(counts[1], counts[0]);

    // Automation picks up the standardized files and every variant.
    let automate = discover_stage_inputs(&layout, Stage::Automate, &config).unwrap();
    assert_eq!(automate.len(), 2 + counts[0]);
}
