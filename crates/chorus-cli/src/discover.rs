//! Input discovery: a point-in-time listing of one stage directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chorus_spec::{ChorusConfig, LibraryLayout, Stage};
use walkdir::WalkDir;

/// Lists the audio files directly inside `dir`, sorted by path.
///
/// Subdirectories are not descended into, so a stage never picks up the
/// outputs of a later stage stored beneath its input directory.
pub fn discover_assets(dir: &Path, config: &ChorusConfig) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", dir.display());
    }

    let mut assets = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if entry.file_type().is_file() && config.is_audio_file(entry.path()) {
            assets.push(entry.into_path());
        }
    }
    assets.sort();
    Ok(assets)
}

/// Lists the inputs of `stage` across all of its input directories.
///
/// Directories that do not exist yet are passed over, but at least one must
/// exist. Automation, for instance, runs without a variants directory when
/// the pitch stage was never run.
pub fn discover_stage_inputs(
    layout: &LibraryLayout,
    stage: Stage,
    config: &ChorusConfig,
) -> Result<Vec<PathBuf>> {
    let dirs = layout.input_dirs(stage);
    let existing: Vec<&PathBuf> = dirs.iter().filter(|dir| dir.is_dir()).collect();
    if existing.is_empty() {
        let listed: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();
        anyhow::bail!("No input directory for {} exists: {}", stage, listed.join(", "));
    }

    let mut assets = Vec::new();
    for dir in existing {
        assets.extend(discover_assets(dir, config)?);
    }
    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lists_audio_files_only_at_top_level() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.WAV", "a.flac", "notes.txt", "cover.jpg"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("PROCESSED")).unwrap();
        std::fs::write(dir.path().join("PROCESSED").join("c.opus"), b"").unwrap();

        let found = discover_assets(dir.path(), &ChorusConfig::default()).unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("a.flac"), dir.path().join("b.WAV")]
        );
    }

    #[test]
    fn test_automate_lists_processed_and_variants() {
        let dir = tempfile::tempdir().unwrap();
        let layout = LibraryLayout::new(dir.path());
        std::fs::create_dir_all(layout.variants()).unwrap();
        std::fs::create_dir_all(layout.automated()).unwrap();
        std::fs::write(layout.processed().join("owl.wav.opus"), b"").unwrap();
        std::fs::write(layout.variants().join("owl.wav-9600.opus"), b"").unwrap();
        std::fs::write(layout.automated().join("owl.wav.opus"), b"").unwrap();

        let config = ChorusConfig::default();
        assert_eq!(
            discover_stage_inputs(&layout, Stage::Automate, &config).unwrap(),
            vec![
                layout.processed().join("owl.wav.opus"),
                layout.variants().join("owl.wav-9600.opus"),
            ]
        );
        assert_eq!(
            discover_stage_inputs(&layout, Stage::PitchShift, &config).unwrap(),
            vec![layout.processed().join("owl.wav.opus")]
        );
    }

    #[test]
    fn test_automate_runs_without_variants() {
        let dir = tempfile::tempdir().unwrap();
        let layout = LibraryLayout::new(dir.path());
        std::fs::create_dir_all(layout.processed()).unwrap();
        std::fs::write(layout.processed().join("owl.wav.opus"), b"").unwrap();

        let found =
            discover_stage_inputs(&layout, Stage::Automate, &ChorusConfig::default()).unwrap();
        assert_eq!(found, vec![layout.processed().join("owl.wav.opus")]);
        assert!(discover_stage_inputs(&layout, Stage::Mix, &ChorusConfig::default()).is_err());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_assets(&dir.path().join("nope"), &ChorusConfig::default()).is_err());
    }
}
