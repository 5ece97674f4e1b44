//! First-run scaffolding of the category folders.
//!
//! Every launch makes sure `ambient/`, `music/` and `effects/` exist under the sounds
//! root, each with a `README.txt` telling the user what to put there. Existing files
//! are never touched.

use crate::constants::README_FILE_NAME;
use crate::sound::Category;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a bootstrap run created.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub created_folders: Vec<PathBuf>,
    pub created_readmes: Vec<PathBuf>,
}

impl BootstrapReport {
    /// True when everything already existed.
    pub fn is_noop(&self) -> bool {
        self.created_folders.is_empty() && self.created_readmes.is_empty()
    }
}

/// Creates the three category folders under `root` and seeds their instructions.
pub fn create_sample_folders(root: &Path) -> Result<BootstrapReport> {
    let mut report = BootstrapReport::default();

    for category in Category::ALL {
        let folder = root.join(category.folder_name());
        if !folder.is_dir() {
            fs::create_dir_all(&folder).context(format!(
                "Failed to create sound folder: {}",
                folder.display()
            ))?;
            info!(folder = %folder.display(), "created sound folder");
            report.created_folders.push(folder.clone());
        }

        let readme_path = folder.join(README_FILE_NAME);
        if readme_path.exists() {
            debug!(path = %readme_path.display(), "readme already present");
            continue;
        }

        fs::write(&readme_path, readme_text(category)).context(format!(
            "Failed to write instructions file: {}",
            readme_path.display()
        ))?;
        report.created_readmes.push(readme_path);
    }

    Ok(report)
}

/// Instructions written into a freshly created category folder.
pub fn readme_text(category: Category) -> String {
    let folder = category.folder_name();
    let mut text = format!("{} SOUNDS\n", folder.to_uppercase());
    text.push_str(&"=".repeat(30));
    text.push_str("\n\n");
    text.push_str(&format!("Place your {folder} audio files here.\n\n"));
    text.push_str("Supported formats: MP3, WAV, OGG, M4A, FLAC, AAC\n\n");

    if category.loops() {
        text.push_str("Files in this folder will loop automatically.\n");
    } else {
        text.push_str("Files in this folder will play once at full volume immediately.\n");
        text.push_str(
            "You can also add folders containing multiple sounds for random playback!\n",
        );
        text.push_str(
            "Each time you click play on a folder, a random sound from that folder will play.\n",
        );
    }

    text.push_str("\nUse individual volume sliders and master volume for perfect mixing.\n");
    text.push_str("Files and folders are automatically sorted in alphabetical order.\n");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fresh_root_gets_all_folders() {
        let temp_dir = TempDir::new().unwrap();

        let report = create_sample_folders(temp_dir.path()).unwrap();

        for name in ["ambient", "music", "effects"] {
            let folder = temp_dir.path().join(name);
            assert!(folder.is_dir(), "{name} should exist");
            let readme = fs::read_to_string(folder.join(README_FILE_NAME)).unwrap();
            assert!(readme.contains(&format!("Place your {name} audio files here.")));
        }
        assert_eq!(report.created_folders.len(), 3);
        assert_eq!(report.created_readmes.len(), 3);
    }

    #[test]
    fn test_second_run_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        create_sample_folders(temp_dir.path()).unwrap();

        let report = create_sample_folders(temp_dir.path()).unwrap();
        assert!(report.is_noop());
    }

    #[test]
    fn test_existing_readme_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let music = temp_dir.path().join("music");
        fs::create_dir(&music).unwrap();
        fs::write(music.join(README_FILE_NAME), "my notes").unwrap();

        let report = create_sample_folders(temp_dir.path()).unwrap();

        assert_eq!(
            fs::read_to_string(music.join(README_FILE_NAME)).unwrap(),
            "my notes"
        );
        assert!(!report.created_folders.contains(&music));
        assert_eq!(report.created_readmes.len(), 2);
    }

    #[test]
    fn test_readme_text_per_category() {
        let ambient = readme_text(Category::Ambient);
        assert!(ambient.starts_with("AMBIENT SOUNDS\n=============================="));
        assert!(ambient.contains("loop automatically"));
        assert!(!ambient.contains("random playback"));

        let effects = readme_text(Category::Effects);
        assert!(effects.starts_with("EFFECTS SOUNDS\n"));
        assert!(effects.contains("play once"));
        assert!(effects.contains("random sound from that folder"));
        assert!(effects.ends_with("sorted in alphabetical order.\n"));
    }
}
