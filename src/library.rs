//! Discovery of playable sounds inside the category folders.

use crate::constants::AUDIO_EXTENSIONS;
use crate::sound::Category;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A single item discovered in a category folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryEntry {
    File(PathBuf),
    /// Sub-folder of effects played as a random pick of its files.
    Folder(PathBuf),
}

/// Result of scanning a category folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionListing {
    /// The folder does not exist.
    Missing,
    /// Folders first, then files, each group sorted case-insensitively.
    Entries(Vec<LibraryEntry>),
}

/// Checks the extension against the supported formats, ignoring case.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Lists the audio files directly inside `dir`, sorted by lowercase file stem.
///
/// Files sharing a stem are ordered by their full name.
///
/// Returns an empty list when `dir` doesn't exist.
pub fn list_audio_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = read_dir_paths(dir)?
        .into_iter()
        .filter(|path| path.is_file() && is_audio_file(path))
        .collect();

    files.sort_by_key(|path| (sort_key(path.file_stem()), sort_key(path.file_name())));
    Ok(files)
}

/// Lists the sub-folders of `dir` holding at least one audio file, sorted by lowercase name.
///
/// Only direct children of each sub-folder are considered.
pub fn list_audio_folders(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();

    for path in read_dir_paths(dir)? {
        if !path.is_dir() {
            continue;
        }
        if !list_audio_files(&path)?.is_empty() {
            folders.push(path);
        }
    }

    folders.sort_by_key(|path| sort_key(path.file_name()));
    Ok(folders)
}

/// Scans the folder backing `category`.
pub fn scan_section(dir: &Path, category: Category) -> Result<SectionListing> {
    if !dir.exists() {
        return Ok(SectionListing::Missing);
    }

    let mut entries = Vec::new();
    if category.allows_folders() {
        entries.extend(list_audio_folders(dir)?.into_iter().map(LibraryEntry::Folder));
    }
    entries.extend(list_audio_files(dir)?.into_iter().map(LibraryEntry::File));

    Ok(SectionListing::Entries(entries))
}

fn read_dir_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read sound folder: {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read entry in: {}", dir.display()))?;
        paths.push(entry.path());
    }
    Ok(paths)
}

fn sort_key(name: Option<&std::ffi::OsStr>) -> String {
    name.map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "data").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("rain.mp3")));
        assert!(is_audio_file(Path::new("RAIN.FLAC")));
        assert!(is_audio_file(Path::new("dir/song.M4a")));
        assert!(!is_audio_file(Path::new("README.txt")));
        assert!(!is_audio_file(Path::new("noextension")));
    }

    #[test]
    fn test_list_audio_files_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("b.wav"));
        touch(&temp_dir.path().join("A.ogg"));
        touch(&temp_dir.path().join("c.mp3"));
        touch(&temp_dir.path().join("README.txt"));
        fs::create_dir(temp_dir.path().join("d.mp3")).unwrap();

        let files = list_audio_files(temp_dir.path()).unwrap();
        assert_eq!(names(&files), vec!["A.ogg", "b.wav", "c.mp3"]);
    }

    #[test]
    fn test_list_audio_files_same_stem_ordered_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("door.wav"));
        touch(&temp_dir.path().join("Door.flac"));
        touch(&temp_dir.path().join("door.mp3"));

        let files = list_audio_files(temp_dir.path()).unwrap();
        assert_eq!(names(&files), vec!["Door.flac", "door.mp3", "door.wav"]);
    }

    #[test]
    fn test_list_audio_files_missing_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let files = list_audio_files(&temp_dir.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_list_audio_folders_requires_audio() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("swords/clang.wav"));
        touch(&temp_dir.path().join("Doors/creak.mp3"));
        touch(&temp_dir.path().join("notes/todo.txt"));
        touch(&temp_dir.path().join("nested/inner/deep.mp3"));
        fs::create_dir(temp_dir.path().join("empty")).unwrap();

        let folders = list_audio_folders(temp_dir.path()).unwrap();
        assert_eq!(names(&folders), vec!["Doors", "swords"]);
    }

    #[test]
    fn test_scan_section_missing() {
        let temp_dir = TempDir::new().unwrap();
        let listing = scan_section(&temp_dir.path().join("ambient"), Category::Ambient).unwrap();
        assert_eq!(listing, SectionListing::Missing);
    }

    #[test]
    fn test_scan_section_effects_lists_folders_first() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("arrow.mp3"));
        touch(&temp_dir.path().join("zombies/groan1.ogg"));

        let listing = scan_section(temp_dir.path(), Category::Effects).unwrap();
        assert_eq!(
            listing,
            SectionListing::Entries(vec![
                LibraryEntry::Folder(temp_dir.path().join("zombies")),
                LibraryEntry::File(temp_dir.path().join("arrow.mp3")),
            ])
        );
    }

    #[test]
    fn test_scan_section_music_ignores_folders() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("theme.mp3"));
        touch(&temp_dir.path().join("album/track.mp3"));

        let listing = scan_section(temp_dir.path(), Category::Music).unwrap();
        assert_eq!(
            listing,
            SectionListing::Entries(vec![LibraryEntry::File(temp_dir.path().join("theme.mp3"))])
        );
    }

    #[test]
    fn test_scan_section_only_readme_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("README.txt"));

        let listing = scan_section(temp_dir.path(), Category::Ambient).unwrap();
        assert_eq!(listing, SectionListing::Entries(Vec::new()));
    }
}
