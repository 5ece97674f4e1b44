//! Sound domain: categories, playable sounds, random-pick folders and volume levels.

use rand::seq::SliceRandom;
use rand::Rng;
use std::path::{Path, PathBuf};

/// One of the three user-managed board columns, each backed by a folder of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Ambient,
    Music,
    Effects,
}

impl Category {
    /// All categories in board order.
    pub const ALL: [Category; 3] = [Category::Ambient, Category::Music, Category::Effects];

    /// Folder name under the sounds root.
    pub fn folder_name(self) -> &'static str {
        match self {
            Category::Ambient => "ambient",
            Category::Music => "music",
            Category::Effects => "effects",
        }
    }

    /// Section heading shown on the board.
    pub fn title(self) -> &'static str {
        match self {
            Category::Ambient => "AMBIENT",
            Category::Music => "MUSIC",
            Category::Effects => "EFFECTS",
        }
    }

    /// Ambient beds and music loop until stopped, effects play once.
    pub fn loops(self) -> bool {
        !matches!(self, Category::Effects)
    }

    /// Only effects turn sub-folders into random-pick entries.
    pub fn allows_folders(self) -> bool {
        matches!(self, Category::Effects)
    }

    /// Header color as RGB.
    pub fn header_color(self) -> [u8; 3] {
        match self {
            Category::Ambient => [0x4C, 0xAF, 0x50],
            Category::Music => [0x21, 0x96, 0xF3],
            Category::Effects => [0xFF, 0x98, 0x00],
        }
    }
}

/// Darkens an RGB color by 20%.
pub fn darken(rgb: [u8; 3]) -> [u8; 3] {
    rgb.map(|channel| (f32::from(channel) * 0.8) as u8)
}

/// An audio file that can be played.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sound {
    pub path: PathBuf,
    /// Whether the sound restarts from the beginning when it reaches the end.
    pub looping: bool,
}

impl Sound {
    pub fn new(path: impl Into<PathBuf>, looping: bool) -> Self {
        Self {
            path: path.into(),
            looping,
        }
    }

    /// File stem used as the board label.
    pub fn display_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A directory of one-shot sounds; every trigger plays one of them at random.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundFolder {
    pub path: PathBuf,
    pub sounds: Vec<Sound>,
}

impl SoundFolder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sounds: Vec::new(),
        }
    }

    /// Reloads `sounds` from the audio files directly inside the folder.
    pub fn scan(&mut self) -> anyhow::Result<()> {
        self.sounds = crate::library::list_audio_files(&self.path)?
            .into_iter()
            .map(|path| Sound::new(path, false))
            .collect();
        Ok(())
    }

    /// Folder name used as the board label.
    pub fn display_name(&self) -> String {
        folder_name(&self.path)
    }

    /// Picks a random sound using the thread-local generator.
    pub fn random_sound(&self) -> Option<&Sound> {
        self.random_sound_with(&mut rand::thread_rng())
    }

    pub fn random_sound_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Sound> {
        self.sounds.choose(rng)
    }
}

pub(crate) fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Volume outside of the `0.0..=1.0` range.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("volume {0} is outside of 0.0..=1.0")]
pub struct InvalidVolume(pub f32);

/// Linear gain between silence (`0.0`) and unity (`1.0`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct VolumeLevel(f32);

impl VolumeLevel {
    pub const SILENT: VolumeLevel = VolumeLevel(0.0);
    pub const FULL: VolumeLevel = VolumeLevel(1.0);

    pub fn new(value: f32) -> Result<Self, InvalidVolume> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidVolume(value))
        }
    }

    /// Converts a slider percentage, clamping anything above 100.
    pub fn from_percent(percent: u8) -> Self {
        Self(f32::from(percent.min(100)) / 100.0)
    }

    pub fn get(self) -> f32 {
        self.0
    }

    /// Gain actually sent to the output: this level scaled by `master`.
    pub fn scaled_by(self, master: VolumeLevel) -> f32 {
        self.0 * master.0
    }
}

impl Default for VolumeLevel {
    fn default() -> Self {
        Self::FULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_volume_level_validation() {
        assert!(VolumeLevel::new(0.5).is_ok());
        assert!(VolumeLevel::new(0.0).is_ok());
        assert!(VolumeLevel::new(1.0).is_ok());
        assert_eq!(VolumeLevel::new(1.5), Err(InvalidVolume(1.5)));
        assert!(VolumeLevel::new(-0.1).is_err());
        assert!(VolumeLevel::new(f32::NAN).is_err());
    }

    #[test]
    fn test_volume_from_percent_clamps() {
        assert_eq!(VolumeLevel::from_percent(70).get(), 0.7);
        assert_eq!(VolumeLevel::from_percent(250), VolumeLevel::FULL);
        assert_eq!(VolumeLevel::from_percent(0), VolumeLevel::SILENT);
    }

    #[test]
    fn test_volume_scaled_by_master() {
        let sound = VolumeLevel::new(0.5).unwrap();
        let master = VolumeLevel::new(0.5).unwrap();
        assert!((sound.scaled_by(master) - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_category_looping_and_folders() {
        assert!(Category::Ambient.loops());
        assert!(Category::Music.loops());
        assert!(!Category::Effects.loops());

        assert!(Category::Effects.allows_folders());
        assert!(!Category::Music.allows_folders());
    }

    #[test]
    fn test_darken_header_color() {
        assert_eq!(darken(Category::Ambient.header_color()), [0x3C, 0x8C, 0x40]);
        assert_eq!(darken([0xFF, 0x98, 0x00]), [0xCC, 0x79, 0x00]);
    }

    #[test]
    fn test_sound_display_name_is_stem() {
        let sound = Sound::new("music/Tavern Song.mp3", true);
        assert_eq!(sound.display_name(), "Tavern Song");
    }

    #[test]
    fn test_sound_folder_scan_filters_audio() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.mp3"), "data").unwrap();
        fs::write(temp_dir.path().join("b.txt"), "data").unwrap();

        let mut folder = SoundFolder::new(temp_dir.path());
        folder.scan().unwrap();

        let names: Vec<_> = folder
            .sounds
            .iter()
            .map(|sound| sound.path.file_name().unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["a.mp3"]);
        assert!(folder.sounds.iter().all(|sound| !sound.looping));
    }

    #[test]
    fn test_sound_folder_random_sound() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.mp3"), "data").unwrap();
        fs::write(temp_dir.path().join("b.mp3"), "data").unwrap();

        let mut folder = SoundFolder::new(temp_dir.path());
        folder.scan().unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        let names: HashSet<_> = (0..10)
            .map(|_| {
                folder
                    .random_sound_with(&mut rng)
                    .unwrap()
                    .path
                    .file_name()
                    .unwrap()
                    .to_owned()
            })
            .collect();

        assert!(!names.is_empty());
        assert!(names.iter().all(|name| name == "a.mp3" || name == "b.mp3"));
    }

    #[test]
    fn test_empty_sound_folder_has_no_random_sound() {
        let folder = SoundFolder::new("nowhere");
        assert!(folder.random_sound().is_none());
    }
}
