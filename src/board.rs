//! Board state independent of the UI: sections of players and their playback state.

use crate::audio_service::{AudioService, PlaybackError, PlaybackEvent, PlaybackId};
use crate::library::{self, LibraryEntry, SectionListing};
use crate::sound::{folder_name, Category, Sound, SoundFolder, VolumeLevel};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Playback state of a single board entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone)]
enum PlayerSource {
    File(Sound),
    Folder(SoundFolder),
}

/// One triggerable entry: a file, or an effects folder played as a random pick.
#[derive(Debug, Clone)]
pub struct SoundPlayer {
    source: PlayerSource,
    looping: bool,
    volume: u8,
    state: PlayerState,
    /// The sound handed to the audio service by the last `play`.
    current: Option<Sound>,
    /// Events carrying any other id belong to an earlier start.
    playback: Option<PlaybackId>,
}

impl SoundPlayer {
    pub fn for_file(path: impl Into<PathBuf>, looping: bool, volume: u8) -> Self {
        Self::new(PlayerSource::File(Sound::new(path, looping)), looping, volume)
    }

    /// Folder entries always play one-shots; `folder` should already be scanned.
    pub fn for_folder(folder: SoundFolder, volume: u8) -> Self {
        Self::new(PlayerSource::Folder(folder), false, volume)
    }

    fn new(source: PlayerSource, looping: bool, volume: u8) -> Self {
        Self {
            source,
            looping,
            volume: volume.min(100),
            state: PlayerState::Stopped,
            current: None,
            playback: None,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.source {
            PlayerSource::File(sound) => sound.display_name(),
            PlayerSource::Folder(folder) => folder.display_name(),
        }
    }

    /// Number of sounds behind a folder entry, `None` for files.
    pub fn folder_len(&self) -> Option<usize> {
        match &self.source {
            PlayerSource::File(_) => None,
            PlayerSource::Folder(folder) => Some(folder.sounds.len()),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Slider value in percent.
    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn current_sound(&self) -> Option<&Sound> {
        self.current.as_ref()
    }

    pub fn playback_id(&self) -> Option<PlaybackId> {
        self.playback
    }

    /// Resumes a paused sound, otherwise starts a new one.
    ///
    /// Folder entries draw a fresh random sound on every new start. An empty folder
    /// does nothing.
    pub fn play(&mut self, service: &mut AudioService) -> Result<(), PlaybackError> {
        let sound = match (&self.current, self.state) {
            (Some(sound), PlayerState::Paused) => sound.clone(),
            _ => match &self.source {
                PlayerSource::File(sound) => sound.clone(),
                PlayerSource::Folder(folder) => match folder.random_sound() {
                    Some(picked) => Sound::new(picked.path.clone(), self.looping),
                    None => return Ok(()),
                },
            },
        };

        service.set_sound_volume(&sound, VolumeLevel::from_percent(self.volume))?;
        self.playback = Some(service.play_sound(&sound)?);
        self.current = Some(sound);
        self.state = PlayerState::Playing;
        Ok(())
    }

    pub fn pause(&mut self, service: &mut AudioService) -> Result<(), PlaybackError> {
        if self.state != PlayerState::Playing {
            return Ok(());
        }
        if let Some(sound) = &self.current {
            service.pause_sound(sound)?;
        }
        self.state = PlayerState::Paused;
        Ok(())
    }

    pub fn stop(&mut self, service: &mut AudioService) -> Result<(), PlaybackError> {
        self.state = PlayerState::Stopped;
        self.playback = None;
        match self.current.take() {
            Some(sound) => service.stop_sound(&sound),
            None => Ok(()),
        }
    }

    /// Updates the slider value, applying it live when a sound is active.
    pub fn set_volume(
        &mut self,
        percent: u8,
        service: &mut AudioService,
    ) -> Result<(), PlaybackError> {
        self.volume = percent.min(100);
        if let Some(sound) = &self.current {
            service.set_sound_volume(sound, VolumeLevel::from_percent(self.volume))?;
        }
        Ok(())
    }

    /// Returns the player to `Stopped` if the event concerns its current playback.
    pub fn handle_event(&mut self, event: &PlaybackEvent) -> bool {
        let concerns_current = match event {
            PlaybackEvent::Finished { id, .. } | PlaybackEvent::Failed { id, .. } => {
                self.playback == Some(*id)
            }
            PlaybackEvent::DeviceUnavailable(_) => true,
        };

        if concerns_current {
            self.current = None;
            self.playback = None;
            self.state = PlayerState::Stopped;
        }
        concerns_current
    }
}

/// What a section shows instead of players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionNotice {
    /// The backing folder doesn't exist.
    FolderMissing(String),
    /// The folder holds nothing playable.
    Empty(&'static str),
    /// Scanning failed.
    Unreadable(String),
}

/// One board column: a category, the folder backing it and its players.
#[derive(Debug)]
pub struct SoundSection {
    category: Category,
    folder: PathBuf,
    default_volume: u8,
    players: Vec<SoundPlayer>,
    notice: Option<SectionNotice>,
}

impl SoundSection {
    /// Creates the section and loads its players from `folder`.
    pub fn new(category: Category, folder: impl Into<PathBuf>, default_volume: u8) -> Self {
        let mut section = Self {
            category,
            folder: folder.into(),
            default_volume,
            players: Vec::new(),
            notice: None,
        };
        section.load();
        section
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn players(&self) -> &[SoundPlayer] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [SoundPlayer] {
        &mut self.players
    }

    pub fn notice(&self) -> Option<&SectionNotice> {
        self.notice.as_ref()
    }

    /// Rebuilds the players from the folder contents.
    pub fn load(&mut self) {
        self.players.clear();
        self.notice = None;

        let listing = match library::scan_section(&self.folder, self.category) {
            Ok(listing) => listing,
            Err(err) => {
                warn!(folder = %self.folder.display(), "{err:#}");
                self.notice = Some(SectionNotice::Unreadable(format!("{err:#}")));
                return;
            }
        };

        let entries = match listing {
            SectionListing::Missing => {
                self.notice = Some(SectionNotice::FolderMissing(folder_name(&self.folder)));
                return;
            }
            SectionListing::Entries(entries) => entries,
        };

        for entry in entries {
            match self.player_for(entry) {
                Ok(player) => self.players.push(player),
                Err(err) => warn!("skipping entry: {err:#}"),
            }
        }

        if self.players.is_empty() {
            let message = if self.category.allows_folders() {
                "No audio files or folders found\nAdd audio files or folders with sounds!"
            } else {
                "No audio files found\nDrop some music here!"
            };
            self.notice = Some(SectionNotice::Empty(message));
        }
    }

    fn player_for(&self, entry: LibraryEntry) -> anyhow::Result<SoundPlayer> {
        match entry {
            LibraryEntry::File(path) => Ok(SoundPlayer::for_file(
                path,
                self.category.loops(),
                self.default_volume,
            )),
            LibraryEntry::Folder(path) => {
                let mut folder = SoundFolder::new(path);
                folder.scan()?;
                Ok(SoundPlayer::for_folder(folder, self.default_volume))
            }
        }
    }

    /// Stops every player, attempting all of them before reporting the first error.
    pub fn stop_all(&mut self, service: &mut AudioService) -> Result<(), PlaybackError> {
        let mut result = Ok(());
        for player in &mut self.players {
            if let Err(err) = player.stop(service) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    /// Stops everything and reloads the folder.
    pub fn refresh(&mut self, service: &mut AudioService) -> Result<(), PlaybackError> {
        let stopped = self.stop_all(service);
        self.load();
        stopped
    }

    pub fn handle_event(&mut self, event: &PlaybackEvent) {
        for player in &mut self.players {
            player.handle_event(event);
        }
    }
}

/// The three sections over a sounds root.
#[derive(Debug)]
pub struct Board {
    root: PathBuf,
    default_volume: u8,
    sections: Vec<SoundSection>,
}

impl Board {
    pub fn open(root: impl Into<PathBuf>, default_volume: u8) -> Self {
        let root = root.into();
        let sections = Self::load_sections(&root, default_volume);
        Self {
            root,
            default_volume,
            sections,
        }
    }

    fn load_sections(root: &Path, default_volume: u8) -> Vec<SoundSection> {
        Category::ALL
            .iter()
            .map(|&category| {
                SoundSection::new(category, root.join(category.folder_name()), default_volume)
            })
            .collect()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sections(&self) -> &[SoundSection] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut [SoundSection] {
        &mut self.sections
    }

    pub fn stop_all(&mut self, service: &mut AudioService) -> Result<(), PlaybackError> {
        let sections = self.sections.iter_mut().map(|section| section.stop_all(service));
        let first_error = sections.fold(Ok(()), |acc, result| acc.and(result));
        // Catch anything still audible that the players don't know about
        service.stop_all()?;
        first_error
    }

    pub fn refresh_all(&mut self, service: &mut AudioService) -> Result<(), PlaybackError> {
        let stopped = self.stop_all(service);
        for section in &mut self.sections {
            section.load();
        }
        stopped
    }

    /// Switches to another sounds root, stopping everything first.
    pub fn set_root(
        &mut self,
        root: impl Into<PathBuf>,
        service: &mut AudioService,
    ) -> Result<(), PlaybackError> {
        let stopped = self.stop_all(service);
        self.root = root.into();
        info!(root = %self.root.display(), "switched sounds root");
        self.sections = Self::load_sections(&self.root, self.default_volume);
        stopped
    }

    /// Dispatches a backend event; returns a status line when the user should hear about it.
    pub fn handle_event(&mut self, event: &PlaybackEvent) -> Option<String> {
        for section in &mut self.sections {
            section.handle_event(event);
        }

        match event {
            PlaybackEvent::Finished { .. } => None,
            PlaybackEvent::Failed { path, reason, .. } => Some(format!(
                "Could not play {}: {reason}",
                Sound::new(path.clone(), false).display_name()
            )),
            PlaybackEvent::DeviceUnavailable(reason) => {
                Some(format!("No audio output available: {reason}"))
            }
        }
    }
}
