//! Application-wide constants.

/// The display name of the application.
pub const APP_NAME: &str = "OpenBoard";

/// Native window title.
pub const WINDOW_TITLE: &str = "OpenBoard - TTRPG Audio Mixer and Soundboard";

/// Name of the instructions file seeded into each category folder.
pub const README_FILE_NAME: &str = "README.txt";

/// Lowercase extensions of the audio files the board picks up.
pub const AUDIO_EXTENSIONS: [&str; 6] = ["mp3", "wav", "ogg", "m4a", "flac", "aac"];

/// Environment variable overriding the base config directory.
pub const CONFIG_DIR_ENV: &str = "OPENBOARD_CONFIG_DIR";

/// Default master volume, in percent.
pub const DEFAULT_MASTER_VOLUME: u8 = 80;

/// Default per-sound volume, in percent.
pub const DEFAULT_SOUND_VOLUME: u8 = 70;
