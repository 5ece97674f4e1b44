pub mod audio_service;
mod audio_thread;
pub mod board;
pub mod board_app;
pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod library;
pub mod sound;

/// Audio source: decoded audio data.
///
/// Any type, that can represent audio data, has to implement [rodio::Source] trait, which is an
/// [Iterator] over audio samples. Sounds are read from files only, so [rodio::Decoder] over a
/// buffered file is the audio source. Looping sounds wrap it into [rodio::source::Repeat].
type DecodedAudioSource = rodio::Decoder<std::io::BufReader<std::fs::File>>;
