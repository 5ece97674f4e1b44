//! Playback control layered over an audio backend.

use crate::sound::{Sound, VolumeLevel};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Errors raised while controlling playback.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("audio thread is no longer running")]
    ChannelClosed,
    #[error("failed to spawn audio thread")]
    ThreadSpawn(#[source] std::io::Error),
    #[error("failed to open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },
}

/// Identifies one start of a sound, so late events of an earlier start can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackId(pub(crate) u64);

/// Notifications coming back from the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A one-shot sound reached its end.
    Finished { path: PathBuf, id: PlaybackId },
    /// A sound could not be started.
    Failed {
        path: PathBuf,
        id: PlaybackId,
        reason: String,
    },
    /// No output device could be opened; nothing will play.
    DeviceUnavailable(String),
}

/// Backend performing the actual audio I/O.
///
/// Volumes handed to the backend are final gains, master volume already applied.
pub trait SoundRepository {
    /// Starts `sound`, or resumes it if it is paused.
    ///
    /// Later events about this sound carry `id`, including after a resume.
    fn play(&self, sound: &Sound, volume: f32, id: PlaybackId) -> Result<(), PlaybackError>;
    fn pause(&self, path: &Path) -> Result<(), PlaybackError>;
    /// Stops the sound and releases its resources.
    fn stop(&self, path: &Path) -> Result<(), PlaybackError>;
    fn set_volume(&self, path: &Path, volume: f32) -> Result<(), PlaybackError>;
    fn stop_all(&self) -> Result<(), PlaybackError>;
    /// Returns the next pending event, without blocking.
    fn poll_event(&self) -> Option<PlaybackEvent>;
}

/// High level service mixing per-sound volumes with the master volume.
pub struct AudioService {
    repository: Box<dyn SoundRepository>,
    volumes: HashMap<PathBuf, VolumeLevel>,
    master_volume: VolumeLevel,
    last_id: u64,
}

impl AudioService {
    pub fn new(repository: Box<dyn SoundRepository>, master_volume: VolumeLevel) -> Self {
        Self {
            repository,
            volumes: HashMap::new(),
            master_volume,
            last_id: 0,
        }
    }

    pub fn master_volume(&self) -> VolumeLevel {
        self.master_volume
    }

    /// Volume set for `path`, full volume if never set.
    pub fn sound_volume(&self, path: &Path) -> VolumeLevel {
        self.volumes.get(path).copied().unwrap_or_default()
    }

    fn effective_volume(&self, path: &Path) -> f32 {
        self.sound_volume(path).scaled_by(self.master_volume)
    }

    /// Starts or resumes `sound` under a fresh [PlaybackId].
    pub fn play_sound(&mut self, sound: &Sound) -> Result<PlaybackId, PlaybackError> {
        self.volumes.entry(sound.path.clone()).or_default();
        let volume = self.effective_volume(&sound.path);
        self.last_id += 1;
        let id = PlaybackId(self.last_id);
        self.repository.play(sound, volume, id)?;
        Ok(id)
    }

    pub fn pause_sound(&mut self, sound: &Sound) -> Result<(), PlaybackError> {
        self.repository.pause(&sound.path)
    }

    pub fn stop_sound(&mut self, sound: &Sound) -> Result<(), PlaybackError> {
        self.repository.stop(&sound.path)
    }

    pub fn set_sound_volume(
        &mut self,
        sound: &Sound,
        volume: VolumeLevel,
    ) -> Result<(), PlaybackError> {
        self.volumes.insert(sound.path.clone(), volume);
        self.repository
            .set_volume(&sound.path, self.effective_volume(&sound.path))
    }

    /// Changes the master volume and re-applies it to every sound seen so far.
    pub fn set_master_volume(&mut self, volume: VolumeLevel) -> Result<(), PlaybackError> {
        self.master_volume = volume;
        for path in self.volumes.keys() {
            self.repository
                .set_volume(path, self.effective_volume(path))?;
        }
        Ok(())
    }

    pub fn stop_all(&mut self) -> Result<(), PlaybackError> {
        self.repository.stop_all()
    }

    /// Drains all pending backend events.
    pub fn poll_events(&mut self) -> Vec<PlaybackEvent> {
        std::iter::from_fn(|| self.repository.poll_event()).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{service_with, Call};
    use super::*;

    fn approx(actual: f32, expected: f32) -> bool {
        (actual - expected).abs() < 1e-6
    }

    #[test]
    fn test_play_uses_master_for_unknown_sound() {
        let (mut service, repo) = service_with(VolumeLevel::from_percent(80));
        let sound = Sound::new("ambient/rain.ogg", true);

        service.play_sound(&sound).unwrap();

        match repo.calls().as_slice() {
            [Call::Play(path, looping, volume)] => {
                assert_eq!(path, &sound.path);
                assert!(*looping);
                assert!(approx(*volume, 0.8));
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[test]
    fn test_sound_volume_scaled_by_master() {
        let (mut service, repo) = service_with(VolumeLevel::from_percent(50));
        let sound = Sound::new("music/theme.mp3", true);

        service
            .set_sound_volume(&sound, VolumeLevel::from_percent(70))
            .unwrap();
        service.play_sound(&sound).unwrap();

        let calls = repo.calls();
        assert!(matches!(&calls[0], Call::SetVolume(_, v) if approx(*v, 0.35)));
        assert!(matches!(&calls[1], Call::Play(_, _, v) if approx(*v, 0.35)));
    }

    #[test]
    fn test_master_volume_reapplied_to_known_sounds() {
        let (mut service, repo) = service_with(VolumeLevel::FULL);
        let rain = Sound::new("ambient/rain.ogg", true);
        let horn = Sound::new("effects/horn.wav", false);
        service
            .set_sound_volume(&rain, VolumeLevel::from_percent(50))
            .unwrap();
        service.play_sound(&horn).unwrap();
        repo.clear_calls();

        service
            .set_master_volume(VolumeLevel::from_percent(40))
            .unwrap();

        let calls = repo.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().any(
            |call| matches!(call, Call::SetVolume(p, v) if p == &rain.path && approx(*v, 0.2))
        ));
        assert!(calls.iter().any(
            |call| matches!(call, Call::SetVolume(p, v) if p == &horn.path && approx(*v, 0.4))
        ));
        assert_eq!(service.master_volume(), VolumeLevel::from_percent(40));
    }

    #[test]
    fn test_pause_stop_and_stop_all_forwarded() {
        let (mut service, repo) = service_with(VolumeLevel::FULL);
        let sound = Sound::new("music/theme.mp3", true);

        service.pause_sound(&sound).unwrap();
        service.stop_sound(&sound).unwrap();
        service.stop_all().unwrap();

        assert_eq!(
            repo.calls(),
            vec![
                Call::Pause(sound.path.clone()),
                Call::Stop(sound.path.clone()),
                Call::StopAll,
            ]
        );
    }

    #[test]
    fn test_poll_events_drains_queue() {
        let (mut service, repo) = service_with(VolumeLevel::FULL);
        repo.push_event(PlaybackEvent::Finished {
            path: PathBuf::from("effects/horn.wav"),
            id: PlaybackId(1),
        });
        repo.push_event(PlaybackEvent::DeviceUnavailable("no device".into()));

        let events = service.poll_events();
        assert_eq!(events.len(), 2);
        assert!(service.poll_events().is_empty());
    }

    #[test]
    fn test_every_play_gets_a_fresh_id() {
        let (mut service, _repo) = service_with(VolumeLevel::FULL);
        let sound = Sound::new("effects/horn.wav", false);

        let first = service.play_sound(&sound).unwrap();
        let second = service.play_sound(&sound).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_closed_backend_reports_error() {
        let (mut service, repo) = service_with(VolumeLevel::FULL);
        repo.close();

        let result = service.play_sound(&Sound::new("music/theme.mp3", true));
        assert!(matches!(result, Err(PlaybackError::ChannelClosed)));
    }
}
