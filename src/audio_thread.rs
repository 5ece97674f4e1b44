use crate::audio_service::{PlaybackError, PlaybackEvent, PlaybackId, SoundRepository};
use crate::sound::Sound;
use eframe::egui;
use rodio::mixer::Mixer;
use rodio::Source;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use tracing::{debug, error, warn};

/// How often the thread wakes up to reap finished sounds while something is audible.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Commands to control a thread, that performs audio playback.
#[derive(Debug)]
pub enum AudioControlCommand {
    /// Starts a new playback of the sound, or resumes it if it is paused.
    Play {
        sound: Sound,
        volume: f32,
        id: PlaybackId,
    },
    Pause(PathBuf),
    Stop(PathBuf),
    SetVolume(PathBuf, f32),
    StopAll,
}

/// Struct that owns and controls a thread, that performs audio playback process.
///
/// Every sound gets its own [rodio::Sink] connected to the same output mixer, so any
/// number of sounds may play on top of each other.
pub struct AudioThread {
    /// Thread handle to a thread, that performs audio playback.
    ///
    /// Handle is wrapped in [Option] for graceful joining, when [AudioThread] is dropped.
    thread_handle: Option<std::thread::JoinHandle<()>>,
    commands_sender: Option<Sender<AudioControlCommand>>,
    events_receiver: Receiver<PlaybackEvent>,
}

impl AudioThread {
    /// Creates new [AudioThread] object with a spawned audio thread.
    ///
    /// # Parameters
    ///
    /// * `ui_ctx` - UI context handle, used by audio playback thread to force UI repainting.
    pub fn spawn(ui_ctx: &egui::Context) -> Result<Self, PlaybackError> {
        let (commands_sender, commands_receiver) = std::sync::mpsc::channel();
        let (events_sender, events_receiver) = std::sync::mpsc::channel();

        let thread_ctx = ThreadContext {
            commands_receiver,
            events_sender,
            ui_ctx: ui_ctx.clone(),
        };

        let thread_handle = std::thread::Builder::new()
            .name("audio".into())
            .spawn(move || playback_audio(thread_ctx))
            .map_err(PlaybackError::ThreadSpawn)?;

        Ok(Self {
            thread_handle: Some(thread_handle),
            commands_sender: Some(commands_sender),
            events_receiver,
        })
    }

    /// Sends a command to the audio playback thread.
    pub fn send(&self, command: AudioControlCommand) -> Result<(), PlaybackError> {
        self.commands_sender
            .as_ref()
            .ok_or(PlaybackError::ChannelClosed)?
            .send(command)
            .map_err(|_| PlaybackError::ChannelClosed)
    }
}

impl SoundRepository for AudioThread {
    fn play(&self, sound: &Sound, volume: f32, id: PlaybackId) -> Result<(), PlaybackError> {
        self.send(AudioControlCommand::Play {
            sound: sound.clone(),
            volume,
            id,
        })
    }

    fn pause(&self, path: &Path) -> Result<(), PlaybackError> {
        self.send(AudioControlCommand::Pause(path.to_path_buf()))
    }

    fn stop(&self, path: &Path) -> Result<(), PlaybackError> {
        self.send(AudioControlCommand::Stop(path.to_path_buf()))
    }

    fn set_volume(&self, path: &Path, volume: f32) -> Result<(), PlaybackError> {
        self.send(AudioControlCommand::SetVolume(path.to_path_buf(), volume))
    }

    fn stop_all(&self) -> Result<(), PlaybackError> {
        self.send(AudioControlCommand::StopAll)
    }

    fn poll_event(&self) -> Option<PlaybackEvent> {
        self.events_receiver.try_recv().ok()
    }
}

impl Drop for AudioThread {
    fn drop(&mut self) {
        // Dropping the sender disconnects the channel, which ends the thread loop
        drop(self.commands_sender.take());

        if let Some(thread) = self.thread_handle.take() {
            if thread.join().is_err() {
                error!("audio thread panicked");
            }
        }
    }
}

/// Struct that stores playback context data, controlled by the audio playback thread.
struct ThreadContext {
    commands_receiver: Receiver<AudioControlCommand>,
    events_sender: Sender<PlaybackEvent>,
    ui_ctx: egui::Context,
}

impl ThreadContext {
    /// Reports an event to the UI and wakes it up to handle it.
    fn notify(&self, event: PlaybackEvent) {
        // The UI side may already be gone during shutdown
        let _ = self.events_sender.send(event);
        self.ui_ctx.request_repaint();
    }
}

/// A sound being played, tagged with the start it belongs to.
struct Voice {
    sink: rodio::Sink,
    id: PlaybackId,
}

/// Entry point for the audio playback thread.
fn playback_audio(thread_ctx: ThreadContext) {
    // The stream must outlive every sink connected to its mixer
    let audio_stream = match rodio::OutputStreamBuilder::open_default_stream() {
        Ok(stream) => stream,
        Err(err) => {
            error!(%err, "failed to open default audio output");
            thread_ctx.notify(PlaybackEvent::DeviceUnavailable(err.to_string()));
            return;
        }
    };

    run_commands(&thread_ctx, audio_stream.mixer());
    debug!("audio thread exiting");
}

/// Handles commands until the sending side disconnects.
fn run_commands(thread_ctx: &ThreadContext, mixer: &Mixer) {
    let mut voices: HashMap<PathBuf, Voice> = HashMap::new();

    loop {
        reap_finished(thread_ctx, &mut voices);

        let audible = voices
            .values()
            .any(|voice| !voice.sink.is_paused() && !voice.sink.empty());

        let received = if audible {
            // Wake up early for commands, on time for reaping
            thread_ctx.commands_receiver.recv_timeout(POLL_INTERVAL)
        } else {
            // Nothing to reap until a command arrives, so block and save CPU time
            thread_ctx
                .commands_receiver
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected)
        };

        match received {
            Ok(command) => handle_command(thread_ctx, mixer, &mut voices, command),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Drops sinks that ran out of samples and reports their sounds as finished.
fn reap_finished(thread_ctx: &ThreadContext, voices: &mut HashMap<PathBuf, Voice>) {
    let finished: Vec<PathBuf> = voices
        .iter()
        .filter(|(_, voice)| voice.sink.empty())
        .map(|(path, _)| path.clone())
        .collect();

    for path in finished {
        if let Some(voice) = voices.remove(&path) {
            debug!(path = %path.display(), "sound finished");
            thread_ctx.notify(PlaybackEvent::Finished { path, id: voice.id });
        }
    }
}

/// Handles single received audio control command.
fn handle_command(
    thread_ctx: &ThreadContext,
    mixer: &Mixer,
    voices: &mut HashMap<PathBuf, Voice>,
    command: AudioControlCommand,
) {
    debug!(?command, "audio command");

    match command {
        AudioControlCommand::Play { sound, volume, id } => {
            if let Some(voice) = voices.get_mut(&sound.path) {
                voice.sink.set_volume(volume);
                voice.sink.play();
                voice.id = id;
                return;
            }

            match start_sound(mixer, &sound, volume) {
                Ok(sink) => {
                    voices.insert(sound.path, Voice { sink, id });
                }
                Err(err) => {
                    warn!(%err, "failed to start sound");
                    thread_ctx.notify(PlaybackEvent::Failed {
                        path: sound.path,
                        id,
                        reason: err.to_string(),
                    });
                }
            }
        }
        AudioControlCommand::Pause(path) => {
            if let Some(voice) = voices.get(&path) {
                voice.sink.pause();
            }
        }
        AudioControlCommand::Stop(path) => {
            // A stopped sink can't be reused, so it is dropped along with its source
            if let Some(voice) = voices.remove(&path) {
                voice.sink.stop();
            }
        }
        AudioControlCommand::SetVolume(path, volume) => {
            if let Some(voice) = voices.get(&path) {
                voice.sink.set_volume(volume);
            }
        }
        AudioControlCommand::StopAll => {
            for (_, voice) in voices.drain() {
                voice.sink.stop();
            }
        }
    }
}

/// Decodes the sound file and starts it on a fresh sink.
fn start_sound(mixer: &Mixer, sound: &Sound, volume: f32) -> Result<rodio::Sink, PlaybackError> {
    let file = File::open(&sound.path).map_err(|source| PlaybackError::Open {
        path: sound.path.clone(),
        source,
    })?;

    let source: crate::DecodedAudioSource =
        rodio::Decoder::new(BufReader::new(file)).map_err(|err| PlaybackError::Decode {
            path: sound.path.clone(),
            reason: err.to_string(),
        })?;

    // The sound starts playing once a source is appended, as a new sink isn't paused
    let sink = rodio::Sink::connect_new(mixer);
    sink.set_volume(volume);
    if sound.looping {
        sink.append(source.repeat_infinite());
    } else {
        sink.append(source);
    }

    Ok(sink)
}
