use crate::audio_service::{AudioService, PlaybackError};
use crate::audio_thread::AudioThread;
use crate::board::{Board, PlayerState, SectionNotice, SoundPlayer, SoundSection};
use crate::bootstrap;
use crate::config::Config;
use crate::constants::APP_NAME;
use crate::sound::{darken, VolumeLevel};
use eframe::egui;
use std::path::PathBuf;
use tracing::{error, info};

fn rgb(color: [u8; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(color[0], color[1], color[2])
}

/// BoardApp controls application UI.
pub struct BoardApp {
    board: Board,
    /// Playback goes through a separate audio thread, see [AudioThread].
    service: AudioService,
    config: Config,
    /// Master volume slider value, in percent.
    master_volume: u8,
    /// Last failure worth showing in the header.
    status: Option<String>,
}

impl BoardApp {
    /// Spawns the audio thread and loads the board from `root`.
    ///
    /// # Parameters
    ///
    /// * `cc` - eframe creation context, its egui context lets the audio thread request repaints.
    /// * `config` - loaded application configuration.
    /// * `root` - directory holding the category folders.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: Config,
        root: PathBuf,
    ) -> Result<Self, PlaybackError> {
        let audio_thread = AudioThread::spawn(&cc.egui_ctx)?;
        let master_volume = config.audio.master_volume;
        let service = AudioService::new(
            Box::new(audio_thread),
            VolumeLevel::from_percent(master_volume),
        );
        let board = Board::open(root, config.audio.sound_volume);

        Ok(Self {
            board,
            service,
            config,
            master_volume,
            status: None,
        })
    }

    /// Records a failure for the header status line.
    fn report(&mut self, result: Result<(), PlaybackError>) {
        if let Err(err) = result {
            error!(%err, "playback command failed");
            self.status = Some(err.to_string());
        }
    }

    fn drain_playback_events(&mut self) {
        for event in self.service.poll_events() {
            if let Some(message) = self.board.handle_event(&event) {
                self.status = Some(message);
            }
        }
    }

    /// Lets the user pick another sounds root and remembers it.
    fn open_folder(&mut self) {
        let Some(root) = rfd::FileDialog::new()
            .set_title("Choose the folder holding ambient, music and effects")
            .set_directory(self.board.root())
            .pick_folder()
        else {
            return;
        };

        if let Err(err) = bootstrap::create_sample_folders(&root) {
            error!("{err:#}");
            self.status = Some(format!("{err:#}"));
            return;
        }

        let result = self.board.set_root(root.clone(), &mut self.service);
        self.report(result);

        self.config.paths.sounds_root = Some(root);
        match self.config.save() {
            Ok(()) => info!("saved sounds root to config"),
            Err(err) => {
                error!("{err:#}");
                self.status = Some(format!("Could not save settings: {err:#}"));
            }
        }
    }

    /// Header: title, master volume and board-wide actions.
    fn header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(APP_NAME)
                    .size(22.0)
                    .strong()
                    .color(rgb([0x4C, 0xAF, 0x50])),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("⏹ Stop All").clicked() {
                    let result = self.board.stop_all(&mut self.service);
                    self.report(result);
                }

                if ui.button("🔄 Refresh").clicked() {
                    let result = self.board.refresh_all(&mut self.service);
                    self.report(result);
                }

                if ui.button("📂 Open folder…").clicked() {
                    self.open_folder();
                }

                let slider = egui::Slider::new(&mut self.master_volume, 0..=100).suffix("%");
                if ui.add(slider).changed() {
                    let result = self
                        .service
                        .set_master_volume(VolumeLevel::from_percent(self.master_volume));
                    self.report(result);
                }
                ui.label("Master Volume:");
            });
        });

        ui.horizontal(|ui| {
            ui.weak(self.board.root().display().to_string());
            if let Some(status) = &self.status {
                ui.colored_label(egui::Color32::LIGHT_RED, status);
                if ui.small_button("✖").clicked() {
                    self.status = None;
                }
            }
        });
    }
}

/// One board column.
fn section_column(
    ui: &mut egui::Ui,
    section: &mut SoundSection,
    service: &mut AudioService,
    status: &mut Option<String>,
) {
    let category = section.category();
    ui.vertical_centered(|ui| {
        ui.label(
            egui::RichText::new(format!(" {} ", category.title()))
                .size(16.0)
                .strong()
                .color(egui::Color32::WHITE)
                .background_color(rgb(category.header_color())),
        );
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt(category.folder_name())
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            match section.notice() {
                Some(SectionNotice::FolderMissing(name)) => {
                    ui.vertical_centered(|ui| ui.label(format!("📁 Folder '{name}' not found")));
                    return;
                }
                Some(SectionNotice::Empty(message)) => {
                    ui.vertical_centered(|ui| ui.label(format!("🎵 {message}")));
                    return;
                }
                Some(SectionNotice::Unreadable(message)) => {
                    ui.colored_label(egui::Color32::LIGHT_RED, message);
                    return;
                }
                None => {}
            }

            let accent = rgb(darken(category.header_color()));
            let count = section.players().len();
            for (index, player) in section.players_mut().iter_mut().enumerate() {
                if let Err(err) = player_row(ui, player, service, accent) {
                    error!(%err, "playback command failed");
                    *status = Some(err.to_string());
                }
                if index + 1 < count {
                    ui.separator();
                }
            }
        });
}

/// Controls of a single sound: name, play/pause, stop and volume.
fn player_row(
    ui: &mut egui::Ui,
    player: &mut SoundPlayer,
    service: &mut AudioService,
    accent: egui::Color32,
) -> Result<(), PlaybackError> {
    let mut name = egui::RichText::new(match player.folder_len() {
        Some(_) => format!("📁 {} 🔄", player.display_name()),
        None => player.display_name(),
    });
    if player.state() == PlayerState::Playing {
        name = name.strong().color(accent);
    }
    ui.label(name);

    let mut result = Ok(());
    ui.horizontal(|ui| {
        let playing = player.state() == PlayerState::Playing;
        if playing {
            if ui.button("⏸").on_hover_text("Pause").clicked() {
                result = player.pause(service);
            }
        } else if ui.button("⏵").on_hover_text("Play").clicked() {
            result = player.play(service);
        }

        if ui.button("⏹").on_hover_text("Stop").clicked() {
            result = player.stop(service);
        }

        ui.label("Vol:");
        let mut volume = player.volume();
        if ui
            .add(egui::Slider::new(&mut volume, 0..=100).suffix("%"))
            .changed()
        {
            result = player.set_volume(volume, service);
        }
    });

    if let Some(count) = player.folder_len() {
        ui.small(format!("({count} sounds)"));
    }

    result
}

impl eframe::App for BoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_playback_events();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            self.header(ui);
            ui.add_space(8.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let service = &mut self.service;
            let status = &mut self.status;
            ui.columns(3, |columns| {
                for (column, section) in columns.iter_mut().zip(self.board.sections_mut()) {
                    section_column(column, section, service, status);
                }
            });
        });
    }
}
