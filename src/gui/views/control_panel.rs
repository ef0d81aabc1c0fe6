//! Control panel for run playback and export.

use egui::Ui;

use crate::driver::DriverState;

/// Commands emitted by the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start a new run from the current inputs
    Start,
    /// Tear down the current run
    Discard,
    /// Build and save the run archive
    ExportArchive,
    /// Save the encoded animation
    SaveAnimation,
}

/// Control panel with the run gate, progress indicator and export controls
#[derive(Default)]
pub struct ControlPanel {
    /// Status message with its display deadline
    status_message: Option<(String, std::time::Instant)>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a transient status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Render the control panel and return any commands
    pub fn show(&mut self, ui: &mut Ui, state: DriverState, progress: f32) -> Vec<AppCommand> {
        let mut commands = Vec::new();

        // Clear old status messages after 5 seconds
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() > 5 {
                self.status_message = None;
            }
        }

        ui.horizontal(|ui| {
            // Start is gated while a run is in flight
            let can_start = state.allows_new_run();
            if ui
                .add_enabled(can_start, egui::Button::new("▶ Start run"))
                .clicked()
            {
                commands.push(AppCommand::Start);
            }

            let has_run = !matches!(state, DriverState::Idle);
            if ui
                .add_enabled(has_run, egui::Button::new("🗑 Discard"))
                .clicked()
            {
                commands.push(AppCommand::Discard);
            }

            ui.separator();

            let finished = state == DriverState::Done;
            if ui
                .add_enabled(finished, egui::Button::new("💾 Archive"))
                .on_hover_text("Build and save the run archive (zip)")
                .clicked()
            {
                commands.push(AppCommand::ExportArchive);
            }
            if ui
                .add_enabled(finished, egui::Button::new("🎞 Animation"))
                .on_hover_text("Save the encoded lattice animation (gif)")
                .clicked()
            {
                commands.push(AppCommand::SaveAnimation);
            }

            ui.separator();

            let label = match state {
                DriverState::Idle => "idle",
                DriverState::Running { .. } => "cooling",
                DriverState::Analyzing => "analyzing",
                DriverState::Done => "done",
                DriverState::Cancelled => "cancelled",
            };
            ui.label(label);

            ui.add(
                egui::ProgressBar::new(progress)
                    .desired_width(220.0)
                    .show_percentage(),
            );

            if let Some((message, _)) = &self.status_message {
                ui.separator();
                ui.label(egui::RichText::new(message).italics());
            }
        });

        commands
    }
}
