//! Main GUI application.

use eframe::egui;

use crate::animation::{EncodedAnimation, Playback};
use crate::config::{Config, RunConfiguration};
use crate::driver::{DriverState, SimulationDriver, TickEvent};
use crate::engine::Engine;
use crate::export::ExportPackager;
use crate::schedule::FrameBudget;
use crate::telemetry::TelemetrySeries;

use super::views::{AppCommand, ChartsPanel, ControlPanel, LatticeView, SettingsPanel};

/// Everything belonging to one run, constructed fresh when a run starts and
/// replaced wholesale on restart. Dropping it drops the engine handle and
/// every view derived from it.
struct RunContext {
    driver: SimulationDriver,
    playback: Playback,
    telemetry: Option<TelemetrySeries>,
    animation: Option<EncodedAnimation>,
}

/// Main application state
pub struct ThermoApp {
    /// Configuration (playback pacing, export directory)
    config: Config,
    /// Run parameter inputs
    settings_panel: SettingsPanel,
    /// Start/discard/export controls and progress
    control_panel: ControlPanel,
    /// Lattice grid view
    lattice_view: LatticeView,
    /// Telemetry charts
    charts_panel: ChartsPanel,
    /// Archive/animation writer
    packager: ExportPackager,
    /// Current run, if any
    run: Option<RunContext>,
}

impl ThermoApp {
    /// Create a new application with the given configuration
    pub fn new(config: Config) -> Self {
        Self {
            settings_panel: SettingsPanel::new(config.run.clone()),
            control_panel: ControlPanel::new(),
            lattice_view: LatticeView::new(),
            charts_panel: ChartsPanel::new(),
            packager: ExportPackager::new(&config.export.output_dir),
            run: None,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    fn state(&self) -> DriverState {
        self.run
            .as_ref()
            .map_or(DriverState::Idle, |run| run.driver.state())
    }

    /// Start a new run from the current input fields, replacing any
    /// previous run context.
    fn start_run(&mut self) {
        // configuration is read fresh from the inputs at run start
        let cfg = match RunConfiguration::from_params(self.settings_panel.params()) {
            Ok(cfg) => cfg,
            Err(e) => {
                self.control_panel.set_status(format!("invalid configuration: {e}"));
                return;
            }
        };
        let frames = FrameBudget::derive(
            self.config.playback.total_secs,
            self.config.playback.frame_interval,
            cfg.temp_steps,
        );
        match SimulationDriver::new(cfg, frames) {
            Ok(mut driver) => {
                driver.start();
                self.run = Some(RunContext {
                    driver,
                    playback: Playback::new(),
                    telemetry: None,
                    animation: None,
                });
                self.control_panel.set_status("run started".to_string());
            }
            Err(e) => self.control_panel.set_status(format!("schedule error: {e}")),
        }
    }

    fn handle_command(&mut self, command: AppCommand) {
        match command {
            AppCommand::Start => {
                if self.state().allows_new_run() {
                    self.start_run();
                }
            }
            AppCommand::Discard => {
                if let Some(run) = &mut self.run {
                    run.driver.cancel();
                }
                // full teardown: drops the engine handle and derived state
                self.run = None;
                self.control_panel.set_status("run discarded".to_string());
            }
            AppCommand::ExportArchive => {
                if let Some(run) = &mut self.run {
                    let status = match self.packager.export_archive(&mut run.driver) {
                        Ok(path) => format!("archive saved: {}", path.display()),
                        Err(e) => format!("export failed: {e}"),
                    };
                    self.control_panel.set_status(status);
                }
            }
            AppCommand::SaveAnimation => {
                if let Some(run) = &self.run {
                    // saved from the copy taken at the analysis barrier, not
                    // from a fresh engine view
                    let status = match run.animation.as_ref() {
                        Some(encoded) => match self.packager.export_animation(encoded) {
                            Ok(path) => format!("animation saved: {}", path.display()),
                            Err(e) => format!("export failed: {e}"),
                        },
                        None => "animation not available yet".to_string(),
                    };
                    self.control_panel.set_status(status);
                }
            }
        }
    }

    /// Advance the run by at most one atomic engine call, then arrange for
    /// the next repaint. This is the cooperative scheduler: yielding between
    /// steps is what keeps the UI live during a long run.
    fn pump(&mut self, ctx: &egui::Context) {
        let Some(run) = &mut self.run else { return };
        match run.driver.state() {
            DriverState::Running { .. } | DriverState::Analyzing => {
                let event = run.driver.tick();
                if matches!(event, TickEvent::Analyzed) {
                    // the analysis barrier has passed; copy everything the
                    // charts and exports need out of engine memory
                    run.telemetry = run.driver.telemetry();
                    run.animation = run.driver.encoded_animation();
                }
                ctx.request_repaint();
            }
            DriverState::Done => {
                // playback loop: one frame per repaint tick, wrapping
                run.playback.advance(run.driver.engine().anim_len());
                ctx.request_repaint_after(run.driver.frame_budget().frame_delay());
            }
            DriverState::Idle | DriverState::Cancelled => {}
        }
    }
}

impl eframe::App for ThermoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump(ctx);

        let state = self.state();
        let progress = self
            .run
            .as_ref()
            .map_or(0.0, |run| run.driver.progress());

        // Top panel with controls
        let mut commands = Vec::new();
        egui::TopBottomPanel::top("control_panel").show(ctx, |ui| {
            commands = self.control_panel.show(ui, state, progress);
        });
        for command in commands {
            self.handle_command(command);
        }

        // Right panel with settings and charts
        egui::SidePanel::right("side_panel")
            .min_width(280.0)
            .default_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.settings_panel.show(ui, state.allows_new_run());

                    ui.separator();

                    match self.run.as_ref().and_then(|run| run.telemetry.as_ref()) {
                        Some(telemetry) => self.charts_panel.show(ui, telemetry),
                        None => {
                            ui.label("Charts appear once a run has completed.");
                        }
                    }
                });
            });

        // Central panel with the lattice view
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(run) = &self.run {
                let engine = run.driver.engine();
                let (width, height) = (engine.width(), engine.height());
                let reader = run.driver.reader();
                // playback reads a recorded frame; any other state shows the
                // live start-of-step lattice
                let frame = match run.driver.state() {
                    DriverState::Done if engine.anim_len() > 0 => {
                        reader.frame(run.playback.current())
                    }
                    _ => reader.start_frame(),
                };
                self.lattice_view.show(ui, frame, width, height);
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label("Configure a run and press Start.");
                });
            }
        });

        // Bottom status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(run) = &self.run {
                    let engine = run.driver.engine();
                    ui.label(format!(
                        "State: {:?} | Steps: {}/{} | Frames: {}",
                        run.driver.state(),
                        engine.log_len(),
                        run.driver.schedule().len(),
                        engine.anim_len(),
                    ));
                } else {
                    ui.label("Idle");
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label("THERMOLATTICE");
                });
            });
        });
    }
}

/// Run the GUI application
pub fn run_gui(config: Config) -> eframe::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("thermolattice"),
        ..Default::default()
    };

    eframe::run_native(
        "thermolattice",
        native_options,
        Box::new(|_cc| Box::new(ThermoApp::new(config))),
    )
}
