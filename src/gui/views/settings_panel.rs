//! Settings panel for run parameters.

use egui::Ui;

use crate::config::{Method, RunParams, ScheduleKind};

const LATTICE_CHOICES: [u32; 5] = [16, 32, 64, 128, 256];

/// Settings panel editing the parameters of the next run.
///
/// The inputs are free-form while no run is in flight; the app reads them
/// fresh when the start control fires.
pub struct SettingsPanel {
    /// Current parameters being edited
    params: RunParams,
    /// Whether a fixed seed is in use
    fixed_seed: bool,
}

impl SettingsPanel {
    /// Create a new settings panel with given initial parameters
    pub fn new(params: RunParams) -> Self {
        Self {
            fixed_seed: params.seed.is_some(),
            params,
        }
    }

    /// Get current parameters
    pub fn params(&self) -> &RunParams {
        &self.params
    }

    /// Render the settings panel
    pub fn show(&mut self, ui: &mut Ui, enabled: bool) {
        egui::CollapsingHeader::new("Run Settings")
            .default_open(true)
            .show(ui, |ui| {
                ui.add_enabled_ui(enabled, |ui| self.show_grid(ui));
            });
    }

    fn show_grid(&mut self, ui: &mut Ui) {
        egui::Grid::new("settings_grid")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                ui.label("Method:");
                egui::ComboBox::from_id_source("method")
                    .selected_text(self.params.method.as_str())
                    .show_ui(ui, |ui| {
                        for method in [Method::MoveVacancy, Method::MonteCarloSwap] {
                            ui.selectable_value(&mut self.params.method, method, method.as_str());
                        }
                    });
                ui.end_row();

                ui.label("Lattice:");
                egui::ComboBox::from_id_source("lattice")
                    .selected_text(format!(
                        "{0} × {0}",
                        self.params.lattice_cells
                    ))
                    .show_ui(ui, |ui| {
                        for cells in LATTICE_CHOICES {
                            ui.selectable_value(
                                &mut self.params.lattice_cells,
                                cells,
                                format!("{cells} × {cells}"),
                            );
                        }
                    });
                ui.end_row();

                ui.separator();
                ui.separator();
                ui.end_row();

                // Interaction energies
                ui.label("J(A,A):");
                ui.add(
                    egui::DragValue::new(&mut self.params.j00)
                        .speed(0.05)
                        .fixed_decimals(2),
                );
                ui.end_row();

                ui.label("J(A,B):");
                ui.add(
                    egui::DragValue::new(&mut self.params.j01)
                        .speed(0.05)
                        .fixed_decimals(2),
                );
                ui.end_row();

                ui.label("J(B,B):");
                ui.add(
                    egui::DragValue::new(&mut self.params.j11)
                        .speed(0.05)
                        .fixed_decimals(2),
                );
                ui.end_row();

                ui.label("Composition A:");
                ui.add(
                    egui::DragValue::new(&mut self.params.c_a)
                        .clamp_range(0.01..=10.0)
                        .speed(0.05),
                );
                ui.end_row();

                ui.label("Composition B:");
                ui.add(
                    egui::DragValue::new(&mut self.params.c_b)
                        .clamp_range(0.01..=10.0)
                        .speed(0.05),
                );
                ui.end_row();

                ui.separator();
                ui.separator();
                ui.end_row();

                // Schedule
                ui.label("Schedule:");
                egui::ComboBox::from_id_source("schedule")
                    .selected_text(match self.params.schedule {
                        ScheduleKind::Linear => "linear",
                        ScheduleKind::Geometric => "geometric",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.params.schedule, ScheduleKind::Linear, "linear");
                        ui.selectable_value(
                            &mut self.params.schedule,
                            ScheduleKind::Geometric,
                            "geometric",
                        );
                    });
                ui.end_row();

                ui.label("Start temp:");
                ui.add(
                    egui::DragValue::new(&mut self.params.start_temp)
                        .clamp_range(0.01..=100.0)
                        .speed(0.1),
                );
                ui.end_row();

                ui.label("End temp:");
                ui.add_enabled(
                    self.params.schedule == ScheduleKind::Geometric,
                    egui::DragValue::new(&mut self.params.end_temp)
                        .clamp_range(0.01..=100.0)
                        .speed(0.05),
                );
                ui.end_row();

                ui.label("Temp steps:");
                ui.add(
                    egui::DragValue::new(&mut self.params.temp_steps)
                        .clamp_range(1..=500)
                        .speed(1),
                );
                ui.end_row();

                ui.separator();
                ui.separator();
                ui.end_row();

                // Sweep counts, passed through to the engine opaquely
                ui.label("Equilibration:");
                ui.add(
                    egui::DragValue::new(&mut self.params.equilibrium_sweeps)
                        .clamp_range(1..=10_000)
                        .speed(10),
                );
                ui.end_row();

                ui.label("Measurement:");
                ui.add(
                    egui::DragValue::new(&mut self.params.measurement_sweeps)
                        .clamp_range(1..=10_000)
                        .speed(10),
                );
                ui.end_row();

                ui.label("Samples/step:");
                ui.add(
                    egui::DragValue::new(&mut self.params.samples_per_step)
                        .clamp_range(1..=1_000)
                        .speed(1),
                );
                ui.end_row();

                ui.label("Fixed seed:");
                ui.horizontal(|ui| {
                    if ui.checkbox(&mut self.fixed_seed, "").changed() {
                        self.params.seed = self.fixed_seed.then_some(0);
                    }
                    if let Some(seed) = &mut self.params.seed {
                        ui.add(egui::DragValue::new(seed).speed(1));
                    }
                });
                ui.end_row();
            });
    }
}
