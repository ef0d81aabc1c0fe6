//! Telemetry chart panels.

use egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::telemetry::{ClusterStats, TelemetrySeries};

/// Chart panels for a completed run.
///
/// A pure function of the collected telemetry: every call redraws the panels
/// from scratch, so re-invocation replaces the previous rendering.
#[derive(Default)]
pub struct ChartsPanel;

impl ChartsPanel {
    pub fn new() -> Self {
        Self
    }

    /// Render all chart panels
    pub fn show(&self, ui: &mut Ui, telemetry: &TelemetrySeries) {
        let temps = &telemetry.temperature;

        scalar_chart(
            ui,
            "Internal Energy",
            temps,
            &telemetry.internal_energy,
            Color32::LIGHT_BLUE,
            true,
        );
        scalar_chart(
            ui,
            "Heat Capacity",
            temps,
            &telemetry.heat_capacity,
            Color32::LIGHT_RED,
            true,
        );
        scalar_chart(
            ui,
            "Acceptance Rate",
            temps,
            &telemetry.acceptance_rate,
            Color32::GREEN,
            false,
        );
        scalar_chart(ui, "Entropy", temps, &telemetry.entropy, Color32::GOLD, false);
        scalar_chart(
            ui,
            "Free Energy",
            temps,
            &telemetry.free_energy,
            Color32::LIGHT_GREEN,
            false,
        );

        cluster_chart(ui, "Cluster Sizes A", temps, &telemetry.clusters_a);
        cluster_chart(ui, "Cluster Sizes B", temps, &telemetry.clusters_b);
    }
}

/// One temperature-indexed line chart
fn scalar_chart(
    ui: &mut Ui,
    title: &str,
    temps: &[f32],
    values: &[f32],
    color: Color32,
    default_open: bool,
) {
    egui::CollapsingHeader::new(title)
        .default_open(default_open)
        .show(ui, |ui| {
            let points: PlotPoints = temps
                .iter()
                .zip(values)
                .map(|(&t, &v)| [t as f64, v as f64])
                .collect();
            let line = Line::new(points).color(color);

            Plot::new(title)
                .height(110.0)
                .show_axes(true)
                .show(ui, |plot_ui| {
                    plot_ui.line(line);
                });
        });
}

/// Min/Q1/mean/Q3/max envelope of one species' cluster sizes over temperature
fn cluster_chart(ui: &mut Ui, title: &str, temps: &[f32], stats: &ClusterStats) {
    const BAND_COLORS: [Color32; 5] = [
        Color32::DARK_GRAY,
        Color32::GRAY,
        Color32::WHITE,
        Color32::GRAY,
        Color32::DARK_GRAY,
    ];

    egui::CollapsingHeader::new(title)
        .default_open(false)
        .show(ui, |ui| {
            Plot::new(title)
                .height(130.0)
                .show_axes(true)
                .legend(Legend::default())
                .show(ui, |plot_ui| {
                    for ((name, row), color) in stats.as_rows().into_iter().zip(BAND_COLORS) {
                        let points: PlotPoints = temps
                            .iter()
                            .zip(row)
                            .map(|(&t, &v)| [t as f64, v as f64])
                            .collect();
                        plot_ui.line(Line::new(points).color(color).name(name));
                    }
                });
        });
}
