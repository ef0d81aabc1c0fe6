//! Lattice grid visualization.

use egui::{Color32, Pos2, Rect, Sense, Ui, Vec2};

use crate::engine::species_rgb;

/// Lattice view rendering one frame of the two-species grid.
///
/// The whole grid is redrawn every frame; a cell holding species 0 gets the
/// first palette color, any nonzero value the second.
pub struct LatticeView {
    /// Zoom multiplier (1.0 = fit to window)
    zoom: f32,
}

impl Default for LatticeView {
    fn default() -> Self {
        Self { zoom: 1.0 }
    }
}

impl LatticeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one frame, `width * height` species ids, row-major.
    pub fn show(&mut self, ui: &mut Ui, frame: &[u8], width: u32, height: u32) {
        if frame.len() < (width * height) as usize {
            ui.label("No lattice data yet.");
            return;
        }

        let controls_height = 30.0;
        let available = ui.available_size() - Vec2::new(0.0, controls_height);

        // Square cells sized to fit the window
        let base_cell = (available.x / width as f32)
            .min(available.y / height as f32)
            .max(1.0);
        let cell_size = base_cell * self.zoom;
        let grid_size = Vec2::new(width as f32 * cell_size, height as f32 * cell_size);

        let offset = Vec2::new(
            ((available.x - grid_size.x) / 2.0).max(0.0),
            ((available.y - grid_size.y) / 2.0).max(0.0),
        );

        let (response, painter) = ui.allocate_painter(
            Vec2::new(grid_size.x.max(available.x), grid_size.y.max(available.y)),
            Sense::hover(),
        );
        let origin = response.rect.min + offset;

        let (ar, ag, ab) = species_rgb(0);
        let (br, bg, bb) = species_rgb(1);
        let color_a = Color32::from_rgb(ar, ag, ab);
        let color_b = Color32::from_rgb(br, bg, bb);

        for row in 0..height {
            for col in 0..width {
                let cell = frame[(row * width + col) as usize];
                let color = if cell == 0 { color_a } else { color_b };
                let rect = Rect::from_min_size(
                    Pos2::new(
                        origin.x + col as f32 * cell_size,
                        origin.y + row as f32 * cell_size,
                    ),
                    Vec2::splat(cell_size),
                );
                painter.rect_filled(rect, 0.0, color);
            }
        }

        ui.horizontal(|ui| {
            ui.add(egui::Slider::new(&mut self.zoom, 0.5..=3.0).text("Zoom"));
            if ui.button("Reset").clicked() {
                self.zoom = 1.0;
            }
            ui.label(format!("{width} × {height}"));
        });
    }
}
