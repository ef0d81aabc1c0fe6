//! The simulation engine contract.
//!
//! The engine is an external collaborator: its physics, random numbers and
//! statistics are consumed only through this call surface. All bulk data is
//! exposed as raw (pointer, length) pairs into the engine's own memory;
//! [`memory::BufferReader`] is the only sanctioned way to look at it.

pub mod memory;
pub mod synthetic;

use crate::config::RunConfiguration;
use crate::schedule::FrameBudget;

/// Scalar telemetry series exposed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Temperature,
    InternalEnergy,
    HeatCapacity,
    Entropy,
    FreeEnergy,
    AcceptanceRate,
}

impl SeriesKind {
    /// All series, in export column order
    pub const ALL: [SeriesKind; 6] = [
        SeriesKind::Temperature,
        SeriesKind::InternalEnergy,
        SeriesKind::HeatCapacity,
        SeriesKind::Entropy,
        SeriesKind::FreeEnergy,
        SeriesKind::AcceptanceRate,
    ];
}

/// One of the two lattice species
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    A,
    B,
}

/// Order statistics of the per-species cluster size distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStat {
    Min,
    Q1,
    Mean,
    Q3,
    Max,
}

impl OrderStat {
    pub const ALL: [OrderStat; 5] = [
        OrderStat::Min,
        OrderStat::Q1,
        OrderStat::Mean,
        OrderStat::Q3,
        OrderStat::Max,
    ];
}

/// Call surface of one running simulation instance.
///
/// # Safety
///
/// Implementations guarantee the pointer contracts the orchestrator builds
/// views from:
///
/// - every pointer returned by a series accessor is valid for reads of
///   `log_len()` elements, at any time between engine calls (series that the
///   terminal analysis has not yet materialized read as placeholder values,
///   but the memory is valid);
/// - `anim_ptr()` is valid for `width() * height() * anim_len()` bytes,
///   `start_frame_ptr()` for `width() * height()` bytes, and
///   `frame_ptr(i)` for `width() * height()` bytes for any `i < anim_len()`;
/// - `gif_ptr()` is valid for `gif_len()` bytes and `zip_ptr()` for
///   `zip_len()` bytes (a zero length may be paired with a null pointer);
/// - pointers stay valid until the next `&mut self` call, which may relocate
///   or resize the backing memory and invalidates all of them.
pub unsafe trait Engine {
    /// Lattice width in cells
    fn width(&self) -> u32;
    /// Lattice height in cells
    fn height(&self) -> u32;
    /// Number of recorded animation frames
    fn anim_len(&self) -> u32;
    /// Number of completed temperature steps
    fn log_len(&self) -> u32;

    /// Advance one temperature step: equilibrate, measure, append one sample
    /// to every telemetry series and `frames` snapshots to the animation
    /// buffer. Atomic and unpreemptable; may take significant time.
    fn run_at_temp(
        &mut self,
        equilibrium_sweeps: u32,
        measurement_sweeps: u32,
        temp: f32,
        frames: u32,
        samples: u32,
    );

    /// Terminal analysis pass. Required exactly once, after the last step;
    /// no derived telemetry read is meaningful before it returns.
    fn do_data_analysis(&mut self);

    /// Pointer to a scalar telemetry series (`log_len()` elements)
    fn series_ptr(&self, kind: SeriesKind) -> *const f32;
    /// Pointer to a cluster-size order statistic series (`log_len()` elements)
    fn cluster_stat_ptr(&self, species: Species, stat: OrderStat) -> *const u32;

    /// Pointer to the full animation buffer, `[frame][row][col]` row-major
    fn anim_ptr(&self) -> *const u8;
    /// Pointer to the lattice state at the start of the most recent step
    fn start_frame_ptr(&self) -> *const u8;
    /// Pointer to recorded frame `frame`
    fn frame_ptr(&self, frame: u32) -> *const u8;

    /// Pointer to the encoded animation image
    fn gif_ptr(&self) -> *const u8;
    fn gif_len(&self) -> u32;

    /// Synthesize the downloadable archive from the run parameters
    fn make_zip(
        &mut self,
        method: &str,
        temp_steps: u32,
        start_temp: f32,
        end_temp: Option<f32>,
        equilibrium_sweeps: u32,
        measurement_sweeps: u32,
    );
    /// Pointer to the archive synthesized by [`Engine::make_zip`]
    fn zip_ptr(&self) -> *const u8;
    fn zip_len(&self) -> u32;
    /// Release the archive's backing memory. Mandatory after every download;
    /// skipping it leaks engine memory for the rest of the session.
    fn destroy_zip_data(&mut self);
}

/// Opaque handle to one running simulation instance. At most one is in
/// flight per session; starting a new run drops the previous handle and every
/// view derived from it.
pub type EngineHandle = Box<dyn Engine>;

/// Construct an engine sized by the configured lattice variant.
pub fn build(config: &RunConfiguration, frames: &FrameBudget) -> EngineHandle {
    Box::new(synthetic::SyntheticEngine::new(
        config.lattice_size.cells(),
        config.energies,
        config.c_a,
        config.c_b,
        config.method,
        config.temp_steps,
        frames.delay_cs(),
        config.samples_per_step,
        config.seed,
    ))
}

/// Two-species display palette, RGB triples indexed by species id
pub const PALETTE: &[u8] = &[
    230, 140, 20, // species A
    200, 40, 30, // species B
];

/// CSS-style color string for a species id
pub fn get_color(num: u8) -> String {
    let i = 3 * num as usize % PALETTE.len();
    format!("rgb({}, {}, {})", PALETTE[i], PALETTE[i + 1], PALETTE[i + 2])
}

/// RGB triple for a species id
pub fn species_rgb(num: u8) -> (u8, u8, u8) {
    let i = 3 * num as usize % PALETTE.len();
    (PALETTE[i], PALETTE[i + 1], PALETTE[i + 2])
}

/// Expand an interaction energy triple into the engine's pair table.
pub fn make_energies(j00: f32, j01: f32, j11: f32) -> [f32; 4] {
    [j00, j01, j01, j11]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_energies_symmetric() {
        let energies = make_energies(1.0, -0.5, 2.0);
        assert_eq!(energies, [1.0, -0.5, -0.5, 2.0]);
        assert_eq!(energies[1], energies[2]);
    }

    #[test]
    fn test_get_color_format() {
        assert_eq!(get_color(0), "rgb(230, 140, 20)");
        assert_eq!(get_color(1), "rgb(200, 40, 30)");
    }

    #[test]
    fn test_species_rgb_matches_palette() {
        assert_eq!(species_rgb(0), (230, 140, 20));
        assert_eq!(species_rgb(1), (200, 40, 30));
    }
}
