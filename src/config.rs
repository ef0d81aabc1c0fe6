//! Configuration system for thermolattice runs.
//!
//! Supports YAML configuration files with sensible defaults. Run parameters
//! are edited freely as [`RunParams`] and frozen into an immutable
//! [`RunConfiguration`] when a run starts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Lattice update rule family. A closed set: the engine recognizes exactly
/// these methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Kawasaki-style pair exchange
    MonteCarloSwap,
    /// Vacancy diffusion
    MoveVacancy,
}

impl Method {
    /// Engine-facing name, as passed to `make_zip` and recorded in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::MonteCarloSwap => "monte_carlo_swap",
            Method::MoveVacancy => "move_vacancy",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lattice edge length variant. Engines are sized at construction; these are
/// the five sizes the engine ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LatticeSize {
    XSmall,
    Small,
    Medium,
    Big,
    XBig,
}

impl LatticeSize {
    /// Edge length in cells
    pub fn cells(&self) -> u32 {
        match self {
            LatticeSize::XSmall => 16,
            LatticeSize::Small => 32,
            LatticeSize::Medium => 64,
            LatticeSize::Big => 128,
            LatticeSize::XBig => 256,
        }
    }

    /// Resolve a cell count to a size variant.
    ///
    /// An unrecognized count falls back to the default variant with a
    /// diagnostic instead of failing the run.
    pub fn from_cells(cells: u32) -> Self {
        match cells {
            16 => LatticeSize::XSmall,
            32 => LatticeSize::Small,
            64 => LatticeSize::Medium,
            128 => LatticeSize::Big,
            256 => LatticeSize::XBig,
            other => {
                log::warn!("unknown lattice size {other}, falling back to 64");
                LatticeSize::Medium
            }
        }
    }
}

/// Temperature schedule family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    /// Straight line from the start temperature down to zero
    Linear,
    /// Exponential decay from the start to the end temperature
    Geometric,
}

/// Errors raised when freezing run parameters into a [`RunConfiguration`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("temperature steps must be at least 1")]
    ZeroTempSteps,
    #[error("species compositions must sum to a positive value (got {0})")]
    NonPositiveComposition(f64),
    #[error("sweep counts must be at least 1")]
    ZeroSweeps,
    #[error("per-step sample budget must be at least 1")]
    ZeroSamples,
}

/// Editable run parameters, as stored in the config file and shown in the
/// settings panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParams {
    /// Update rule
    pub method: Method,
    /// Lattice edge length in cells (16, 32, 64, 128 or 256)
    pub lattice_cells: u32,
    /// Pairwise interaction energy between two A atoms
    pub j00: f32,
    /// Pairwise interaction energy between an A and a B atom
    pub j01: f32,
    /// Pairwise interaction energy between two B atoms
    pub j11: f32,
    /// Species A composition scalar (normalized against `c_b`)
    pub c_a: f64,
    /// Species B composition scalar
    pub c_b: f64,
    /// Schedule family
    pub schedule: ScheduleKind,
    /// First schedule temperature
    pub start_temp: f32,
    /// Last schedule temperature (geometric only)
    pub end_temp: f32,
    /// Number of temperature steps
    pub temp_steps: u32,
    /// Equilibration sweeps per temperature step
    pub equilibrium_sweeps: u32,
    /// Measurement sweeps per temperature step
    pub measurement_sweeps: u32,
    /// Cluster samples taken per temperature step
    pub samples_per_step: u32,
    /// RNG seed; random when omitted
    pub seed: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            method: Method::MoveVacancy,
            lattice_cells: 64,
            j00: 1.0,
            j01: 0.0,
            j11: 1.0,
            c_a: 1.0,
            c_b: 1.0,
            schedule: ScheduleKind::Geometric,
            start_temp: 8.0,
            end_temp: 0.5,
            temp_steps: 20,
            equilibrium_sweeps: 20,
            measurement_sweeps: 50,
            samples_per_step: 10,
            seed: None,
        }
    }
}

/// Immutable configuration for a single run.
///
/// Built from [`RunParams`] exactly once, when the run starts; selection
/// fields are resolved to closed variants here, never re-validated at use
/// sites.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub method: Method,
    pub lattice_size: LatticeSize,
    /// Engine energy table, `[j00, j01, j01, j11]`
    pub energies: [f32; 4],
    pub c_a: f64,
    pub c_b: f64,
    pub schedule: ScheduleKind,
    pub start_temp: f32,
    pub end_temp: f32,
    pub temp_steps: u32,
    pub equilibrium_sweeps: u32,
    pub measurement_sweeps: u32,
    pub samples_per_step: u32,
    pub seed: u64,
}

impl RunConfiguration {
    /// Freeze run parameters into an immutable configuration.
    pub fn from_params(params: &RunParams) -> Result<Self, ConfigError> {
        if params.temp_steps == 0 {
            return Err(ConfigError::ZeroTempSteps);
        }
        if params.c_a + params.c_b <= 0.0 {
            return Err(ConfigError::NonPositiveComposition(params.c_a + params.c_b));
        }
        if params.equilibrium_sweeps == 0 || params.measurement_sweeps == 0 {
            return Err(ConfigError::ZeroSweeps);
        }
        if params.samples_per_step == 0 {
            return Err(ConfigError::ZeroSamples);
        }

        Ok(Self {
            method: params.method,
            lattice_size: LatticeSize::from_cells(params.lattice_cells),
            energies: crate::engine::make_energies(params.j00, params.j01, params.j11),
            c_a: params.c_a,
            c_b: params.c_b,
            schedule: params.schedule,
            start_temp: params.start_temp,
            end_temp: params.end_temp,
            temp_steps: params.temp_steps,
            equilibrium_sweeps: params.equilibrium_sweeps,
            measurement_sweeps: params.measurement_sweeps,
            samples_per_step: params.samples_per_step,
            seed: params.seed.unwrap_or_else(rand::random),
        })
    }

    /// End temperature as passed to the engine's archive call: present only
    /// for the geometric schedule.
    pub fn end_temp_opt(&self) -> Option<f32> {
        match self.schedule {
            ScheduleKind::Linear => None,
            ScheduleKind::Geometric => Some(self.end_temp),
        }
    }
}

/// Playback pacing for the lattice animation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Total presentation duration of a full run, seconds
    pub total_secs: f32,
    /// Target interval between frames, seconds
    pub frame_interval: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            total_secs: 10.0,
            frame_interval: 0.1,
        }
    }
}

/// Export destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory archives and animations are written to
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunParams,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.run.temp_steps == 0 {
            return Err("temp_steps must be > 0".to_string());
        }
        if self.playback.total_secs <= 0.0 || self.playback.frame_interval <= 0.0 {
            return Err("playback durations must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.run.lattice_cells, loaded.run.lattice_cells);
        assert_eq!(config.run.method, loaded.run.method);
    }

    #[test]
    fn test_freeze_default_params() {
        let cfg = RunConfiguration::from_params(&RunParams::default()).unwrap();
        assert_eq!(cfg.lattice_size, LatticeSize::Medium);
        assert_eq!(cfg.energies, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(cfg.end_temp_opt(), Some(0.5));
    }

    #[test]
    fn test_unknown_lattice_size_falls_back() {
        let mut params = RunParams::default();
        params.lattice_cells = 77;
        let cfg = RunConfiguration::from_params(&params).unwrap();
        assert_eq!(cfg.lattice_size, LatticeSize::Medium);
    }

    #[test]
    fn test_zero_temp_steps_rejected() {
        let mut params = RunParams::default();
        params.temp_steps = 0;
        assert!(matches!(
            RunConfiguration::from_params(&params),
            Err(ConfigError::ZeroTempSteps)
        ));
    }

    #[test]
    fn test_linear_schedule_has_no_end_temp() {
        let mut params = RunParams::default();
        params.schedule = ScheduleKind::Linear;
        let cfg = RunConfiguration::from_params(&params).unwrap();
        assert_eq!(cfg.end_temp_opt(), None);
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::MonteCarloSwap.as_str(), "monte_carlo_swap");
        assert_eq!(Method::MoveVacancy.as_str(), "move_vacancy");
    }
}
