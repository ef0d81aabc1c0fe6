//! # thermolattice
//!
//! Annealing front end for lattice Monte Carlo thermodynamic models.
//!
//! The simulation engine itself is an external collaborator reached through
//! the [`engine::Engine`] contract; this crate is the orchestration layer
//! around it:
//!
//! - **Cooperative**: one atomic engine call per scheduling tick, with
//!   control yielded back to the host loop between temperature steps
//! - **Zero-copy**: engine memory is read through borrow-bounded views that
//!   cannot outlive the next engine call
//! - **Reproducible**: seeded runs over deterministic schedules
//! - **Configurable**: YAML configuration files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use thermolattice::config::{RunConfiguration, RunParams};
//! use thermolattice::driver::SimulationDriver;
//! use thermolattice::schedule::FrameBudget;
//!
//! let config = RunConfiguration::from_params(&RunParams::default()).unwrap();
//! let frames = FrameBudget::derive(10.0, 0.1, config.temp_steps);
//!
//! let mut driver = SimulationDriver::new(config, frames).unwrap();
//! driver.start();
//! while !driver.is_finished() {
//!     driver.tick(); // one temperature step (or the analysis pass) per tick
//! }
//!
//! let telemetry = driver.telemetry().unwrap();
//! println!("samples: {}", telemetry.len());
//! ```
//!
//! ## Schedules
//!
//! ```rust
//! use thermolattice::schedule::TemperatureSchedule;
//!
//! let linear = TemperatureSchedule::linear(8.0, 10);
//! assert_eq!(linear.temp(0), 8.0);
//!
//! // roughly [8.0, 4.0, 2.0, 1.0, 0.5]
//! let geometric = TemperatureSchedule::geometric(8.0, 0.5, 5).unwrap();
//! assert_eq!(geometric.len(), 5);
//! ```

pub mod animation;
pub mod config;
pub mod driver;
pub mod engine;
pub mod export;
pub mod schedule;
pub mod telemetry;

#[cfg(feature = "gui")]
pub mod gui;

// Re-export main types
pub use config::{Config, RunConfiguration};
pub use driver::{DriverState, SimulationDriver};
pub use telemetry::TelemetrySeries;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
