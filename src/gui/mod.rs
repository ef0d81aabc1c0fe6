//! GUI module for thermolattice.
//!
//! Provides a graphical front end for annealing runs using egui + eframe.
//!
//! ## Architecture
//!
//! Everything runs on the repaint loop, single threaded and cooperative:
//! each `update` performs at most one atomic engine call (one temperature
//! step, or the terminal analysis pass) and then requests another repaint.
//! The page stays responsive because control returns to egui between engine
//! calls, never because an engine call is interrupted.

mod app;
mod views;

pub use app::{run_gui, ThermoApp};
pub use views::{ChartsPanel, ControlPanel, LatticeView, SettingsPanel};
