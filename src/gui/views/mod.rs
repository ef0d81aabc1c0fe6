//! GUI view components.

mod charts_panel;
mod control_panel;
mod lattice_view;
mod settings_panel;

pub use charts_panel::ChartsPanel;
pub use control_panel::{AppCommand, ControlPanel};
pub use lattice_view::LatticeView;
pub use settings_panel::SettingsPanel;
