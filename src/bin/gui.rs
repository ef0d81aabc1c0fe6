//! thermolattice GUI entry point
//!
//! Run with: `cargo run --features gui --bin thermolattice-gui`

use thermolattice::config::Config;
use thermolattice::gui::run_gui;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config();

    log::info!("Starting thermolattice GUI");
    log::info!("Lattice: {0} x {0}", config.run.lattice_cells);
    log::info!("Temperature steps: {}", config.run.temp_steps);

    run_gui(config)
}

/// Load configuration from file or use default
fn load_config() -> Config {
    let paths = ["config.yaml", "thermolattice.yaml", "../config.yaml"];

    for path in paths {
        if let Ok(config) = Config::from_file(path) {
            log::info!("Loaded config from: {}", path);
            return config;
        }
    }

    log::info!("Using default configuration");
    Config::default()
}
