//! thermolattice - CLI entry point
//!
//! Headless annealing runs, schedule previews and config scaffolding.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use thermolattice::config::{Config, RunConfiguration};
use thermolattice::driver::{SimulationDriver, TickEvent};
use thermolattice::export::ExportPackager;
use thermolattice::schedule::{FrameBudget, TemperatureSchedule};

#[derive(Parser)]
#[command(name = "thermolattice")]
#[command(version)]
#[command(about = "Annealing front end for lattice Monte Carlo thermodynamic models")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full annealing schedule headless and export the archive
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Output directory for the archive and animation
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the update method
        #[arg(short, long, value_enum)]
        method: Option<thermolattice::config::Method>,

        /// Override the number of temperature steps
        #[arg(short, long)]
        steps: Option<u32>,

        /// Override the lattice edge length in cells
        #[arg(short, long)]
        lattice: Option<u32>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the temperature schedule for the current configuration
    Schedule {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            method,
            steps,
            lattice,
            seed,
            quiet,
        } => run_anneal(config, output, RunOverrides { method, steps, lattice, seed }, quiet),
        Commands::Schedule { config } => print_schedule(config),
        Commands::Init { output } => generate_config(output),
    }
}

/// Load configuration from a file, falling back to defaults
fn load_config(path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        println!("Loading config from: {:?}", path);
        Config::from_file(path)
    } else {
        println!("Using default configuration");
        Ok(Config::default())
    }
}

/// Command line overrides applied on top of the config file
struct RunOverrides {
    method: Option<thermolattice::config::Method>,
    steps: Option<u32>,
    lattice: Option<u32>,
    seed: Option<u64>,
}

fn run_anneal(
    config_path: PathBuf,
    output: Option<PathBuf>,
    overrides: RunOverrides,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&config_path)?;
    if let Some(method) = overrides.method {
        config.run.method = method;
    }
    if let Some(steps) = overrides.steps {
        config.run.temp_steps = steps;
    }
    if let Some(cells) = overrides.lattice {
        config.run.lattice_cells = cells;
    }
    if let Some(s) = overrides.seed {
        println!("Using seed: {}", s);
        config.run.seed = Some(s);
    }
    let output_dir = output.unwrap_or_else(|| config.export.output_dir.clone());

    let run_config = RunConfiguration::from_params(&config.run)?;
    let frames = FrameBudget::derive(
        config.playback.total_secs,
        config.playback.frame_interval,
        run_config.temp_steps,
    );

    println!("Starting annealing run");
    println!(
        "  Lattice: {0} x {0}",
        run_config.lattice_size.cells()
    );
    println!("  Method: {}", run_config.method);
    println!("  Temperature steps: {}", run_config.temp_steps);
    println!();

    let mut driver = SimulationDriver::new(run_config, frames)?;
    driver.start();

    let start = Instant::now();
    loop {
        match driver.tick() {
            TickEvent::Stepped { step, temp } => {
                if !quiet {
                    println!(
                        "  step {:>4}/{} T={:.4} ({:>5.1}%)",
                        step + 1,
                        driver.schedule().len(),
                        temp,
                        driver.progress() * 100.0
                    );
                }
            }
            TickEvent::Analyzed => break,
            TickEvent::Idle | TickEvent::Finished => break,
        }
    }
    let elapsed = start.elapsed();

    let telemetry = driver.telemetry().expect("run just completed");

    println!();
    println!("=== Run Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Samples: {}", telemetry.len());
    if let (Some(first), Some(last)) = (telemetry.temperature.first(), telemetry.temperature.last())
    {
        println!("Temperature: {:.3} -> {:.3}", first, last);
    }

    let packager = ExportPackager::new(&output_dir);
    let archive = packager.export_archive(&mut driver)?;
    println!("Archive: {:?}", archive);
    let encoded = driver.encoded_animation().ok_or("no animation recorded")?;
    let animation = packager.export_animation(&encoded)?;
    println!("Animation: {:?}", animation);

    Ok(())
}

fn print_schedule(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    let run_config = RunConfiguration::from_params(&config.run)?;
    let schedule = TemperatureSchedule::generate(&run_config)?;

    println!("=== Temperature Schedule ===");
    println!("Kind: {:?}", run_config.schedule);
    println!("Steps: {}", schedule.len());
    for (i, temp) in schedule.temps().iter().enumerate() {
        println!("  {:>4}: {:.4}", i, temp);
    }

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
