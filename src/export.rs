//! Archive export.
//!
//! The engine synthesizes the downloadable archive on demand from the run's
//! original configuration; the packager copies the bytes out, writes the
//! file, then issues the mandatory release call. Skipping the release leaks
//! engine-owned memory for the rest of the session.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::animation::EncodedAnimation;
use crate::driver::{DriverState, SimulationDriver};
use crate::engine::Engine;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("run is not finished; nothing to export")]
    RunNotFinished,
    #[error("engine returned an empty archive")]
    EmptyArchive,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Writes run archives and animations into one output directory.
pub struct ExportPackager {
    output_dir: PathBuf,
}

impl ExportPackager {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Timestamped file name for this run
    fn archive_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        self.output_dir.join(format!("thermo_run_{stamp}.zip"))
    }

    /// Build, download and release the archive for a completed run.
    ///
    /// One-shot sequence: `make_zip` from the original run configuration,
    /// copy the buffer out before any further engine call, write the file,
    /// then `destroy_zip_data`.
    pub fn export_archive(&self, driver: &mut SimulationDriver) -> Result<PathBuf, ExportError> {
        if driver.state() != DriverState::Done {
            return Err(ExportError::RunNotFinished);
        }

        let config = driver.config().clone();
        driver.engine_mut().make_zip(
            config.method.as_str(),
            config.temp_steps,
            config.start_temp,
            config.end_temp_opt(),
            config.equilibrium_sweeps,
            config.measurement_sweeps,
        );

        // copy out before the release call invalidates the view
        let bytes = driver.reader().archive().map(<[u8]>::to_vec);
        driver.engine_mut().destroy_zip_data();
        let bytes = bytes.ok_or(ExportError::EmptyArchive)?;

        fs::create_dir_all(&self.output_dir)?;
        let path = self.archive_path();
        fs::write(&path, &bytes)?;
        log::info!("archive written: {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Save an encoded animation next to the archives.
    pub fn export_animation(&self, animation: &EncodedAnimation) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.output_dir)?;
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = self.output_dir.join(format!("thermo_run_{stamp}.gif"));
        animation.save(&path)?;
        log::info!("animation written: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RunConfiguration, RunParams};
    use crate::schedule::FrameBudget;

    fn finished_driver() -> SimulationDriver {
        let params = RunParams {
            lattice_cells: 16,
            temp_steps: 2,
            equilibrium_sweeps: 1,
            measurement_sweeps: 2,
            samples_per_step: 1,
            seed: Some(17),
            ..RunParams::default()
        };
        let config = RunConfiguration::from_params(&params).unwrap();
        let mut driver =
            SimulationDriver::new(config, FrameBudget::derive(1.0, 0.1, 2)).unwrap();
        driver.start();
        while !driver.is_finished() {
            driver.tick();
        }
        driver
    }

    fn temp_output_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("thermolattice_test_{name}"));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_export_refused_while_running() {
        let params = RunParams {
            lattice_cells: 16,
            temp_steps: 3,
            equilibrium_sweeps: 1,
            measurement_sweeps: 2,
            samples_per_step: 1,
            seed: Some(17),
            ..RunParams::default()
        };
        let config = RunConfiguration::from_params(&params).unwrap();
        let mut driver =
            SimulationDriver::new(config, FrameBudget::derive(1.0, 0.1, 3)).unwrap();
        driver.start();
        driver.tick();

        let packager = ExportPackager::new(temp_output_dir("refused"));
        assert!(matches!(
            packager.export_archive(&mut driver),
            Err(ExportError::RunNotFinished)
        ));
    }

    #[test]
    fn test_archive_round_trip() {
        let mut driver = finished_driver();
        let dir = temp_output_dir("roundtrip");
        let packager = ExportPackager::new(&dir);

        let path = packager.export_archive(&mut driver).unwrap();
        let written = fs::read(&path).unwrap();
        assert!(!written.is_empty());
        // zip local file header magic
        assert_eq!(&written[..4], b"PK\x03\x04");

        // the engine-side buffer was released after the download
        assert_eq!(driver.engine().zip_len(), 0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_animation_export() {
        let driver = finished_driver();
        let dir = temp_output_dir("anim");
        let packager = ExportPackager::new(&dir);

        let animation = driver.encoded_animation().unwrap();
        let path = packager.export_animation(&animation).unwrap();
        let written = fs::read(&path).unwrap();
        assert_eq!(&written[..6], b"GIF89a");

        fs::remove_dir_all(&dir).ok();
    }
}
