//! Integration tests for thermolattice

use thermolattice::config::{RunConfiguration, RunParams, ScheduleKind};
use thermolattice::driver::{DriverState, SimulationDriver, TickEvent};
use thermolattice::engine::{Engine, OrderStat, SeriesKind, Species};
use thermolattice::export::ExportPackager;
use thermolattice::schedule::FrameBudget;

fn small_params(temp_steps: u32) -> RunParams {
    RunParams {
        lattice_cells: 16,
        temp_steps,
        equilibrium_sweeps: 2,
        measurement_sweeps: 4,
        samples_per_step: 2,
        seed: Some(12345),
        ..RunParams::default()
    }
}

fn run_to_completion(params: &RunParams) -> SimulationDriver {
    let config = RunConfiguration::from_params(params).expect("valid params");
    let frames = FrameBudget::derive(2.0, 0.1, config.temp_steps);
    let mut driver = SimulationDriver::new(config, frames).expect("valid schedule");
    driver.start();
    while !driver.is_finished() {
        driver.tick();
    }
    driver
}

#[test]
fn test_full_annealing_cycle() {
    let params = small_params(6);
    let driver = run_to_completion(&params);

    assert_eq!(driver.state(), DriverState::Done);
    assert_eq!(driver.engine().log_len(), 6);

    let telemetry = driver.telemetry().expect("run is done");
    assert!(telemetry.is_aligned());
    assert_eq!(telemetry.len(), 6);
    assert!(telemetry.len() <= params.temp_steps as usize);

    // temperatures decrease along the run
    for pair in telemetry.temperature.windows(2) {
        assert!(pair[0] > pair[1]);
    }
}

#[test]
fn test_frame_budget_honored() {
    let params = small_params(4);
    let driver = run_to_completion(&params);

    let frames = driver.frame_budget().frames_per_step();
    assert_eq!(driver.engine().anim_len(), frames * 4);

    // every recorded frame is one full lattice
    let reader = driver.reader();
    let total = reader.animation().len();
    assert_eq!(total, (16 * 16 * frames * 4) as usize);
}

#[test]
fn test_one_tick_one_engine_call() {
    let params = small_params(5);
    let config = RunConfiguration::from_params(&params).unwrap();
    let frames = FrameBudget::derive(2.0, 0.1, 5);
    let mut driver = SimulationDriver::new(config, frames).unwrap();
    driver.start();

    let mut steps = 0;
    loop {
        let logged_before = driver.engine().log_len();
        match driver.tick() {
            TickEvent::Stepped { .. } => {
                steps += 1;
                assert_eq!(driver.engine().log_len(), logged_before + 1);
            }
            TickEvent::Analyzed => {
                assert_eq!(driver.engine().log_len(), logged_before);
                break;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(steps, 5);
}

#[test]
fn test_second_run_invalidates_first() {
    let first = run_to_completion(&small_params(3));
    let first_telemetry = first.telemetry().unwrap();
    let first_anim_len = first.engine().anim_len();

    // starting a new run discards the previous handle wholesale
    drop(first);

    let mut params = small_params(5);
    params.seed = Some(999);
    let second = run_to_completion(&params);
    let second_telemetry = second.telemetry().unwrap();

    // nothing read through the new handle originates from the old run
    assert_eq!(second_telemetry.len(), 5);
    assert_ne!(first_telemetry.len(), second_telemetry.len());
    assert_ne!(first_anim_len, second.engine().anim_len());
    assert_ne!(
        first_telemetry.temperature.last(),
        second_telemetry.temperature.first()
    );
}

#[test]
fn test_single_temp_step_run() {
    let driver = run_to_completion(&small_params(1));
    let telemetry = driver.telemetry().unwrap();
    assert_eq!(telemetry.len(), 1);
    assert_eq!(telemetry.temperature[0], 8.0);
}

#[test]
fn test_linear_run_reaches_zero() {
    let mut params = small_params(5);
    params.schedule = ScheduleKind::Linear;
    let driver = run_to_completion(&params);
    let telemetry = driver.telemetry().unwrap();
    assert_eq!(telemetry.temperature.first(), Some(&8.0));
    assert_eq!(telemetry.temperature.last(), Some(&0.0));
}

#[test]
fn test_derived_series_only_after_analysis() {
    let params = small_params(3);
    let config = RunConfiguration::from_params(&params).unwrap();
    let frames = FrameBudget::derive(2.0, 0.1, 3);
    let mut driver = SimulationDriver::new(config, frames).unwrap();
    driver.start();

    driver.tick();
    driver.tick();
    driver.tick();
    assert_eq!(driver.state(), DriverState::Analyzing);
    assert!(driver.telemetry().is_none());

    // primary series exist per completed step even before the barrier
    let reader = driver.reader();
    assert_eq!(reader.series(SeriesKind::Temperature).len(), 3);
    assert_eq!(reader.series(SeriesKind::AcceptanceRate).len(), 3);

    driver.tick();
    let telemetry = driver.telemetry().unwrap();
    assert!(telemetry.entropy[0] > 0.0);
    assert_eq!(
        telemetry.clusters_a.mean.len(),
        telemetry.temperature.len()
    );
}

#[test]
fn test_cluster_stats_envelope() {
    let driver = run_to_completion(&small_params(4));
    let reader = driver.reader();
    for species in [Species::A, Species::B] {
        let min = reader.cluster_stat(species, OrderStat::Min);
        let q1 = reader.cluster_stat(species, OrderStat::Q1);
        let mean = reader.cluster_stat(species, OrderStat::Mean);
        let q3 = reader.cluster_stat(species, OrderStat::Q3);
        let max = reader.cluster_stat(species, OrderStat::Max);
        for i in 0..4 {
            assert!(min[i] <= q1[i]);
            assert!(q1[i] <= mean[i]);
            assert!(mean[i] <= q3[i]);
            assert!(q3[i] <= max[i]);
        }
    }
}

#[test]
fn test_archive_export_and_release() {
    let mut driver = run_to_completion(&small_params(2));

    let dir = std::env::temp_dir().join("thermolattice_integration_export");
    let _ = std::fs::remove_dir_all(&dir);

    let packager = ExportPackager::new(&dir);
    let path = packager.export_archive(&mut driver).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], b"PK\x03\x04");

    // the release call is mandatory and must have happened
    assert_eq!(driver.engine().zip_len(), 0);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_reproducibility_per_seed() {
    let a = run_to_completion(&small_params(4));
    let b = run_to_completion(&small_params(4));

    let ta = a.telemetry().unwrap();
    let tb = b.telemetry().unwrap();
    assert_eq!(ta.acceptance_rate, tb.acceptance_rate);
    assert_eq!(ta.entropy, tb.entropy);

    let ra = a.reader();
    let rb = b.reader();
    assert_eq!(ra.animation(), rb.animation());
}
