//! Performance benchmarks for thermolattice

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use thermolattice::config::{RunConfiguration, RunParams};
use thermolattice::driver::SimulationDriver;
use thermolattice::schedule::{FrameBudget, TemperatureSchedule};

fn benchmark_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule");

    for steps in [10u32, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("geometric", steps), steps, |b, &steps| {
            b.iter(|| TemperatureSchedule::geometric(8.0, 0.5, steps).unwrap());
        });
    }

    group.finish();
}

fn benchmark_driver_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("driver_tick");

    for cells in [16u32, 64].iter() {
        let params = RunParams {
            lattice_cells: *cells,
            temp_steps: 1000,
            equilibrium_sweeps: 5,
            measurement_sweeps: 10,
            samples_per_step: 2,
            seed: Some(42),
            ..RunParams::default()
        };
        let config = RunConfiguration::from_params(&params).unwrap();
        let frames = FrameBudget::derive(10.0, 0.1, params.temp_steps);
        let mut driver = SimulationDriver::new(config, frames).unwrap();
        driver.start();

        group.bench_with_input(BenchmarkId::new("lattice", cells), cells, |b, _| {
            b.iter(|| {
                if driver.is_finished() {
                    return;
                }
                driver.tick();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_schedule, benchmark_driver_tick);
criterion_main!(benches);
