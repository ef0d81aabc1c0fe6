//! Deterministic reference implementation of the [`Engine`] contract.
//!
//! Used by the CLI, the GUI and the test suite. It honors every observable
//! obligation of the contract (one telemetry sample and `frames` snapshots
//! appended per step, derived series materialized by the terminal analysis,
//! the archive lifecycle, the pointer-validity rules) while generating
//! synthetic lattice churn and smooth synthetic telemetry. It does not model
//! the real engine's physics.

use std::borrow::Cow;
use std::io::{Cursor, Write};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use zip::write::{FileOptions, ZipWriter};

use crate::config::Method;

use super::{Engine, OrderStat, SeriesKind, Species};

/// Cheap bound on churn work per step so oversized sweep counts stay snappy
const MAX_MOVES_PER_STEP: u64 = 1_000_000;

pub struct SyntheticEngine {
    size: u32,
    method: Method,
    c_a: f32,
    c_b: f32,
    samples_per_temp: u32,
    gif_delay: u16,
    rng: ChaCha8Rng,

    lattice: Vec<u8>,
    start_frame: Vec<u8>,
    anim: Vec<u8>,
    encoder: gif::Encoder<Vec<u8>>,

    temp: Vec<f32>,
    int_energy: Vec<f32>,
    heat_capacity: Vec<f32>,
    acceptance_rate: Vec<f32>,
    entropy: Vec<f32>,
    free_energy: Vec<f32>,
    cluster_stats_a: [Vec<u32>; 5],
    cluster_stats_b: [Vec<u32>; 5],

    zip_data: Option<Vec<u8>>,
}

impl SyntheticEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        size: u32,
        energies: [f32; 4],
        c_a: f64,
        c_b: f64,
        method: Method,
        log_capacity: u32,
        gif_delay: u16,
        samples_per_temp: u32,
        seed: u64,
    ) -> Self {
        // The energy table shapes the real engine's dynamics; the synthetic
        // lattice only folds it into the seed so runs stay deterministic.
        let seed = energies
            .iter()
            .fold(seed, |acc, e| acc ^ (e.to_bits() as u64));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let sites = (size * size) as usize;
        let frac_a = (c_a / (c_a + c_b)) as f32;
        let count_a = ((sites as f32) * frac_a).round() as usize;
        let mut lattice = vec![0u8; sites];
        for cell in lattice.iter_mut().skip(count_a) {
            *cell = 1;
        }
        lattice.shuffle(&mut rng);

        let capacity = log_capacity as usize;
        let encoder = prepare_encoder(size);

        Self {
            size,
            method,
            c_a: frac_a,
            c_b: 1.0 - frac_a,
            samples_per_temp,
            gif_delay,
            rng,
            start_frame: lattice.clone(),
            lattice,
            anim: Vec::new(),
            encoder,
            temp: Vec::with_capacity(capacity),
            int_energy: Vec::with_capacity(capacity),
            heat_capacity: Vec::with_capacity(capacity),
            acceptance_rate: Vec::with_capacity(capacity),
            entropy: Vec::with_capacity(capacity),
            free_energy: Vec::with_capacity(capacity),
            cluster_stats_a: Default::default(),
            cluster_stats_b: Default::default(),
            zip_data: None,
        }
    }

    fn sites(&self) -> usize {
        (self.size * self.size) as usize
    }

    /// One synthetic lattice move; returns whether it was accepted.
    fn churn_once(&mut self, temp: f32) -> bool {
        let sites = self.sites();
        let i = self.rng.gen_range(0..sites);
        let j = neighbor(i, self.size);
        if self.lattice[i] == self.lattice[j] {
            return false;
        }
        if self.method == Method::MoveVacancy && self.lattice[i] != 1 && self.lattice[j] != 1 {
            return false;
        }
        let p = temp / (1.0 + temp);
        if self.rng.gen::<f32>() < p {
            self.lattice.swap(i, j);
            true
        } else {
            false
        }
    }

    fn record_frame(&mut self) {
        self.anim.extend_from_slice(&self.lattice);
        let frame = gif::Frame {
            width: self.size as u16,
            height: self.size as u16,
            buffer: Cow::Borrowed(&self.lattice),
            delay: self.gif_delay,
            ..gif::Frame::default()
        };
        self.encoder
            .write_frame(&frame)
            .expect("gif should be writable");
    }

    fn make_run_params(
        &self,
        method: &str,
        temp_steps: u32,
        start_temp: f32,
        end_temp: Option<f32>,
        equilibrium_sweeps: u32,
        measurement_sweeps: u32,
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        writeln!(buf, "Lattice Size: {}", self.size).expect("params buffer");
        writeln!(buf, "Method: {}", method).expect("params buffer");
        writeln!(buf, "Composition A: {}, Composition B: {}", self.c_a, self.c_b)
            .expect("params buffer");
        writeln!(buf, "Temperature Steps: {}", temp_steps).expect("params buffer");
        match end_temp {
            Some(end) => writeln!(buf, "Start Temperature: {}, End Temperature: {}", start_temp, end)
                .expect("params buffer"),
            None => writeln!(buf, "Start Temperature: {}", start_temp).expect("params buffer"),
        }
        writeln!(buf, "Sweeps for Equilibrium: {}", equilibrium_sweeps).expect("params buffer");
        writeln!(buf, "Sweeps for Measurement: {}", measurement_sweeps).expect("params buffer");
        buf
    }

    fn make_csv_buffer(&self) -> Vec<u8> {
        let mut csv = Vec::new();
        writeln!(
            csv,
            "temperature,internal_energy,heat_capacity,acceptance_rate,entropy,free_energy"
        )
        .expect("csv buffer");
        for i in 0..self.temp.len() {
            writeln!(
                csv,
                "{},{},{},{},{},{}",
                self.temp[i],
                self.int_energy[i],
                self.heat_capacity[i],
                self.acceptance_rate[i],
                self.entropy[i],
                self.free_energy[i],
            )
            .expect("csv buffer");
        }
        csv
    }
}

// SAFETY: all pointer accessors return pointers into Vecs owned by self,
// paired with the lengths the contract advertises; derived series are kept
// sized to log_len with placeholders until the analysis pass fills them, so
// every advertised (pointer, length) pair is readable at all times between
// `&mut self` calls.
unsafe impl Engine for SyntheticEngine {
    fn width(&self) -> u32 {
        self.size
    }

    fn height(&self) -> u32 {
        self.size
    }

    fn anim_len(&self) -> u32 {
        (self.anim.len() / self.sites()) as u32
    }

    fn log_len(&self) -> u32 {
        self.temp.len() as u32
    }

    fn run_at_temp(
        &mut self,
        equilibrium_sweeps: u32,
        measurement_sweeps: u32,
        temp: f32,
        frames: u32,
        samples: u32,
    ) {
        self.start_frame.copy_from_slice(&self.lattice);
        self.temp.push(temp);

        let moves = ((equilibrium_sweeps + measurement_sweeps) as u64 * self.size as u64)
            .min(MAX_MOVES_PER_STEP);
        let frames = frames.max(1) as u64;
        let chunk = (moves / frames).max(1);

        let mut accepted = 0u64;
        let mut attempted = 0u64;
        let mut recorded = 0u64;
        let mut done = 0u64;
        while done < moves {
            let end = (done + chunk).min(moves);
            for _ in done..end {
                attempted += 1;
                if self.churn_once(temp) {
                    accepted += 1;
                }
            }
            done = end;
            if recorded < frames {
                self.record_frame();
                recorded += 1;
            }
        }
        while recorded < frames {
            self.record_frame();
            recorded += 1;
        }

        let damp = 1.0 / (samples.max(1) as f32).sqrt();
        let jitter = (self.rng.gen::<f32>() - 0.5) * 0.02 * damp;
        self.int_energy
            .push(-1.0 + 0.8 * (-1.0 / temp.max(f32::MIN_POSITIVE)).exp() + jitter);
        let bump = (-(temp - 2.2) * (temp - 2.2) / 0.98).exp();
        self.heat_capacity.push(0.1 + 1.5 * bump + jitter.abs());
        self.acceptance_rate
            .push(accepted as f32 / attempted.max(1) as f32);

        // Placeholders; the analysis pass overwrites these in place. They
        // keep every series pointer valid for log_len elements at all times.
        self.entropy.push(0.0);
        self.free_energy.push(0.0);
        for stat in self.cluster_stats_a.iter_mut() {
            stat.push(0);
        }
        for stat in self.cluster_stats_b.iter_mut() {
            stat.push(0);
        }
    }

    fn do_data_analysis(&mut self) {
        let steps = self.temp.len();
        if steps == 0 {
            return;
        }

        // Entropy: ideal mixing entropy at the hot end, then a trapezoid
        // integration of heat_capacity / temperature down the schedule.
        let ideal = -(self.c_a.max(f32::MIN_POSITIVE).ln() * self.c_a
            + self.c_b.max(f32::MIN_POSITIVE).ln() * self.c_b);
        self.entropy[0] = ideal;
        for i in 1..steps {
            let avg = (self.heat_capacity[i] / self.temp[i]
                + self.heat_capacity[i - 1] / self.temp[i - 1])
                / 2.0;
            let last = self.entropy[i - 1];
            self.entropy[i] = if avg.is_finite() {
                last + (self.temp[i] - self.temp[i - 1]) * avg
            } else {
                last
            };
        }

        for i in 0..steps {
            self.free_energy[i] = self.int_energy[i] - self.temp[i] * self.entropy[i];
        }

        // Cluster-size order statistics: mean block size grows as the
        // lattice cools, the spread is fixed multiples of the mean.
        let sites = self.sites() as f32;
        let damp = 1.0 / (self.samples_per_temp as f32).sqrt();
        for i in 0..steps {
            let t = self.temp[i];
            for (frac, stats) in [
                (self.c_a, &mut self.cluster_stats_a),
                (self.c_b, &mut self.cluster_stats_b),
            ] {
                let jitter = 1.0 + (self.rng.gen::<f32>() - 0.5) * 0.1 * damp;
                let mean = (sites * frac / (1.0 + 3.0 * t) * jitter).max(1.0);
                let spread = [0.125, 0.5, 1.0, 1.6, 3.0];
                for (vec, factor) in stats.iter_mut().zip(spread) {
                    vec[i] = (mean * factor).round().max(1.0) as u32;
                }
            }
        }
    }

    fn series_ptr(&self, kind: SeriesKind) -> *const f32 {
        match kind {
            SeriesKind::Temperature => self.temp.as_ptr(),
            SeriesKind::InternalEnergy => self.int_energy.as_ptr(),
            SeriesKind::HeatCapacity => self.heat_capacity.as_ptr(),
            SeriesKind::Entropy => self.entropy.as_ptr(),
            SeriesKind::FreeEnergy => self.free_energy.as_ptr(),
            SeriesKind::AcceptanceRate => self.acceptance_rate.as_ptr(),
        }
    }

    fn cluster_stat_ptr(&self, species: Species, stat: OrderStat) -> *const u32 {
        let stats = match species {
            Species::A => &self.cluster_stats_a,
            Species::B => &self.cluster_stats_b,
        };
        let idx = match stat {
            OrderStat::Min => 0,
            OrderStat::Q1 => 1,
            OrderStat::Mean => 2,
            OrderStat::Q3 => 3,
            OrderStat::Max => 4,
        };
        stats[idx].as_ptr()
    }

    fn anim_ptr(&self) -> *const u8 {
        self.anim.as_ptr()
    }

    fn start_frame_ptr(&self) -> *const u8 {
        self.start_frame.as_ptr()
    }

    fn frame_ptr(&self, frame: u32) -> *const u8 {
        let offset = frame as usize * self.sites();
        self.anim[offset..].as_ptr()
    }

    fn gif_ptr(&self) -> *const u8 {
        self.encoder.get_ref().as_ptr()
    }

    fn gif_len(&self) -> u32 {
        self.encoder.get_ref().len() as u32
    }

    fn make_zip(
        &mut self,
        method: &str,
        temp_steps: u32,
        start_temp: f32,
        end_temp: Option<f32>,
        equilibrium_sweeps: u32,
        measurement_sweeps: u32,
    ) {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o755);

        zip.start_file("animation.gif", options)
            .expect("error creating zip");
        zip.write_all(self.encoder.get_ref())
            .expect("error creating zip");

        zip.start_file("telemetry.csv", options)
            .expect("error creating zip");
        zip.write_all(&self.make_csv_buffer())
            .expect("error creating zip");

        zip.start_file("run_params.txt", options)
            .expect("error creating zip");
        zip.write_all(&self.make_run_params(
            method,
            temp_steps,
            start_temp,
            end_temp,
            equilibrium_sweeps,
            measurement_sweeps,
        ))
        .expect("error creating zip");

        self.zip_data = Some(zip.finish().expect("error creating zip").into_inner());
    }

    fn zip_ptr(&self) -> *const u8 {
        self.zip_data
            .as_ref()
            .map_or(std::ptr::null(), |data| data.as_ptr())
    }

    fn zip_len(&self) -> u32 {
        self.zip_data.as_ref().map_or(0, |data| data.len() as u32)
    }

    fn destroy_zip_data(&mut self) {
        self.zip_data = None;
    }
}

/// Right-or-down neighbor with wrap-around
fn neighbor(i: usize, size: u32) -> usize {
    let size = size as usize;
    let sites = size * size;
    let (row, col) = (i / size, i % size);
    if (row + col) % 2 == 0 {
        row * size + (col + 1) % size
    } else {
        ((row + 1) * size) % sites + col
    }
}

fn prepare_encoder(size: u32) -> gif::Encoder<Vec<u8>> {
    let mut palette = super::PALETTE.to_vec();
    // GIF palettes are sized in powers of two
    palette.resize(4 * 3, 0);
    let mut encoder = gif::Encoder::new(Vec::new(), size as u16, size as u16, &palette)
        .expect("gif encoder on a Vec cannot fail");
    encoder
        .set_repeat(gif::Repeat::Infinite)
        .expect("gif encoder on a Vec cannot fail");
    encoder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::BufferReader;

    fn engine() -> SyntheticEngine {
        SyntheticEngine::new(
            16,
            [1.0, 0.0, 0.0, 1.0],
            1.0,
            1.0,
            Method::MonteCarloSwap,
            8,
            10,
            4,
            7,
        )
    }

    #[test]
    fn test_composition_fills_lattice() {
        let engine = SyntheticEngine::new(
            32,
            [1.0, 0.0, 0.0, 1.0],
            3.0,
            1.0,
            Method::MoveVacancy,
            4,
            10,
            4,
            1,
        );
        let b_count = engine.lattice.iter().filter(|&&c| c == 1).count();
        assert_eq!(b_count, 256); // a quarter of 1024 sites
    }

    #[test]
    fn test_each_step_appends_one_sample_and_frames() {
        let mut engine = engine();
        engine.run_at_temp(2, 4, 4.0, 3, 4);
        assert_eq!(engine.log_len(), 1);
        assert_eq!(engine.anim_len(), 3);

        engine.run_at_temp(2, 4, 2.0, 3, 4);
        assert_eq!(engine.log_len(), 2);
        assert_eq!(engine.anim_len(), 6);
    }

    #[test]
    fn test_derived_series_filled_by_analysis() {
        let mut engine = engine();
        engine.run_at_temp(2, 4, 4.0, 1, 4);
        engine.run_at_temp(2, 4, 2.0, 1, 4);

        {
            let reader = BufferReader::new(&engine);
            assert_eq!(reader.series(SeriesKind::Entropy), &[0.0, 0.0]);
        }

        engine.do_data_analysis();
        let reader = BufferReader::new(&engine);
        let entropy = reader.series(SeriesKind::Entropy);
        assert!(entropy[0] > 0.0); // ideal mixing entropy of a 50/50 lattice
        let min = reader.cluster_stat(Species::A, OrderStat::Min);
        let max = reader.cluster_stat(Species::A, OrderStat::Max);
        for i in 0..2 {
            assert!(min[i] >= 1);
            assert!(min[i] <= max[i]);
        }
    }

    #[test]
    fn test_cluster_stats_ordered() {
        let mut engine = engine();
        for temp in [4.0, 2.0, 1.0] {
            engine.run_at_temp(2, 4, temp, 1, 4);
        }
        engine.do_data_analysis();

        let reader = BufferReader::new(&engine);
        for species in [Species::A, Species::B] {
            let ordered: Vec<&[u32]> = OrderStat::ALL
                .iter()
                .map(|&s| reader.cluster_stat(species, s))
                .collect();
            for i in 0..3 {
                for pair in ordered.windows(2) {
                    assert!(pair[0][i] <= pair[1][i]);
                }
            }
        }
    }

    #[test]
    fn test_determinism_per_seed() {
        let run = |seed| {
            let mut e = SyntheticEngine::new(
                16,
                [1.0, 0.0, 0.0, 1.0],
                1.0,
                1.0,
                Method::MonteCarloSwap,
                4,
                10,
                4,
                seed,
            );
            e.run_at_temp(2, 4, 3.0, 2, 4);
            e.run_at_temp(2, 4, 1.5, 2, 4);
            e.do_data_analysis();
            (e.anim.clone(), e.acceptance_rate.clone(), e.entropy.clone())
        };
        assert_eq!(run(5), run(5));
        assert_ne!(run(5).0, run(6).0);
    }

    #[test]
    fn test_gif_grows_with_frames() {
        let mut engine = engine();
        let before = engine.gif_len();
        engine.run_at_temp(1, 1, 2.0, 4, 1);
        assert!(engine.gif_len() > before);
    }

    #[test]
    fn test_archive_lifecycle() {
        let mut engine = engine();
        engine.run_at_temp(1, 1, 2.0, 1, 1);
        engine.do_data_analysis();

        assert_eq!(engine.zip_len(), 0);
        engine.make_zip("monte_carlo_swap", 1, 2.0, None, 1, 1);
        assert!(engine.zip_len() > 0);
        let first: Vec<u8> = BufferReader::new(&engine).archive().unwrap().to_vec();

        engine.destroy_zip_data();
        assert_eq!(engine.zip_len(), 0);
        assert!(BufferReader::new(&engine).archive().is_none());

        // A rebuilt archive with different parameters must not alias the
        // previous bytes.
        engine.make_zip("monte_carlo_swap", 7, 9.0, Some(0.25), 3, 5);
        let second = BufferReader::new(&engine).archive().unwrap();
        assert!(engine.zip_len() > 0);
        assert_ne!(first, second);
    }
}
