//! Telemetry collection.
//!
//! After the terminal analysis call, every series the engine logs is copied
//! out of shared memory into owned, index-aligned vectors: index `i` in any
//! series refers to the same completed temperature step, with
//! `temperature[i]` as that step's sampling temperature.

use std::io::{self, Write};

use crate::engine::memory::BufferReader;
use crate::engine::{Engine, OrderStat, SeriesKind, Species};

/// Five order statistics of one species' cluster size distribution
#[derive(Debug, Clone, Default)]
pub struct ClusterStats {
    pub min: Vec<u32>,
    pub q1: Vec<u32>,
    pub mean: Vec<u32>,
    pub q3: Vec<u32>,
    pub max: Vec<u32>,
}

impl ClusterStats {
    fn collect(reader: &BufferReader<'_>, species: Species) -> Self {
        Self {
            min: reader.cluster_stat(species, OrderStat::Min).to_vec(),
            q1: reader.cluster_stat(species, OrderStat::Q1).to_vec(),
            mean: reader.cluster_stat(species, OrderStat::Mean).to_vec(),
            q3: reader.cluster_stat(species, OrderStat::Q3).to_vec(),
            max: reader.cluster_stat(species, OrderStat::Max).to_vec(),
        }
    }

    /// The five series in ascending order-statistic order
    pub fn as_rows(&self) -> [(&'static str, &[u32]); 5] {
        [
            ("min", &self.min),
            ("q1", &self.q1),
            ("mean", &self.mean),
            ("q3", &self.q3),
            ("max", &self.max),
        ]
    }
}

/// Owned copy of every per-step series of a completed run
#[derive(Debug, Clone, Default)]
pub struct TelemetrySeries {
    pub temperature: Vec<f32>,
    pub internal_energy: Vec<f32>,
    pub heat_capacity: Vec<f32>,
    pub entropy: Vec<f32>,
    pub free_energy: Vec<f32>,
    pub acceptance_rate: Vec<f32>,
    pub clusters_a: ClusterStats,
    pub clusters_b: ClusterStats,
}

impl TelemetrySeries {
    /// Eagerly copy all series out of engine memory.
    ///
    /// Must only be called after the terminal analysis has returned; the
    /// driver enforces that by gating access on its `Done` state.
    pub fn collect(engine: &dyn Engine) -> Self {
        let reader = BufferReader::new(engine);
        let series = Self {
            temperature: reader.series(SeriesKind::Temperature).to_vec(),
            internal_energy: reader.series(SeriesKind::InternalEnergy).to_vec(),
            heat_capacity: reader.series(SeriesKind::HeatCapacity).to_vec(),
            entropy: reader.series(SeriesKind::Entropy).to_vec(),
            free_energy: reader.series(SeriesKind::FreeEnergy).to_vec(),
            acceptance_rate: reader.series(SeriesKind::AcceptanceRate).to_vec(),
            clusters_a: ClusterStats::collect(&reader, Species::A),
            clusters_b: ClusterStats::collect(&reader, Species::B),
        };
        debug_assert!(series.is_aligned());
        series
    }

    /// Number of completed temperature steps
    pub fn len(&self) -> usize {
        self.temperature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }

    /// Whether every series has the same length
    pub fn is_aligned(&self) -> bool {
        let len = self.len();
        [
            self.internal_energy.len(),
            self.heat_capacity.len(),
            self.entropy.len(),
            self.free_energy.len(),
            self.acceptance_rate.len(),
        ]
        .iter()
        .all(|&l| l == len)
            && [&self.clusters_a, &self.clusters_b]
                .iter()
                .all(|c| c.as_rows().iter().all(|(_, row)| row.len() == len))
    }

    /// Write the scalar series as CSV, one row per completed step.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(
            out,
            "temperature,internal_energy,heat_capacity,entropy,free_energy,acceptance_rate"
        )?;
        for i in 0..self.len() {
            writeln!(
                out,
                "{},{},{},{},{},{}",
                self.temperature[i],
                self.internal_energy[i],
                self.heat_capacity[i],
                self.entropy[i],
                self.free_energy[i],
                self.acceptance_rate[i],
            )?;
        }
        Ok(())
    }
}
