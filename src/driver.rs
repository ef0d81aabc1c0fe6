//! Cooperative run driver.
//!
//! The driver owns the engine handle for one run and advances it one engine
//! call per scheduling tick, yielding control back to the host loop between
//! calls. A single engine call is atomic: it is never preempted and there is
//! no mid-step abort. The terminal analysis call is the barrier behind which
//! all derived telemetry reads are gated.

use crate::animation::EncodedAnimation;
use crate::config::RunConfiguration;
use crate::engine::memory::BufferReader;
use crate::engine::{self, Engine, EngineHandle};
use crate::schedule::{FrameBudget, ScheduleError, TemperatureSchedule};
use crate::telemetry::TelemetrySeries;

/// Driver state machine.
///
/// `Idle → Running(step) → Analyzing → Done`; `Cancelled` is reachable only
/// through [`SimulationDriver::cancel`] as part of full teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Constructed, not yet started
    Idle,
    /// Cooling; `step` is the next schedule index to execute
    Running { step: u32 },
    /// All steps done; the terminal analysis call is still outstanding
    Analyzing,
    /// Analysis returned; telemetry, animation and export are readable
    Done,
    /// Torn down before completion
    Cancelled,
}

impl DriverState {
    /// Whether the run-state gate permits starting a new run
    pub fn allows_new_run(&self) -> bool {
        matches!(
            self,
            DriverState::Idle | DriverState::Done | DriverState::Cancelled
        )
    }
}

/// What a single scheduling tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickEvent {
    /// Not started or already torn down; nothing happened
    Idle,
    /// One temperature step executed
    Stepped { step: u32, temp: f32 },
    /// The terminal analysis call returned
    Analyzed,
    /// The run is complete; nothing left to do
    Finished,
}

/// Drives one engine through one temperature schedule.
pub struct SimulationDriver {
    engine: EngineHandle,
    schedule: TemperatureSchedule,
    frames: FrameBudget,
    config: RunConfiguration,
    state: DriverState,
}

impl SimulationDriver {
    /// Build the schedule and a freshly sized engine for `config`.
    pub fn new(config: RunConfiguration, frames: FrameBudget) -> Result<Self, ScheduleError> {
        let schedule = TemperatureSchedule::generate(&config)?;
        let engine = engine::build(&config, &frames);
        Ok(Self {
            engine,
            schedule,
            frames,
            config,
            state: DriverState::Idle,
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    pub fn schedule(&self) -> &TemperatureSchedule {
        &self.schedule
    }

    pub fn frame_budget(&self) -> FrameBudget {
        self.frames
    }

    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> &mut dyn Engine {
        self.engine.as_mut()
    }

    /// Borrow-bounded views into the engine's shared memory.
    pub fn reader(&self) -> BufferReader<'_> {
        BufferReader::new(self.engine.as_ref())
    }

    /// Begin cooling. A no-op unless the driver is idle.
    pub fn start(&mut self) {
        if self.state == DriverState::Idle {
            self.state = DriverState::Running { step: 0 };
        }
    }

    /// Execute at most one atomic engine call, then return control.
    ///
    /// While running this performs exactly one `run_at_temp` call per tick;
    /// once the schedule is exhausted the next tick issues the single
    /// terminal analysis call and the run is done.
    pub fn tick(&mut self) -> TickEvent {
        match self.state {
            DriverState::Idle | DriverState::Cancelled => TickEvent::Idle,
            DriverState::Running { step } => {
                let temp = self.schedule.temp(step as usize);
                self.engine.run_at_temp(
                    self.config.equilibrium_sweeps,
                    self.config.measurement_sweeps,
                    temp,
                    self.frames.frames_per_step(),
                    self.config.samples_per_step,
                );
                log::debug!(
                    "step {}/{} at T={temp:.4}",
                    step + 1,
                    self.schedule.len()
                );

                let next = step + 1;
                self.state = if next as usize == self.schedule.len() {
                    DriverState::Analyzing
                } else {
                    DriverState::Running { step: next }
                };
                TickEvent::Stepped { step, temp }
            }
            DriverState::Analyzing => {
                self.engine.do_data_analysis();
                self.state = DriverState::Done;
                log::debug!("analysis complete, {} samples", self.engine.log_len());
                TickEvent::Analyzed
            }
            DriverState::Done => TickEvent::Finished,
        }
    }

    /// Completed fraction of the schedule, `step / (temp_steps - 1)`.
    pub fn progress(&self) -> f32 {
        let steps = self.schedule.len() as u32;
        match self.state {
            DriverState::Idle | DriverState::Cancelled => 0.0,
            DriverState::Running { step } => {
                if steps <= 1 {
                    // a single-step schedule has no meaningful fraction
                    0.0
                } else {
                    step as f32 / (steps - 1) as f32
                }
            }
            DriverState::Analyzing | DriverState::Done => 1.0,
        }
    }

    /// Whether ticking has anything left to do
    pub fn is_finished(&self) -> bool {
        matches!(self.state, DriverState::Done | DriverState::Cancelled)
    }

    /// Mark the run as torn down. The caller is expected to drop the driver
    /// (and with it the engine handle and all derived views) afterwards.
    pub fn cancel(&mut self) {
        if !matches!(self.state, DriverState::Done) {
            self.state = DriverState::Cancelled;
        }
    }

    /// Copy all telemetry series out of engine memory.
    ///
    /// Returns `None` until the terminal analysis call has returned: no
    /// derived read is valid before that barrier.
    pub fn telemetry(&self) -> Option<TelemetrySeries> {
        match self.state {
            DriverState::Done => Some(TelemetrySeries::collect(self.engine.as_ref())),
            _ => None,
        }
    }

    /// Copy the engine's encoded animation out of engine memory.
    ///
    /// Gated on completion like [`SimulationDriver::telemetry`].
    pub fn encoded_animation(&self) -> Option<EncodedAnimation> {
        match self.state {
            DriverState::Done => EncodedAnimation::fetch(self.engine.as_ref()),
            _ => None,
        }
    }
}
