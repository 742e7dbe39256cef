//! Restart decision loop that ties signals, cranking and reporting together.
//!
//! This module provides [`RestartController`], which owns the injected
//! hardware and the cross-tick [`ControllerState`].
//!
//! # Overview
//!
//! Every tick the controller:
//! - sleeps one polling interval
//! - samples the inputs and latches "engine has run" once it sees it
//! - cranks if the engine is armed, stopped, and the driver just released the
//!   brake (or idle-stop is overridden off)
//! - disarms after a crank that leaves the engine stopped
//! - reports the shift position to the idle-stop unit
//!
//! # Example
//!
//! ```rust
//! use eco_restart::{RestartController, TimingConfig, InputSample, Mode};
//! use eco_restart::hal::{MockDelay, MockOutputs, MockSignals, SimClock};
//!
//! let clock = SimClock::new();
//! // Engine runs for the first second, then stops with the brake held
//! let signals = MockSignals::scripted(&clock, |t| {
//!     InputSample::IDLE.with_engine_running(t <= 1000)
//! });
//! let mut controller = RestartController::new(
//!     signals,
//!     MockOutputs::with_clock(&clock),
//!     MockDelay::new(&clock),
//!     TimingConfig::default(),
//! );
//!
//! controller.boot().unwrap();
//! for _ in 0..20 {
//!     controller.tick().unwrap();
//! }
//!
//! // Armed, but no brake release happened, so no crank
//! assert_eq!(controller.status().mode, Mode::Armed);
//! assert_eq!(controller.status().cranks, 0);
//! ```

use embedded_hal::delay::DelayNs;
use heapless::Deque;
use log::{info, trace, warn};

use crate::config::TimingConfig;
use crate::cranking::{CrankReport, CrankSequencer};
use crate::reporter::ShiftReporter;
use crate::traits::{ControlOutputs, InputSample, ShiftSignal, SignalReader};

/// Number of crank attempts kept in the status history.
pub const CRANK_HISTORY_LEN: usize = 8;

/// Whether the controller may auto-restart the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mode {
    /// The engine has not been seen running since boot or the last failed
    /// restart.
    #[default]
    WaitingForManualStart,
    /// The engine has run; restarts are allowed.
    Armed,
}

impl Mode {
    /// Returns the mode as a snake_case string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Mode::WaitingForManualStart => "waiting_for_manual_start",
            Mode::Armed => "armed",
        }
    }
}

/// What caused a crank attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RestartTrigger {
    /// The brake went from depressed to released this tick.
    BrakeReleased,
    /// Idle-stop is overridden off while the engine is stopped.
    OverrideActive,
}

/// State carried between ticks.
///
/// Owned exclusively by the controller; usable on its own to test the
/// decision rules without hardware.
///
/// # Example
///
/// ```rust
/// use eco_restart::{ControllerState, InputSample, RestartTrigger};
///
/// let mut state = ControllerState::new(InputSample::IDLE);
///
/// // Engine seen running: armed
/// assert_eq!(state.observe(&InputSample::IDLE.with_engine_running(true)), None);
/// // Engine stops with brake held
/// assert_eq!(state.observe(&InputSample::IDLE), None);
/// // Driver releases the brake
/// let released = InputSample::IDLE.with_brake_released(true);
/// assert_eq!(state.observe(&released), Some(RestartTrigger::BrakeReleased));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerState {
    manual_start_achieved: bool,
    previous_sample: InputSample,
}

impl ControllerState {
    /// Fresh state at boot, with `initial` as the edge-detection baseline.
    pub const fn new(initial: InputSample) -> Self {
        Self {
            manual_start_achieved: false,
            previous_sample: initial,
        }
    }

    /// Fold in this tick's sample and decide whether to crank.
    ///
    /// Latches the manual-start flag, evaluates the trigger against the
    /// previous sample, then stores `sample` as the new baseline.
    pub fn observe(&mut self, sample: &InputSample) -> Option<RestartTrigger> {
        self.manual_start_achieved |= sample.engine_running;

        let trigger = if !self.manual_start_achieved || sample.engine_running {
            None
        } else if sample.brake_released_since(&self.previous_sample) {
            Some(RestartTrigger::BrakeReleased)
        } else if sample.disabled_override {
            Some(RestartTrigger::OverrideActive)
        } else {
            None
        };

        self.previous_sample = *sample;
        trigger
    }

    /// Apply the post-crank re-sample. Returns true if this disarmed the
    /// controller.
    pub fn record_crank_result(&mut self, engine_running: bool) -> bool {
        if engine_running {
            return false;
        }
        self.manual_start_achieved = false;
        true
    }

    /// True once the engine has been seen running.
    #[inline]
    pub fn manual_start_achieved(&self) -> bool {
        self.manual_start_achieved
    }

    /// Sample used for the next edge comparison.
    #[inline]
    pub fn previous_sample(&self) -> &InputSample {
        &self.previous_sample
    }

    /// Current mode.
    #[inline]
    pub fn mode(&self) -> Mode {
        if self.manual_start_achieved {
            Mode::Armed
        } else {
            Mode::WaitingForManualStart
        }
    }
}

/// One crank attempt as seen by the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrankRecord {
    /// Tick number the crank happened on (1-based).
    pub tick: u64,
    /// Why it fired.
    pub trigger: RestartTrigger,
    /// Sequencer summary.
    pub report: CrankReport,
    /// Engine-running line after the relay was released.
    pub restarted: bool,
}

/// Result of a single [`RestartController::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No crank this tick.
    Idle,
    /// A crank ran to completion.
    Cranked(CrankRecord),
}

impl TickOutcome {
    /// The crank record, if this tick cranked.
    #[inline]
    pub fn crank(&self) -> Option<&CrankRecord> {
        match self {
            TickOutcome::Idle => None,
            TickOutcome::Cranked(record) => Some(record),
        }
    }
}

/// Snapshot of controller state for logging and tests.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerStatus {
    /// Current mode.
    pub mode: Mode,
    /// Last sample the loop acted on.
    pub last_sample: InputSample,
    /// Last shift signal written.
    pub shift: ShiftSignal,
    /// Ticks completed since boot.
    pub ticks: u64,
    /// Crank attempts since boot.
    pub cranks: u32,
    /// Most recent crank attempts, oldest first.
    pub recent_cranks: heapless::Vec<CrankRecord, CRANK_HISTORY_LEN>,
}

/// Restart controller.
///
/// # Type Parameters
///
/// - `R`: input source ([`SignalReader`])
/// - `O`: relay and neutral outputs ([`ControlOutputs`])
/// - `D`: blocking delay ([`DelayNs`])
pub struct RestartController<R, O, D> {
    reader: R,
    outputs: O,
    delay: D,
    timing: TimingConfig,
    sequencer: CrankSequencer,
    reporter: ShiftReporter,
    state: ControllerState,
    last_sample: InputSample,
    shift: ShiftSignal,
    ticks: u64,
    cranks: u32,
    history: Deque<CrankRecord, CRANK_HISTORY_LEN>,
}

impl<R, O, D> RestartController<R, O, D>
where
    R: SignalReader,
    O: ControlOutputs,
    D: DelayNs,
{
    /// Create a controller. Takes the boot-time sample as the edge baseline.
    pub fn new(mut reader: R, outputs: O, delay: D, timing: TimingConfig) -> Self {
        let initial = reader.sample();
        Self {
            reader,
            outputs,
            delay,
            timing,
            sequencer: CrankSequencer::new(timing),
            reporter: ShiftReporter::new(),
            state: ControllerState::new(initial),
            last_sample: initial,
            shift: ShiftSignal::default(),
            ticks: 0,
            cranks: 0,
            history: Deque::new(),
        }
    }

    /// Report the shift position once before the first tick.
    pub fn boot(&mut self) -> Result<ShiftSignal, O::Error> {
        let sample = self.reader.sample();
        self.last_sample = sample;
        self.shift = self.reporter.report(&mut self.outputs, &sample)?;
        info!(
            "boot: shift={} timing={:?}",
            self.shift.as_str(),
            self.timing
        );
        Ok(self.shift)
    }

    /// Run one polling cycle.
    pub fn tick(&mut self) -> Result<TickOutcome, O::Error> {
        self.delay.delay_ms(self.timing.polling_interval_ms);
        self.ticks += 1;

        let sample = self.reader.sample();
        let trigger = self.state.observe(&sample);
        trace!("tick {}: {:?} mode={}", self.ticks, sample, self.state.mode().as_str());

        let mut report_sample = sample;
        let mut outcome = Ok(TickOutcome::Idle);

        if let Some(trigger) = trigger {
            info!("tick {}: restart triggered by {:?}", self.ticks, trigger);

            let result = self
                .sequencer
                .crank(&mut self.reader, &mut self.outputs, &mut self.delay);
            let after = self.reader.sample();
            let disarmed = self.state.record_crank_result(after.engine_running);
            if disarmed {
                warn!("restart failed; waiting for manual start");
            }
            report_sample = after;

            let (report, error) = match result {
                Ok(report) => (Some(report), None),
                Err(e) => {
                    let stage = if e.report().is_some() { "relay release" } else { "engage" };
                    warn!("crank output write failed ({})", stage);
                    (e.report().copied(), Some(e.into_inner()))
                }
            };

            if let Some(report) = report {
                info!(
                    "crank {:?} after {}ms, engine running: {}",
                    report.outcome, report.elapsed_ms, after.engine_running
                );
                let record = CrankRecord {
                    tick: self.ticks,
                    trigger,
                    report,
                    restarted: after.engine_running,
                };
                self.push_history(record);
                self.cranks += 1;
                outcome = Ok(TickOutcome::Cranked(record));
            }
            if let Some(error) = error {
                outcome = Err(error);
            }
        }

        // the shift line is rewritten even when the crank hit an output error
        self.last_sample = report_sample;
        let shift = self.reporter.report(&mut self.outputs, &report_sample);
        if let Ok(signal) = shift {
            self.shift = signal;
        }

        let outcome = outcome?;
        shift?;
        Ok(outcome)
    }

    /// Boot, then tick forever. Output errors are logged and the loop
    /// carries on.
    pub fn run(&mut self) -> !
    where
        O::Error: core::fmt::Debug,
    {
        if let Err(e) = self.boot() {
            warn!("boot report failed: {:?}", e);
        }
        loop {
            if let Err(e) = self.tick() {
                warn!("tick {} failed: {:?}", self.ticks, e);
            }
        }
    }

    fn push_history(&mut self, record: CrankRecord) {
        if self.history.is_full() {
            self.history.pop_front();
        }
        let _ = self.history.push_back(record);
    }
}

impl<R, O, D> RestartController<R, O, D> {
    /// Get the current state snapshot
    pub fn status(&self) -> ControllerStatus {
        let mut recent_cranks = heapless::Vec::new();
        for record in self.history.iter() {
            let _ = recent_cranks.push(*record);
        }
        ControllerStatus {
            mode: self.state.mode(),
            last_sample: self.last_sample,
            shift: self.shift,
            ticks: self.ticks,
            cranks: self.cranks,
            recent_cranks,
        }
    }

    /// Cross-tick decision state.
    #[inline]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// The durations this controller runs with.
    #[inline]
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Borrow the input source.
    #[inline]
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Mutably borrow the input source (e.g. to change a mock script).
    #[inline]
    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Borrow the outputs.
    #[inline]
    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    /// Mutably borrow the outputs.
    #[inline]
    pub fn outputs_mut(&mut self) -> &mut O {
        &mut self.outputs
    }

    /// Borrow the delay provider.
    #[inline]
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Take the hardware back apart.
    pub fn into_parts(self) -> (R, O, D) {
        (self.reader, self.outputs, self.delay)
    }
}
