//! Bounded crank attempts with a noise-tolerant start window.
//!
//! A crank asserts the brake + starter-cut relay and fakes a not-neutral
//! shift position, which makes the vehicle's own idle-stop unit spin the
//! starter. The sequencer then watches the engine-running sense line:
//!
//! - samples taken within the start-check delay are ignored
//! - after that, the line must stay active for the start-confirm threshold
//! - any inactive sample restarts the confirm window
//!
//! The relay is released on every exit path, whether the start was
//! confirmed or the maximum crank time ran out.
//!
//! # Example
//!
//! ```rust
//! use eco_restart::cranking::{CrankOutcome, CrankSequencer};
//! use eco_restart::config::TimingConfig;
//! use eco_restart::hal::{MockDelay, MockOutputs, MockSignals, SimClock};
//! use eco_restart::InputSample;
//!
//! let clock = SimClock::new();
//! // Engine catches 300ms into the crank and keeps running
//! let mut signals = MockSignals::scripted(&clock, |t| {
//!     InputSample::IDLE.with_engine_running(t >= 300)
//! });
//! let mut outputs = MockOutputs::with_clock(&clock);
//! let mut delay = MockDelay::new(&clock);
//!
//! let sequencer = CrankSequencer::new(TimingConfig::default());
//! let report = sequencer.crank(&mut signals, &mut outputs, &mut delay).unwrap();
//!
//! assert_eq!(report.outcome, CrankOutcome::Confirmed);
//! assert_eq!(report.elapsed_ms, 1100);
//! assert!(!outputs.relay);
//! ```

use embedded_hal::delay::DelayNs;

use crate::config::TimingConfig;
use crate::traits::{ControlOutputs, SignalReader};

/// How a crank attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CrankOutcome {
    /// The sense line held active for the full confirm window.
    Confirmed,
    /// The maximum crank time elapsed without a confirmed start.
    TimedOut,
}

/// Summary of one crank attempt.
///
/// Informational only: the restart loop decides what to do next by
/// re-sampling the engine-running line, not from this report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrankReport {
    /// Time the relay was held, in milliseconds.
    pub elapsed_ms: u32,
    /// Why the sequence stopped.
    pub outcome: CrankOutcome,
}

impl CrankReport {
    /// Returns true if the start was confirmed.
    #[inline]
    pub fn confirmed(&self) -> bool {
        self.outcome == CrankOutcome::Confirmed
    }
}

/// Output failure during a crank attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrankError<E> {
    /// Engaging the crank failed; the starter was never held.
    Engage(E),
    /// The crank ran to completion but releasing the relay failed.
    Release {
        /// What the completed crank saw.
        report: CrankReport,
        /// The release write error.
        error: E,
    },
}

impl<E> CrankError<E> {
    /// The completed crank, if one ran before the failure.
    pub fn report(&self) -> Option<&CrankReport> {
        match self {
            CrankError::Engage(_) => None,
            CrankError::Release { report, .. } => Some(report),
        }
    }

    /// The underlying output error.
    pub fn into_inner(self) -> E {
        match self {
            CrankError::Engage(error) | CrankError::Release { error, .. } => error,
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for CrankError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CrankError::Engage(e) => write!(f, "crank engage failed: {:?}", e),
            CrankError::Release { report, error } => write!(
                f,
                "relay release failed after {}ms crank: {:?}",
                report.elapsed_ms, error
            ),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for CrankError<E> {}

/// Debounce window for the engine-running line during a crank.
///
/// Feed it one sample per polling step with the elapsed crank time; it
/// reports when the line has been active long enough.
#[derive(Clone, Copy, Debug)]
pub struct StartDetector {
    check_delay_ms: u32,
    confirm_ms: u32,
    running_since: Option<u32>,
}

impl StartDetector {
    /// Creates a detector for the given delay and confirm window.
    pub const fn new(check_delay_ms: u32, confirm_ms: u32) -> Self {
        Self {
            check_delay_ms,
            confirm_ms,
            running_since: None,
        }
    }

    /// Creates a detector from the timing configuration.
    pub const fn from_timing(timing: &TimingConfig) -> Self {
        Self::new(timing.start_check_delay_ms, timing.start_confirm_ms)
    }

    /// Record one sample. Returns true once the start is confirmed.
    ///
    /// Samples at or before the check delay, and any inactive sample, clear
    /// the window.
    pub fn update(&mut self, elapsed_ms: u32, engine_running: bool) -> bool {
        if elapsed_ms <= self.check_delay_ms || !engine_running {
            self.running_since = None;
            return false;
        }

        let since = *self.running_since.get_or_insert(elapsed_ms);
        elapsed_ms - since >= self.confirm_ms
    }

    /// Elapsed time at which the current active run began, if any.
    #[inline]
    pub fn running_since(&self) -> Option<u32> {
        self.running_since
    }
}

/// Executes one bounded crank attempt.
#[derive(Clone, Copy, Debug)]
pub struct CrankSequencer {
    timing: TimingConfig,
}

impl CrankSequencer {
    /// Creates a sequencer using the given durations.
    pub const fn new(timing: TimingConfig) -> Self {
        Self { timing }
    }

    /// The durations this sequencer runs with.
    #[inline]
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Crank until the start is confirmed or the maximum crank time runs out.
    ///
    /// Blocks the caller for up to `max_crank_ms`.
    ///
    /// # Errors
    ///
    /// [`CrankError::Engage`] if the crank could not be engaged; the relay
    /// release is still attempted first. [`CrankError::Release`] if the
    /// crank ran but the relay release write failed.
    pub fn crank<R, O, D>(
        &self,
        reader: &mut R,
        outputs: &mut O,
        delay: &mut D,
    ) -> Result<CrankReport, CrankError<O::Error>>
    where
        R: SignalReader,
        O: ControlOutputs,
        D: DelayNs,
    {
        if let Err(e) = outputs.engage_crank() {
            let _ = outputs.set_relay(false);
            return Err(CrankError::Engage(e));
        }

        let report = self.wait_for_start(reader, delay);
        outputs
            .set_relay(false)
            .map_err(|error| CrankError::Release { report, error })?;

        Ok(report)
    }

    /// Poll the sense line until confirmed or timed out. Pure input side.
    fn wait_for_start<R, D>(&self, reader: &mut R, delay: &mut D) -> CrankReport
    where
        R: SignalReader,
        D: DelayNs,
    {
        let step = self.timing.polling_interval_ms;
        let mut detector = StartDetector::from_timing(&self.timing);
        let mut elapsed_ms: u32 = 0;

        while elapsed_ms < self.timing.max_crank_ms {
            delay.delay_ms(step);
            elapsed_ms = elapsed_ms.saturating_add(step);

            let running = reader.sample().engine_running;
            if detector.update(elapsed_ms, running) {
                return CrankReport {
                    elapsed_ms,
                    outcome: CrankOutcome::Confirmed,
                };
            }

            // a zero step would spin forever
            if step == 0 {
                break;
            }
        }

        CrankReport {
            elapsed_ms,
            outcome: CrankOutcome::TimedOut,
        }
    }
}

impl Default for CrankSequencer {
    fn default() -> Self {
        Self::new(TimingConfig::DEFAULT)
    }
}
