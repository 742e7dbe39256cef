//! Mock implementations for testing without hardware.
//!
//! The mocks share a [`SimClock`] so that a scripted signal source can change
//! its levels as the controller's delays advance time.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`SimClock`] | - | Shared simulated time |
//! | [`MockDelay`] | [`DelayNs`] | Advances the clock instead of sleeping |
//! | [`MockSignals`] | [`SignalReader`] | Fixed or time-scripted samples |
//! | [`MockOutputs`] | [`ControlOutputs`] | Records every output write |
//!
//! # Example
//!
//! ```rust
//! use eco_restart::hal::{MockDelay, MockSignals, SimClock};
//! use eco_restart::traits::SignalReader;
//! use eco_restart::InputSample;
//! use embedded_hal::delay::DelayNs;
//!
//! let clock = SimClock::new();
//! let mut signals = MockSignals::scripted(&clock, |t| {
//!     InputSample::IDLE.with_brake_released(t >= 200)
//! });
//! let mut delay = MockDelay::new(&clock);
//!
//! assert!(!signals.sample().brake_released);
//! delay.delay_ms(200);
//! assert!(signals.sample().brake_released);
//! assert_eq!(clock.now_ms(), 200);
//! ```
//!
//! [`DelayNs`]: embedded_hal::delay::DelayNs
//! [`SignalReader`]: crate::traits::SignalReader
//! [`ControlOutputs`]: crate::traits::ControlOutputs

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use embedded_hal::delay::DelayNs;

use crate::traits::{ControlOutputs, InputSample, ShiftSignal, SignalReader};

const NANOS_PER_MILLI: u64 = 1_000_000;

// ============================================================================
// Time
// ============================================================================

/// Simulated monotonic time, shared between mocks.
///
/// Cloning yields a handle to the same clock.
///
/// ```rust
/// use eco_restart::hal::SimClock;
///
/// let clock = SimClock::new();
/// let handle = clock.clone();
/// handle.advance_ms(250);
/// assert_eq!(clock.now_ms(), 250);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SimClock {
    now_ns: Rc<Cell<u64>>,
}

impl SimClock {
    /// Creates a clock at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in milliseconds.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ns.get() / NANOS_PER_MILLI
    }

    /// Current time in nanoseconds.
    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.now_ns.get()
    }

    /// Advances the clock.
    pub fn advance_ns(&self, ns: u64) {
        self.now_ns.set(self.now_ns.get() + ns);
    }

    /// Advances the clock by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance_ns(ms * NANOS_PER_MILLI);
    }

    /// Sets the current time in milliseconds.
    pub fn set_ms(&self, ms: u64) {
        self.now_ns.set(ms * NANOS_PER_MILLI);
    }
}

/// Delay that advances a [`SimClock`] instead of blocking.
#[derive(Debug)]
pub struct MockDelay {
    clock: SimClock,
    total_ns: u64,
    /// Every `delay_ms` request, in order.
    pub sleeps_ms: Vec<u32>,
}

impl MockDelay {
    /// Creates a delay bound to `clock`.
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            total_ns: 0,
            sleeps_ms: Vec::new(),
        }
    }

    /// Total time slept through this delay, in milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.total_ns / NANOS_PER_MILLI
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.clock.advance_ns(u64::from(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleeps_ms.push(ms);
        let ns = u64::from(ms) * NANOS_PER_MILLI;
        self.total_ns += ns;
        self.clock.advance_ns(ns);
    }
}

// ============================================================================
// Inputs
// ============================================================================

type Script = Box<dyn FnMut(u64) -> InputSample>;

/// Signal source driven by a function of simulated time.
///
/// The script receives the current [`SimClock`] time in milliseconds.
pub struct MockSignals {
    clock: SimClock,
    script: Script,
    /// Number of samples taken.
    pub reads: usize,
    /// Most recent sample returned.
    pub last: InputSample,
}

impl MockSignals {
    /// Always returns `sample`.
    pub fn fixed(sample: InputSample) -> Self {
        Self::scripted(&SimClock::new(), move |_| sample)
    }

    /// Returns `script(now_ms)` on every read.
    pub fn scripted(clock: &SimClock, script: impl FnMut(u64) -> InputSample + 'static) -> Self {
        Self {
            clock: clock.clone(),
            script: Box::new(script),
            reads: 0,
            last: InputSample::default(),
        }
    }

    /// Replace the script with a constant sample.
    pub fn set_fixed(&mut self, sample: InputSample) {
        self.script = Box::new(move |_| sample);
    }

    /// Replace the script.
    pub fn set_script(&mut self, script: impl FnMut(u64) -> InputSample + 'static) {
        self.script = Box::new(script);
    }
}

impl core::fmt::Debug for MockSignals {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MockSignals")
            .field("now_ms", &self.clock.now_ms())
            .field("reads", &self.reads)
            .field("last", &self.last)
            .finish()
    }
}

impl SignalReader for MockSignals {
    fn sample(&mut self) -> InputSample {
        self.reads += 1;
        self.last = (self.script)(self.clock.now_ms());
        self.last
    }
}

// ============================================================================
// Outputs
// ============================================================================

/// Which output a recorded write touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    /// Relay asserted (`true`) or released.
    Relay(bool),
    /// Shift signal written.
    Shift(ShiftSignal),
}

/// One recorded output write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputWrite {
    /// Simulated time of the write (0 without a clock).
    pub at_ms: u64,
    /// What was written.
    pub kind: OutputKind,
}

/// Output sink that records every write.
///
/// # Example
///
/// ```rust
/// use eco_restart::hal::MockOutputs;
/// use eco_restart::traits::{ControlOutputs, ShiftSignal};
///
/// let mut outputs = MockOutputs::new();
/// outputs.engage_crank().unwrap();
/// outputs.set_relay(false).unwrap();
///
/// assert_eq!(outputs.relay_transitions(), [true, false]);
/// assert_eq!(outputs.shift_writes(), [ShiftSignal::NotNeutral]);
/// ```
#[derive(Debug, Default)]
pub struct MockOutputs {
    /// Current relay state.
    pub relay: bool,
    /// Current shift signal.
    pub shift: ShiftSignal,
    /// Every successful write, in order.
    pub writes: Vec<OutputWrite>,
    /// Make relay writes fail.
    pub fail_relay_writes: bool,
    /// Make only the release write fail while the relay is asserted.
    pub fail_relay_release: bool,
    /// Make shift writes fail.
    pub fail_shift_writes: bool,
    clock: Option<SimClock>,
}

impl MockOutputs {
    /// Creates a sink with no clock; writes are stamped 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that stamps writes with `clock`.
    pub fn with_clock(clock: &SimClock) -> Self {
        Self {
            clock: Some(clock.clone()),
            ..Default::default()
        }
    }

    /// Relay values written, in order.
    pub fn relay_transitions(&self) -> Vec<bool> {
        self.writes
            .iter()
            .filter_map(|w| match w.kind {
                OutputKind::Relay(on) => Some(on),
                OutputKind::Shift(_) => None,
            })
            .collect()
    }

    /// Shift signals written, in order.
    pub fn shift_writes(&self) -> Vec<ShiftSignal> {
        self.writes
            .iter()
            .filter_map(|w| match w.kind {
                OutputKind::Shift(s) => Some(s),
                OutputKind::Relay(_) => None,
            })
            .collect()
    }

    /// Number of times the relay was asserted.
    pub fn relay_assert_count(&self) -> usize {
        self.relay_transitions().iter().filter(|on| **on).count()
    }

    /// Time of each relay assertion paired with its release.
    pub fn relay_windows(&self) -> Vec<(u64, Option<u64>)> {
        let mut windows = Vec::new();
        let mut open: Option<u64> = None;
        for w in &self.writes {
            match (w.kind, open) {
                (OutputKind::Relay(true), None) => open = Some(w.at_ms),
                (OutputKind::Relay(false), Some(start)) => {
                    windows.push((start, Some(w.at_ms)));
                    open = None;
                }
                _ => {}
            }
        }
        if let Some(start) = open {
            windows.push((start, None));
        }
        windows
    }

    /// Forget recorded writes; current levels are kept.
    pub fn clear_history(&mut self) {
        self.writes.clear();
    }

    fn record(&mut self, kind: OutputKind) {
        let at_ms = self.clock.as_ref().map_or(0, SimClock::now_ms);
        self.writes.push(OutputWrite { at_ms, kind });
    }
}

impl ControlOutputs for MockOutputs {
    type Error = ();

    fn set_relay(&mut self, asserted: bool) -> Result<(), ()> {
        if self.fail_relay_writes || (self.fail_relay_release && self.relay && !asserted) {
            return Err(());
        }
        self.relay = asserted;
        self.record(OutputKind::Relay(asserted));
        Ok(())
    }

    fn set_shift_signal(&mut self, signal: ShiftSignal) -> Result<(), ()> {
        if self.fail_shift_writes {
            return Err(());
        }
        self.shift = signal;
        self.record(OutputKind::Shift(signal));
        Ok(())
    }
}
