//! Hardware abstraction traits for the vehicle signal inputs and the two
//! control outputs.
//!
//! This module defines the interfaces that let eco-restart run against real
//! GPIO (ESP32, any `embedded-hal` board) or against desktop mocks.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`SignalReader`] | One polarity-corrected snapshot of the four inputs |
//! | [`ControlOutputs`] | Starter-cut relay and outward neutral signal |
//!
//! The blocking sleep used for the polling cadence is any
//! [`embedded_hal::delay::DelayNs`] implementation.
//!
//! # Example
//!
//! ```rust
//! use eco_restart::traits::{ControlOutputs, ShiftSignal};
//! use eco_restart::hal::MockOutputs;
//!
//! let mut outputs = MockOutputs::new();
//! outputs.set_relay(true).unwrap();
//! outputs.set_shift_signal(ShiftSignal::NotNeutral).unwrap();
//!
//! assert!(outputs.relay);
//! assert_eq!(outputs.shift, ShiftSignal::NotNeutral);
//! ```

/// One snapshot of the vehicle inputs, already polarity-corrected.
///
/// All four fields come from the same port read, so a tick never sees a
/// half-updated set of signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputSample {
    /// Idle-stop is switched off by the driver.
    pub disabled_override: bool,
    /// The physical gearshift is in neutral.
    pub neutral: bool,
    /// The brake pedal is not depressed.
    pub brake_released: bool,
    /// The engine-running sense line reports activity.
    pub engine_running: bool,
}

impl InputSample {
    /// All signals inactive: override off, in gear, brake held, engine stopped.
    pub const IDLE: Self = Self {
        disabled_override: false,
        neutral: false,
        brake_released: false,
        engine_running: false,
    };

    /// Returns a copy with the override flag set.
    #[inline]
    pub const fn with_override(mut self, on: bool) -> Self {
        self.disabled_override = on;
        self
    }

    /// Returns a copy with the neutral flag set.
    #[inline]
    pub const fn with_neutral(mut self, on: bool) -> Self {
        self.neutral = on;
        self
    }

    /// Returns a copy with the brake-released flag set.
    #[inline]
    pub const fn with_brake_released(mut self, released: bool) -> Self {
        self.brake_released = released;
        self
    }

    /// Returns a copy with the engine-running flag set.
    #[inline]
    pub const fn with_engine_running(mut self, running: bool) -> Self {
        self.engine_running = running;
        self
    }

    /// Returns true if the brake went from depressed in `previous` to
    /// released in `self`.
    #[inline]
    pub const fn brake_released_since(&self, previous: &InputSample) -> bool {
        self.brake_released && !previous.brake_released
    }
}

/// Shift position presented to the vehicle's idle-stop unit.
///
/// # Default
///
/// Defaults to [`NotNeutral`](Self::NotNeutral), the position the idle-stop
/// unit needs to see while cranking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ShiftSignal {
    /// Report neutral.
    Neutral,
    /// Report in gear.
    #[default]
    NotNeutral,
}

impl ShiftSignal {
    /// Returns the signal as a lowercase string.
    ///
    /// ```
    /// use eco_restart::ShiftSignal;
    ///
    /// assert_eq!(ShiftSignal::Neutral.as_str(), "neutral");
    /// assert_eq!(ShiftSignal::NotNeutral.as_str(), "not_neutral");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ShiftSignal::Neutral => "neutral",
            ShiftSignal::NotNeutral => "not_neutral",
        }
    }

    /// Returns true for [`Neutral`](Self::Neutral).
    #[inline]
    pub const fn is_neutral(&self) -> bool {
        matches!(self, ShiftSignal::Neutral)
    }
}

/// Source of input snapshots.
///
/// Reads are non-blocking and cannot fail: the hardware always returns a
/// level, and implementations map an unreadable pin to "inactive".
pub trait SignalReader {
    /// Sample all four inputs at once.
    fn sample(&mut self) -> InputSample;
}

/// Sink for the two control outputs.
///
/// # Implementation Notes
///
/// - The relay line asserts brake + starter-cut together
/// - Physical polarity (active-low neutral line, etc.) belongs to the
///   implementation; callers only see logical values
///
/// # Example Implementation
///
/// ```rust,ignore
/// use eco_restart::traits::{ControlOutputs, ShiftSignal};
///
/// struct MyBoard { /* pin handles */ }
///
/// impl ControlOutputs for MyBoard {
///     type Error = ();
///
///     fn set_relay(&mut self, asserted: bool) -> Result<(), ()> {
///         // Drive relay pin high when asserted...
///         Ok(())
///     }
///
///     fn set_shift_signal(&mut self, signal: ShiftSignal) -> Result<(), ()> {
///         // Drive neutral pin low for Neutral...
///         Ok(())
///     }
/// }
/// ```
pub trait ControlOutputs {
    /// Error type for output writes.
    type Error;

    /// Assert or release the brake + starter-cut relay.
    fn set_relay(&mut self, asserted: bool) -> Result<(), Self::Error>;

    /// Drive the outward shift-position signal.
    fn set_shift_signal(&mut self, signal: ShiftSignal) -> Result<(), Self::Error>;

    /// Convenience method used at crank start: relay on, shift faked to
    /// not-neutral.
    fn engage_crank(&mut self) -> Result<(), Self::Error> {
        self.set_relay(true)?;
        self.set_shift_signal(ShiftSignal::NotNeutral)
    }
}

impl<T: SignalReader + ?Sized> SignalReader for &mut T {
    fn sample(&mut self) -> InputSample {
        (**self).sample()
    }
}

impl<T: ControlOutputs + ?Sized> ControlOutputs for &mut T {
    type Error = T::Error;

    fn set_relay(&mut self, asserted: bool) -> Result<(), Self::Error> {
        (**self).set_relay(asserted)
    }

    fn set_shift_signal(&mut self, signal: ShiftSignal) -> Result<(), Self::Error> {
        (**self).set_shift_signal(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // InputSample Tests
    // =========================================================================

    #[test]
    fn sample_default_is_idle() {
        assert_eq!(InputSample::default(), InputSample::IDLE);
    }

    #[test]
    fn sample_builders_set_one_flag_each() {
        let s = InputSample::IDLE.with_brake_released(true);
        assert!(s.brake_released);
        assert!(!s.disabled_override);
        assert!(!s.neutral);
        assert!(!s.engine_running);

        let s = InputSample::IDLE.with_override(true).with_engine_running(true);
        assert!(s.disabled_override);
        assert!(s.engine_running);
        assert!(!s.brake_released);
    }

    #[test]
    fn brake_edge_only_on_depressed_to_released() {
        let held = InputSample::IDLE;
        let released = InputSample::IDLE.with_brake_released(true);

        assert!(released.brake_released_since(&held));
        assert!(!released.brake_released_since(&released));
        assert!(!held.brake_released_since(&released));
        assert!(!held.brake_released_since(&held));
    }

    // =========================================================================
    // ShiftSignal Tests
    // =========================================================================

    #[test]
    fn shift_signal_default() {
        assert_eq!(ShiftSignal::default(), ShiftSignal::NotNeutral);
    }

    #[test]
    fn shift_signal_is_neutral() {
        assert!(ShiftSignal::Neutral.is_neutral());
        assert!(!ShiftSignal::NotNeutral.is_neutral());
    }

    // =========================================================================
    // ControlOutputs Default Methods Tests
    // =========================================================================

    #[derive(Default)]
    struct TestOutputs {
        relay: bool,
        shift: Option<ShiftSignal>,
        writes: usize,
    }

    impl ControlOutputs for TestOutputs {
        type Error = ();

        fn set_relay(&mut self, asserted: bool) -> Result<(), ()> {
            self.relay = asserted;
            self.writes += 1;
            Ok(())
        }

        fn set_shift_signal(&mut self, signal: ShiftSignal) -> Result<(), ()> {
            self.shift = Some(signal);
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn engage_crank_default_impl() {
        let mut outputs = TestOutputs::default();
        outputs.engage_crank().unwrap();

        assert!(outputs.relay);
        assert_eq!(outputs.shift, Some(ShiftSignal::NotNeutral));
        assert_eq!(outputs.writes, 2);
    }

    fn report_neutral<O: ControlOutputs>(mut outputs: O) -> Result<(), O::Error> {
        outputs.set_shift_signal(ShiftSignal::Neutral)
    }

    #[test]
    fn mut_ref_forwards_to_inner() {
        let mut outputs = TestOutputs::default();
        report_neutral(&mut outputs).unwrap();
        assert_eq!(outputs.shift, Some(ShiftSignal::Neutral));
        assert_eq!(outputs.writes, 1);
    }
}
