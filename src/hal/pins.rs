//! Signal reader and output sink over `embedded-hal` digital pins.
//!
//! Works with any HAL whose GPIO drivers implement the `embedded-hal` 1.0
//! [`InputPin`] / [`OutputPin`] traits. Pin direction and pull-ups must be
//! configured by the caller before the pins are handed over.
//!
//! # Wiring Polarity
//!
//! | Line | Direction | Active level |
//! |------|-----------|--------------|
//! | Idle-stop disable switch | in (pull-up) | high |
//! | Neutral switch | in (pull-up) | high |
//! | Brake switch (released) | in (pull-up) | high |
//! | Engine running (L terminal) | in | **low** |
//! | Brake + starter-cut relay | out | high |
//! | Neutral signal to idle-stop unit | out | **low** |

use embedded_hal::digital::{InputPin, OutputPin};

use crate::traits::{ControlOutputs, InputSample, ShiftSignal, SignalReader};

/// Logic level at which a line counts as active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    /// Active when high.
    ActiveHigh,
    /// Active when low.
    ActiveLow,
}

impl Polarity {
    /// Map a pin level to a logical value.
    #[inline]
    pub const fn is_active(self, high: bool) -> bool {
        match self {
            Polarity::ActiveHigh => high,
            Polarity::ActiveLow => !high,
        }
    }

    /// Pin level that represents `active`.
    #[inline]
    pub const fn level_for(self, active: bool) -> bool {
        self.is_active(active)
    }
}

/// Disable switch polarity.
pub const DISABLED_POLARITY: Polarity = Polarity::ActiveHigh;
/// Neutral switch polarity.
pub const NEUTRAL_POLARITY: Polarity = Polarity::ActiveHigh;
/// Brake-released switch polarity.
pub const BRAKE_RELEASED_POLARITY: Polarity = Polarity::ActiveHigh;
/// Engine sense line polarity.
pub const ENGINE_RUNNING_POLARITY: Polarity = Polarity::ActiveLow;
/// Relay output polarity.
pub const RELAY_POLARITY: Polarity = Polarity::ActiveHigh;
/// Outward neutral line polarity.
pub const NEUTRAL_OUT_POLARITY: Polarity = Polarity::ActiveLow;

/// Read one pin as a logical value. An unreadable pin counts as inactive.
fn read_active<P: InputPin>(pin: &mut P, polarity: Polarity) -> bool {
    match pin.is_high() {
        Ok(high) => polarity.is_active(high),
        Err(_) => false,
    }
}

/// Four input pins read as one [`InputSample`].
pub struct PinSignals<DIS, NEU, BRK, ENG> {
    disabled: DIS,
    neutral: NEU,
    brake: BRK,
    engine: ENG,
}

impl<DIS, NEU, BRK, ENG> PinSignals<DIS, NEU, BRK, ENG>
where
    DIS: InputPin,
    NEU: InputPin,
    BRK: InputPin,
    ENG: InputPin,
{
    /// Wrap already-configured input pins.
    pub fn new(disabled: DIS, neutral: NEU, brake: BRK, engine: ENG) -> Self {
        Self {
            disabled,
            neutral,
            brake,
            engine,
        }
    }

    /// Give the pins back.
    pub fn release(self) -> (DIS, NEU, BRK, ENG) {
        (self.disabled, self.neutral, self.brake, self.engine)
    }
}

impl<DIS, NEU, BRK, ENG> SignalReader for PinSignals<DIS, NEU, BRK, ENG>
where
    DIS: InputPin,
    NEU: InputPin,
    BRK: InputPin,
    ENG: InputPin,
{
    fn sample(&mut self) -> InputSample {
        InputSample {
            disabled_override: read_active(&mut self.disabled, DISABLED_POLARITY),
            neutral: read_active(&mut self.neutral, NEUTRAL_POLARITY),
            brake_released: read_active(&mut self.brake, BRAKE_RELEASED_POLARITY),
            engine_running: read_active(&mut self.engine, ENGINE_RUNNING_POLARITY),
        }
    }
}

/// Relay and neutral output pins.
///
/// Both pins must share an error type, which holds for any single HAL.
pub struct PinOutputs<RLY, NEU> {
    relay: RLY,
    neutral: NEU,
}

impl<RLY, NEU> PinOutputs<RLY, NEU>
where
    RLY: OutputPin,
    NEU: OutputPin<Error = RLY::Error>,
{
    /// Wrap already-configured output pins.
    pub fn new(relay: RLY, neutral: NEU) -> Self {
        Self { relay, neutral }
    }

    /// Give the pins back.
    pub fn release(self) -> (RLY, NEU) {
        (self.relay, self.neutral)
    }
}

fn drive<P: OutputPin>(pin: &mut P, polarity: Polarity, active: bool) -> Result<(), P::Error> {
    if polarity.level_for(active) {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

impl<RLY, NEU> ControlOutputs for PinOutputs<RLY, NEU>
where
    RLY: OutputPin,
    NEU: OutputPin<Error = RLY::Error>,
{
    type Error = RLY::Error;

    fn set_relay(&mut self, asserted: bool) -> Result<(), Self::Error> {
        drive(&mut self.relay, RELAY_POLARITY, asserted)
    }

    fn set_shift_signal(&mut self, signal: ShiftSignal) -> Result<(), Self::Error> {
        drive(&mut self.neutral, NEUTRAL_OUT_POLARITY, signal.is_neutral())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    // =========================================================================
    // Test Pins
    // =========================================================================

    struct Level(bool);

    impl ErrorType for Level {
        type Error = Infallible;
    }

    impl InputPin for Level {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0)
        }
    }

    impl OutputPin for Level {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0 = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0 = true;
            Ok(())
        }
    }

    struct Broken;

    impl ErrorType for Broken {
        type Error = ErrorKind;
    }

    impl InputPin for Broken {
        fn is_high(&mut self) -> Result<bool, ErrorKind> {
            Err(ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, ErrorKind> {
            Err(ErrorKind::Other)
        }
    }

    // =========================================================================
    // Polarity
    // =========================================================================

    #[test]
    fn polarity_mapping() {
        assert!(Polarity::ActiveHigh.is_active(true));
        assert!(!Polarity::ActiveHigh.is_active(false));
        assert!(Polarity::ActiveLow.is_active(false));
        assert!(!Polarity::ActiveLow.is_active(true));
        assert!(!Polarity::ActiveLow.level_for(true));
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    #[test]
    fn all_lines_high_reads_engine_stopped() {
        let mut pins = PinSignals::new(Level(true), Level(true), Level(true), Level(true));
        assert_eq!(
            pins.sample(),
            InputSample {
                disabled_override: true,
                neutral: true,
                brake_released: true,
                engine_running: false,
            }
        );
    }

    #[test]
    fn low_sense_line_reads_engine_running() {
        let mut pins = PinSignals::new(Level(false), Level(false), Level(false), Level(false));
        assert_eq!(pins.sample(), InputSample::IDLE.with_engine_running(true));
    }

    #[test]
    fn unreadable_pin_counts_inactive() {
        let mut pins = PinSignals::new(Broken, Level(true), Level(true), Broken);
        let s = pins.sample();
        assert!(!s.disabled_override);
        assert!(!s.engine_running);
        assert!(s.neutral);
    }

    // =========================================================================
    // Outputs
    // =========================================================================

    #[test]
    fn relay_drives_high_when_asserted() {
        let mut out = PinOutputs::new(Level(false), Level(false));
        out.set_relay(true).unwrap();
        let (relay, _) = out.release();
        assert!(relay.0);
    }

    #[test]
    fn neutral_line_is_active_low() {
        let mut out = PinOutputs::new(Level(false), Level(true));
        out.set_shift_signal(ShiftSignal::Neutral).unwrap();
        assert!(!out.neutral.0);
        out.set_shift_signal(ShiftSignal::NotNeutral).unwrap();
        assert!(out.neutral.0);
    }
}
