//! Outward shift-position reporting.
//!
//! The vehicle's idle-stop unit reads the neutral line to decide whether it
//! may act. The controller passes the real gearshift through, except that an
//! active idle-stop override is always reported as neutral so the unit stays
//! out of the way.

use crate::traits::{ControlOutputs, InputSample, ShiftSignal};

/// Shift signal the idle-stop unit should see for this sample.
///
/// ```
/// use eco_restart::{reporter::shift_signal_for, InputSample, ShiftSignal};
///
/// let in_gear = InputSample::IDLE;
/// assert_eq!(shift_signal_for(&in_gear), ShiftSignal::NotNeutral);
/// assert_eq!(shift_signal_for(&in_gear.with_override(true)), ShiftSignal::Neutral);
/// assert_eq!(shift_signal_for(&in_gear.with_neutral(true)), ShiftSignal::Neutral);
/// ```
#[inline]
pub const fn shift_signal_for(sample: &InputSample) -> ShiftSignal {
    if sample.disabled_override || sample.neutral {
        ShiftSignal::Neutral
    } else {
        ShiftSignal::NotNeutral
    }
}

/// Drives the outward neutral line from an input sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShiftReporter;

impl ShiftReporter {
    /// Creates a reporter.
    pub const fn new() -> Self {
        Self
    }

    /// Write the shift signal for `sample` and return what was written.
    pub fn report<O: ControlOutputs>(
        &self,
        outputs: &mut O,
        sample: &InputSample,
    ) -> Result<ShiftSignal, O::Error> {
        let signal = shift_signal_for(sample);
        outputs.set_shift_signal(signal)?;
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockOutputs;

    #[test]
    fn truth_table() {
        for bits in 0u8..16 {
            let sample = InputSample {
                disabled_override: bits & 1 != 0,
                neutral: bits & 2 != 0,
                brake_released: bits & 4 != 0,
                engine_running: bits & 8 != 0,
            };
            let expected = sample.disabled_override || sample.neutral;
            assert_eq!(shift_signal_for(&sample).is_neutral(), expected, "{:?}", sample);
        }
    }

    #[test]
    fn report_writes_output() {
        let mut outputs = MockOutputs::new();
        let written = ShiftReporter::new()
            .report(&mut outputs, &InputSample::IDLE.with_neutral(true))
            .unwrap();

        assert_eq!(written, ShiftSignal::Neutral);
        assert_eq!(outputs.shift, ShiftSignal::Neutral);
        assert!(!outputs.relay);
    }
}
