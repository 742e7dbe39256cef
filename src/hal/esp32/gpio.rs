//! GPIO setup for the harness lines.
//!
//! Builds `PinDriver`s with the right direction and pulls, then wraps them in
//! the generic [`PinSignals`] / [`PinOutputs`] adapters.

use esp_idf_hal::gpio::{Input, InputPin, Output, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;

use crate::hal::pins::{PinOutputs, PinSignals};

/// Input side on ESP32 GPIO.
pub type Esp32Signals<'d, DIS, NEU, BRK, ENG> = PinSignals<
    PinDriver<'d, DIS, Input>,
    PinDriver<'d, NEU, Input>,
    PinDriver<'d, BRK, Input>,
    PinDriver<'d, ENG, Input>,
>;

/// Output side on ESP32 GPIO.
pub type Esp32Outputs<'d, RLY, NEU> = PinOutputs<PinDriver<'d, RLY, Output>, PinDriver<'d, NEU, Output>>;

/// Configure the four input lines.
///
/// The three switch inputs get internal pull-ups; the engine sense line is
/// driven by the harness and has no pull.
///
/// # Example
///
/// ```ignore
/// use eco_restart::hal::esp32::signal_pins;
///
/// let peripherals = Peripherals::take()?;
/// let signals = signal_pins(
///     peripherals.pins.gpio5,  // disable
///     peripherals.pins.gpio6,  // neutral
///     peripherals.pins.gpio7,  // brake
///     peripherals.pins.gpio10, // engine sense
/// )?;
/// ```
///
/// # Errors
///
/// Returns an error if GPIO initialization fails.
pub fn signal_pins<'d, DIS, NEU, BRK, ENG>(
    disable_pin: impl Peripheral<P = DIS> + 'd,
    neutral_pin: impl Peripheral<P = NEU> + 'd,
    brake_pin: impl Peripheral<P = BRK> + 'd,
    engine_pin: impl Peripheral<P = ENG> + 'd,
) -> Result<Esp32Signals<'d, DIS, NEU, BRK, ENG>, esp_idf_hal::sys::EspError>
where
    DIS: InputPin + OutputPin,
    NEU: InputPin + OutputPin,
    BRK: InputPin + OutputPin,
    ENG: InputPin,
{
    let mut disabled = PinDriver::input(disable_pin)?;
    let mut neutral = PinDriver::input(neutral_pin)?;
    let mut brake = PinDriver::input(brake_pin)?;
    let engine = PinDriver::input(engine_pin)?;

    disabled.set_pull(Pull::Up)?;
    neutral.set_pull(Pull::Up)?;
    brake.set_pull(Pull::Up)?;

    Ok(PinSignals::new(disabled, neutral, brake, engine))
}

/// Configure the relay and neutral outputs.
///
/// The relay is driven low (released) before the driver is returned so a
/// reset never leaves the starter-cut engaged.
///
/// # Errors
///
/// Returns an error if GPIO initialization fails.
pub fn output_pins<'d, RLY, NEU>(
    relay_pin: impl Peripheral<P = RLY> + 'd,
    neutral_pin: impl Peripheral<P = NEU> + 'd,
) -> Result<Esp32Outputs<'d, RLY, NEU>, esp_idf_hal::sys::EspError>
where
    RLY: OutputPin,
    NEU: OutputPin,
{
    let mut relay = PinDriver::output(relay_pin)?;
    relay.set_low()?;
    let neutral = PinDriver::output(neutral_pin)?;

    Ok(PinOutputs::new(relay, neutral))
}
