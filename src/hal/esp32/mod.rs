//! ESP32-C3 SuperMini hardware abstraction layer for the restart controller.
//!
//! The board sits between the vehicle harness and the idle-stop unit, reading
//! four switch/sense lines and driving a relay module plus the neutral line.
//! Harness levels must be shifted to 3.3V (opto-isolators or dividers).
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32-C3 SuperMini (RISC-V 160MHz, 4MB Flash)
//! - **Relay**: brake + starter-cut relay module, driven active-high
//! - **Neutral line**: open-collector stage into the idle-stop unit, active-low
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments.

mod gpio;

pub use gpio::{output_pins, signal_pins, Esp32Outputs, Esp32Signals};

/// Pin assignments for SuperMini ESP32-C3.
///
/// Strapping pins (GPIO2, 8, 9) are avoided so the harness state at power-on
/// cannot change the boot mode.
pub mod pins {
    // =========================================================================
    // Inputs
    // =========================================================================

    /// Idle-stop disable switch (internal pull-up, high = disabled)
    pub const DISABLE_IN: i32 = 5;

    /// Gearshift neutral switch (internal pull-up, high = neutral)
    pub const NEUTRAL_IN: i32 = 6;

    /// Brake switch (internal pull-up, high = released)
    pub const BRAKE_IN: i32 = 7;

    /// Alternator L terminal (low = engine running)
    pub const ENGINE_SENSE_IN: i32 = 10;

    // =========================================================================
    // Outputs
    // =========================================================================

    /// Brake + starter-cut relay
    pub const RELAY_OUT: i32 = 3;

    /// Neutral signal to the idle-stop unit
    pub const NEUTRAL_OUT: i32 = 4;
}
