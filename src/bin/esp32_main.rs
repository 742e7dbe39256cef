//! ESP32-C3 SuperMini idle-stop restart controller.
//!
//! This is the main entry point for the in-vehicle controller. It runs a
//! 10Hz control loop that:
//! - Samples the disable, neutral, brake and engine-sense lines
//! - Cranks through the idle-stop unit when a restart is warranted
//! - Reports the shift position to the idle-stop unit every tick
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_main
//! espflash flash --monitor target/riscv32imc-esp-espidf/release/esp32_main
//! ```

use eco_restart::hal::esp32::{output_pins, signal_pins};
use eco_restart::{Config, RestartController};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use log::info;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let config = Config::default();
    config.timing.validate()?;

    info!("================================");
    info!("  {} controller", config.device.name);
    info!("================================");

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Outputs first, so the relay is released as early as possible
    // =========================================================================
    let outputs = output_pins(peripherals.pins.gpio3, peripherals.pins.gpio4)?;
    info!("[OK] Outputs initialized (relay GPIO3, neutral GPIO4)");

    // =========================================================================
    // Inputs (disable, neutral, brake, engine sense)
    // =========================================================================
    let signals = signal_pins(
        peripherals.pins.gpio5,
        peripherals.pins.gpio6,
        peripherals.pins.gpio7,
        peripherals.pins.gpio10,
    )?;
    info!("[OK] Inputs initialized (GPIO5/6/7/10)");

    // =========================================================================
    // Main Control Loop
    // =========================================================================
    let mut controller = RestartController::new(signals, outputs, FreeRtos, config.timing);
    info!(
        "Starting control loop ({}ms)...",
        config.timing.polling_interval_ms
    );

    controller.run()
}
