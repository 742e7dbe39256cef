//! Trait definitions for hardware abstraction.
//!
//! This module defines the abstractions that allow eco-restart to run on
//! different hardware (ESP32, any `embedded-hal` board, desktop mock) without
//! touching the restart logic.
//!
//! # Hardware Abstraction
//!
//! - [`SignalReader`]: Polarity-corrected snapshot of the vehicle inputs
//! - [`ControlOutputs`]: Relay and outward neutral signal
//!
//! The polling delay is [`embedded_hal::delay::DelayNs`], so any HAL delay
//! provider plugs in directly.

pub mod hardware;

pub use hardware::*;
