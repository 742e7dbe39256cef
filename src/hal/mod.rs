//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Simulated clock, signals and outputs for desktop testing
//! - `pins`: Any board with `embedded-hal` 1.0 GPIO drivers
//! - `esp32`: ESP32-C3 SuperMini pin map and constructors (requires `esp32` feature)

pub mod mock;
pub mod pins;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;
pub use pins::*;
