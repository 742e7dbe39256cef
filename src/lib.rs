//! # eco-restart
//!
//! An idle-stop bypass controller. It watches the gearshift, brake,
//! idle-stop disable switch and the engine-running sense line, and restarts
//! the engine after a stop by making the vehicle's own idle-stop unit crank
//! the starter.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for the input snapshot and the two outputs
//! - **Edge-triggered restarts**: Releasing the brake after a stop cranks once
//! - **Debounced start detection**: The sense line must hold before a start counts
//! - **Bounded cranking**: The relay is never held past the maximum crank time
//! - **Fail-safe disarm**: A failed restart waits for a manual start
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware abstractions
//! - `config` - Compiled-in timing constants
//! - `reporter` - Outward neutral signal
//! - `cranking` - One bounded crank attempt
//! - `controller` - Restart decision loop that ties everything together
//! - `hal` - Concrete implementations (mock for testing, `embedded-hal` pins, esp32)
//!
//! ## Example
//!
//! ```rust
//! use eco_restart::{RestartController, TimingConfig, InputSample, TickOutcome};
//! use eco_restart::hal::{MockDelay, MockOutputs, MockSignals, SimClock};
//!
//! let clock = SimClock::new();
//! let signals = MockSignals::fixed(InputSample::IDLE.with_engine_running(true));
//! let outputs = MockOutputs::with_clock(&clock);
//! let delay = MockDelay::new(&clock);
//!
//! let mut controller = RestartController::new(signals, outputs, delay, TimingConfig::default());
//! controller.boot().unwrap();
//!
//! // Update in your main loop (or call `run()` to loop forever)
//! let outcome = controller.tick().unwrap();
//! assert_eq!(outcome, TickOutcome::Idle);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Shared configuration (timing constants and device identity).
pub mod config;
/// Restart decision loop with cross-tick state.
pub mod controller;
/// Bounded crank attempts with start debouncing.
pub mod cranking;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Outward shift-position reporting.
pub mod reporter;
/// Core traits for hardware abstraction.
pub mod traits;

// Re-exports for convenience
pub use config::{Config, ConfigError, DeviceConfig, TimingConfig};
pub use controller::{
    ControllerState, ControllerStatus, CrankRecord, Mode, RestartController, RestartTrigger,
    TickOutcome,
};
pub use cranking::{CrankError, CrankOutcome, CrankReport, CrankSequencer, StartDetector};
pub use reporter::{shift_signal_for, ShiftReporter};
pub use traits::{ControlOutputs, InputSample, ShiftSignal, SignalReader};
