//! Compiled-in configuration for the restart controller.
//!
//! The controller has no runtime configuration surface: every timing value is
//! a constant baked into the firmware. The builders exist so tests and the
//! bench simulator can shrink or stretch the timeline.
//!
//! Uses `heapless::String` for `no_std` compatibility.
//!
//! # Example
//!
//! ```rust
//! use eco_restart::config::{Config, TimingConfig};
//!
//! // Firmware defaults
//! let config = Config::default();
//! assert_eq!(config.timing.polling_interval_ms, 100);
//!
//! // Or customize for a bench run
//! let timing = TimingConfig::default().with_max_crank_ms(2000);
//! assert!(timing.validate().is_ok());
//! ```

use heapless::String as HString;

/// Maximum length for short config strings (device names)
pub const MAX_SHORT_STRING: usize = 32;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating at a char boundary if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    let valid_end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= MAX_SHORT_STRING)
        .last()
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete controller configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Polling and cranking durations
    pub timing: TimingConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set timing configuration
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// Timing Config
// ============================================================================

/// The four durations that drive the control loop and the crank sequence.
///
/// All values are milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    /// Cadence of the control loop and of the crank polling steps.
    pub polling_interval_ms: u32,
    /// Hard ceiling on how long the relay stays asserted.
    pub max_crank_ms: u32,
    /// Grace period after crank start before the sense line is trusted.
    pub start_check_delay_ms: u32,
    /// How long the sense line must stay active to count as started.
    pub start_confirm_ms: u32,
}

impl TimingConfig {
    /// Firmware defaults.
    pub const DEFAULT: Self = Self {
        polling_interval_ms: 100,
        max_crank_ms: 4000,
        start_check_delay_ms: 500,
        start_confirm_ms: 500,
    };

    /// Set the polling interval
    pub fn with_polling_interval_ms(mut self, ms: u32) -> Self {
        self.polling_interval_ms = ms;
        self
    }

    /// Set the maximum crank duration
    pub fn with_max_crank_ms(mut self, ms: u32) -> Self {
        self.max_crank_ms = ms;
        self
    }

    /// Set the start-check delay
    pub fn with_start_check_delay_ms(mut self, ms: u32) -> Self {
        self.start_check_delay_ms = ms;
        self
    }

    /// Set the start-confirm threshold
    pub fn with_start_confirm_ms(mut self, ms: u32) -> Self {
        self.start_confirm_ms = ms;
        self
    }

    /// Earliest elapsed crank time at which a start can be confirmed.
    ///
    /// The first trusted sample lands one polling step after the check delay,
    /// and the confirm window is measured from there.
    pub fn earliest_confirm_ms(&self) -> u32 {
        let step = self.polling_interval_ms.max(1);
        let delay = self.start_check_delay_ms;
        let first_trusted = (delay - delay % step).saturating_add(step);
        let window = self.start_confirm_ms.div_ceil(step).saturating_mul(step);
        first_trusted.saturating_add(window)
    }

    /// Check that the durations describe a usable crank sequence.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroPollingInterval`] if the loop would never sleep
    /// - [`ConfigError::CrankShorterThanPoll`] if a crank could not take a
    ///   single sample
    /// - [`ConfigError::ConfirmUnreachable`] if the check delay plus confirm
    ///   window cannot fit inside the maximum crank time
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.polling_interval_ms == 0 {
            return Err(ConfigError::ZeroPollingInterval);
        }
        if self.max_crank_ms < self.polling_interval_ms {
            return Err(ConfigError::CrankShorterThanPoll {
                max_crank_ms: self.max_crank_ms,
                polling_interval_ms: self.polling_interval_ms,
            });
        }
        let needed = self.earliest_confirm_ms();
        if needed > self.max_crank_ms {
            return Err(ConfigError::ConfirmUnreachable {
                needed_ms: needed,
                max_crank_ms: self.max_crank_ms,
            });
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Reasons a [`TimingConfig`] is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Polling interval is zero.
    ZeroPollingInterval,
    /// Maximum crank time is shorter than one polling step.
    CrankShorterThanPoll {
        /// Configured crank ceiling.
        max_crank_ms: u32,
        /// Configured polling interval.
        polling_interval_ms: u32,
    },
    /// A start could never be confirmed before the crank times out.
    ConfirmUnreachable {
        /// Earliest elapsed time a confirmation could happen.
        needed_ms: u32,
        /// Configured crank ceiling.
        max_crank_ms: u32,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroPollingInterval => write!(f, "polling interval must be non-zero"),
            ConfigError::CrankShorterThanPoll {
                max_crank_ms,
                polling_interval_ms,
            } => write!(
                f,
                "max crank time {}ms is shorter than polling interval {}ms",
                max_crank_ms, polling_interval_ms
            ),
            ConfigError::ConfirmUnreachable {
                needed_ms,
                max_crank_ms,
            } => write!(
                f,
                "start confirmation needs {}ms but cranking stops at {}ms",
                needed_ms, max_crank_ms
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name, printed in the boot banner
    pub name: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("eco-restart"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
