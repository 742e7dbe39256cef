//! Bench simulation of a stop-and-go drive cycle.
//!
//! Runs the restart controller against simulated harness signals with a
//! virtual clock, so a full minute of driving finishes instantly. Every
//! decision is logged through `env_logger`.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --example bench_sim
//! RUST_LOG=trace cargo run --example bench_sim   # every tick
//! ```
//!
//! # Drive Cycle
//!
//! | Time | Event |
//! |------|-------|
//! | 1s | Key on, engine started by hand, brake held |
//! | 5s | Idle-stop unit stops the engine |
//! | 8s | Brake released: restart, catches 300ms into the crank |
//! | 15s | Stop again, brake held |
//! | 18s | Brake released: restart fails (battery low) |
//! | 25s | Brake cycled: ignored, waiting for manual start |
//! | 30s | Engine started by hand |
//! | 35s | Brake released with the engine running: ignored |
//! | 40s | Engine stopped, idle-stop disable switch on |
//! | 40.5s | Override crank catches |

use eco_restart::hal::{MockDelay, MockOutputs, MockSignals, SimClock};
use eco_restart::{Config, InputSample, RestartController, TickOutcome};
use log::info;

const END_MS: u64 = 60_000;

/// Harness lines at `t` milliseconds into the drive cycle.
fn drive_cycle(t: u64) -> InputSample {
    let brake_released = matches!(t, 8_000..=14_999 | 18_000..=24_999 | 26_000..=29_999 | 35_000..)
        || (25_000..26_000).contains(&t) && (t / 200) % 2 == 0;

    let engine_running = match t {
        0..=999 => false,
        1_000..=4_999 => true,
        // catches 300ms after the 8s crank begins
        8_300..=14_999 => true,
        // second restart never catches
        30_000..=39_999 => true,
        // override crank at 40s catches 500ms in
        40_500.. => true,
        _ => false,
    };

    InputSample {
        disabled_override: t >= 40_000,
        neutral: false,
        brake_released,
        engine_running,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::default().with_device(eco_restart::DeviceConfig::default().with_name("bench"));
    config.timing.validate()?;

    let clock = SimClock::new();
    let mut controller = RestartController::new(
        MockSignals::scripted(&clock, drive_cycle),
        MockOutputs::with_clock(&clock),
        MockDelay::new(&clock),
        config.timing,
    );

    info!("{}: simulating {}s drive cycle", config.device.name, END_MS / 1000);
    controller
        .boot()
        .map_err(|()| anyhow::anyhow!("boot report failed"))?;

    while clock.now_ms() < END_MS {
        let outcome = controller
            .tick()
            .map_err(|()| anyhow::anyhow!("tick failed at {}ms", clock.now_ms()))?;
        if let TickOutcome::Cranked(record) = outcome {
            info!(
                "t={:>6}ms crank #{} ({:?}) held {}ms -> {}",
                clock.now_ms(),
                controller.status().cranks,
                record.trigger,
                record.report.elapsed_ms,
                if record.restarted { "running" } else { "stalled" }
            );
        }
    }

    let status = controller.status();
    info!(
        "done: {} ticks, {} cranks, mode {}",
        status.ticks,
        status.cranks,
        status.mode.as_str()
    );
    for (start, end) in controller.outputs().relay_windows() {
        info!("relay on {}ms -> {:?}ms", start, end);
    }

    Ok(())
}
