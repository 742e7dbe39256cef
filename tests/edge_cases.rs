//! Edge case and boundary condition tests for cranking and the restart loop

use eco_restart::hal::{MockDelay, MockOutputs, MockSignals, SimClock};
use eco_restart::{
    CrankOutcome, CrankSequencer, InputSample, Mode, RestartController, ShiftSignal, TickOutcome,
    TimingConfig,
};

fn crank_with(
    timing: TimingConfig,
    script: impl FnMut(u64) -> InputSample + 'static,
) -> (eco_restart::CrankReport, MockOutputs, MockDelay) {
    let clock = SimClock::new();
    let mut signals = MockSignals::scripted(&clock, script);
    let mut outputs = MockOutputs::with_clock(&clock);
    let mut delay = MockDelay::new(&clock);
    let report = CrankSequencer::new(timing)
        .crank(&mut signals, &mut outputs, &mut delay)
        .unwrap();
    (report, outputs, delay)
}

// ============================================================================
// Start Window Boundaries
// ============================================================================

#[test]
fn confirm_exits_one_step_after_delay_plus_window() {
    // Running from exactly the check delay: that sample is still ignored
    let (report, _, _) = crank_with(TimingConfig::default(), |t| {
        InputSample::IDLE.with_engine_running(t >= 500)
    });
    assert_eq!(report.outcome, CrankOutcome::Confirmed);
    assert_eq!(report.elapsed_ms, 1100);
}

#[test]
fn confirm_never_before_delay_plus_window() {
    let timing = TimingConfig::default();
    let (report, _, _) = crank_with(timing, |_| InputSample::IDLE.with_engine_running(true));
    assert!(report.elapsed_ms >= timing.start_check_delay_ms + timing.start_confirm_ms);
    assert!(
        report.elapsed_ms
            <= timing.start_check_delay_ms + timing.start_confirm_ms + timing.polling_interval_ms
    );
}

#[test]
fn late_start_still_confirms_inside_ceiling() {
    // Catches at 3400ms into the crank: confirmed at 3900ms, just under 4000
    let (report, _, _) = crank_with(TimingConfig::default(), |t| {
        InputSample::IDLE.with_engine_running(t >= 3400)
    });
    assert_eq!(report.outcome, CrankOutcome::Confirmed);
    assert_eq!(report.elapsed_ms, 3900);
}

#[test]
fn too_late_start_times_out() {
    let (report, outputs, _) = crank_with(TimingConfig::default(), |t| {
        InputSample::IDLE.with_engine_running(t >= 3600)
    });
    assert_eq!(report.outcome, CrankOutcome::TimedOut);
    assert_eq!(report.elapsed_ms, 4000);
    assert!(!outputs.relay);
}

#[test]
fn flickering_sense_line_never_confirms() {
    let (report, _, delay) = crank_with(TimingConfig::default(), |t| {
        InputSample::IDLE.with_engine_running((t / 100) % 3 != 0)
    });
    assert_eq!(report.outcome, CrankOutcome::TimedOut);
    assert_eq!(delay.total_ms(), 4000);
}

// ============================================================================
// Timing Variants
// ============================================================================

#[test]
fn zero_delay_zero_window_confirms_on_first_sample() {
    let timing = TimingConfig::default()
        .with_polling_interval_ms(50)
        .with_start_check_delay_ms(0)
        .with_start_confirm_ms(0);
    let (report, _, delay) = crank_with(timing, |_| InputSample::IDLE.with_engine_running(true));
    assert_eq!(report.outcome, CrankOutcome::Confirmed);
    assert_eq!(report.elapsed_ms, 50);
    assert_eq!(delay.sleeps_ms, [50]);
}

#[test]
fn ceiling_not_multiple_of_poll_rounds_up_one_step() {
    let timing = TimingConfig::default()
        .with_polling_interval_ms(300)
        .with_max_crank_ms(1000);
    let (report, _, delay) = crank_with(timing, |_| InputSample::IDLE);
    assert_eq!(report.outcome, CrankOutcome::TimedOut);
    assert_eq!(report.elapsed_ms, 1200);
    assert_eq!(delay.sleeps_ms.len(), 4);
}

#[test]
fn loop_uses_configured_polling_interval() {
    let clock = SimClock::new();
    let timing = TimingConfig::default().with_polling_interval_ms(20);
    let mut controller = RestartController::new(
        MockSignals::fixed(InputSample::IDLE),
        MockOutputs::with_clock(&clock),
        MockDelay::new(&clock),
        timing,
    );
    for _ in 0..5 {
        controller.tick().unwrap();
    }
    assert_eq!(clock.now_ms(), 100);
    assert_eq!(controller.delay().sleeps_ms, [20; 5]);
    assert_eq!(controller.status().ticks, 5);
}

// ============================================================================
// Output Failures
// ============================================================================

#[test]
fn relay_write_failure_still_disarms() {
    let clock = SimClock::new();
    let mut outputs = MockOutputs::with_clock(&clock);
    outputs.fail_relay_writes = true;
    let mut controller = RestartController::new(
        MockSignals::scripted(&clock, |t| {
            InputSample::IDLE
                .with_engine_running(t <= 200)
                .with_brake_released(t >= 500)
        }),
        outputs,
        MockDelay::new(&clock),
        TimingConfig::default(),
    );

    for _ in 0..4 {
        assert_eq!(controller.tick().unwrap(), TickOutcome::Idle);
    }
    assert!(controller.tick().is_err());

    assert!(!controller.outputs().relay);
    assert_eq!(controller.status().mode, Mode::WaitingForManualStart);
    assert_eq!(controller.status().cranks, 0);
    // engage failed immediately, no crank time spent
    assert_eq!(clock.now_ms(), 500);
}

#[test]
fn relay_release_failure_still_reports_shift_and_records_crank() {
    // Armed at 100ms, stopped with the override on from 500ms
    let clock = SimClock::new();
    let mut outputs = MockOutputs::with_clock(&clock);
    outputs.fail_relay_release = true;
    let mut controller = RestartController::new(
        MockSignals::scripted(&clock, |t| {
            InputSample::IDLE
                .with_engine_running(t <= 200)
                .with_override(t >= 500)
        }),
        outputs,
        MockDelay::new(&clock),
        TimingConfig::default(),
    );
    controller.boot().unwrap();

    for _ in 0..4 {
        assert_eq!(controller.tick().unwrap(), TickOutcome::Idle);
    }
    assert!(controller.tick().is_err());

    // Idle-stop unit must see neutral again, not the faked crank position
    assert_eq!(controller.outputs().shift, ShiftSignal::Neutral);
    let status = controller.status();
    assert_eq!(status.shift, ShiftSignal::Neutral);
    assert_eq!(status.cranks, 1);
    assert_eq!(status.recent_cranks.len(), 1);
    assert_eq!(status.recent_cranks[0].tick, 5);
    assert_eq!(status.recent_cranks[0].report.outcome, CrankOutcome::TimedOut);
    assert!(!status.recent_cranks[0].restarted);
    assert_eq!(status.last_sample, InputSample::IDLE.with_override(true));
    assert_eq!(status.mode, Mode::WaitingForManualStart);
}

#[test]
fn shift_write_failure_surfaces_from_tick() {
    let clock = SimClock::new();
    let mut outputs = MockOutputs::with_clock(&clock);
    outputs.fail_shift_writes = true;
    let mut controller = RestartController::new(
        MockSignals::fixed(InputSample::IDLE),
        outputs,
        MockDelay::new(&clock),
        TimingConfig::default(),
    );

    assert!(controller.boot().is_err());
    assert!(controller.tick().is_err());
    assert_eq!(controller.status().ticks, 1);
}

// ============================================================================
// Boot
// ============================================================================

#[test]
fn brake_released_at_boot_is_not_an_edge() {
    let clock = SimClock::new();
    let mut controller = RestartController::new(
        MockSignals::scripted(&clock, |t| {
            InputSample::IDLE
                .with_brake_released(true)
                .with_engine_running(t == 100)
        }),
        MockOutputs::with_clock(&clock),
        MockDelay::new(&clock),
        TimingConfig::default(),
    );
    controller.boot().unwrap();

    for _ in 0..10 {
        assert_eq!(controller.tick().unwrap(), TickOutcome::Idle);
    }
    assert_eq!(controller.status().mode, Mode::Armed);
}

#[test]
fn into_parts_returns_hardware() {
    let clock = SimClock::new();
    let mut controller = RestartController::new(
        MockSignals::fixed(InputSample::IDLE.with_neutral(true)),
        MockOutputs::with_clock(&clock),
        MockDelay::new(&clock),
        TimingConfig::default(),
    );
    controller.boot().unwrap();
    controller.tick().unwrap();

    let (signals, outputs, delay) = controller.into_parts();
    // construction, boot, one tick
    assert_eq!(signals.reads, 3);
    assert_eq!(outputs.shift_writes().len(), 2);
    assert_eq!(delay.total_ms(), 100);
}
