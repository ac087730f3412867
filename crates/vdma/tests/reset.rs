//! Channel reset through the driver: bounded polling of "reset not done".

#![allow(clippy::unwrap_used)]
#![allow(clippy::arithmetic_side_effects)]

use vdma::config::RESET_POLL;
use vdma::mocks::{HalCall, MockInterruptController, MockVdmaHal, STUCK_RESET};
use vdma::{Direction, IrqId, ResetTimeout, Vdma};

fn driver() -> Vdma<'static, MockVdmaHal> {
    let mut intc = MockInterruptController::new();
    Vdma::new(
        MockVdmaHal::new(MockVdmaHal::default_config(0)),
        0,
        0x1000_0000,
        &mut intc,
        IrqId(61),
        IrqId(62),
    )
    .unwrap()
}

#[test]
fn idle_channel_resets_on_first_poll() {
    let mut vdma = driver();
    vdma.reset_read().unwrap();
    assert_eq!(vdma.hal().reset_samples(Direction::Read), 1);
    assert!(vdma
        .hal()
        .calls()
        .contains(&HalCall::ChannelReset(Direction::Read)));
}

#[test]
fn reset_clearing_just_inside_budget_succeeds() {
    let mut vdma = driver();
    vdma.hal_mut()
        .set_reset_delay(Direction::Write, RESET_POLL - 1);
    vdma.reset_write().unwrap();
    assert_eq!(vdma.hal().reset_samples(Direction::Write), RESET_POLL);
}

#[test]
fn stuck_reset_times_out_after_exactly_reset_poll_samples() {
    let mut vdma = driver();
    vdma.hal_mut().set_reset_delay(Direction::Read, STUCK_RESET);

    assert_eq!(
        vdma.reset_read(),
        Err(ResetTimeout {
            direction: Direction::Read,
            polls: RESET_POLL
        })
    );
    assert_eq!(vdma.hal().reset_samples(Direction::Read), RESET_POLL);
}

#[test]
fn reset_clearing_one_poll_late_times_out() {
    let mut vdma = driver();
    vdma.hal_mut().set_reset_delay(Direction::Write, RESET_POLL);
    assert!(vdma.reset_write().is_err());
}

#[test]
fn timeout_is_not_retried_internally() {
    let mut vdma = driver();
    vdma.hal_mut().set_reset_delay(Direction::Read, STUCK_RESET);
    vdma.hal_mut().clear_calls();

    assert!(vdma.reset_read().is_err());
    assert_eq!(
        vdma.hal().calls(),
        &[HalCall::ChannelReset(Direction::Read)]
    );
}

#[test]
fn directions_reset_independently() {
    let mut vdma = driver();
    vdma.hal_mut().set_reset_delay(Direction::Read, STUCK_RESET);
    assert!(vdma.reset_read().is_err());
    vdma.reset_write().unwrap();
    assert_eq!(vdma.hal().reset_samples(Direction::Write), 1);
}

#[test]
fn reset_stops_a_running_channel() {
    let mut vdma = driver();
    vdma.configure_read(640, 480, 0).unwrap();
    vdma.enable_read().unwrap();
    assert!(vdma.hal().is_running(Direction::Read));

    vdma.reset_read().unwrap();
    assert!(!vdma.hal().is_running(Direction::Read));
}
