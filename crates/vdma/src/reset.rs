//! Channel reset state machine.
//!
//! ```text
//! [Idle] --start()--> [Resetting] --poll(): flag clear--> [Done]
//!                          |
//!                          +--poll(): budget exhausted--> [TimedOut]
//! ```
//!
//! The budget counts polls of the "reset not done" flag, not time, so how
//! long a reset may take scales with CPU and bus speed. A timed-out reset is
//! reported once and never retried here; the caller decides whether to
//! reset again or give up.

use crate::error::ResetTimeout;
use crate::hal::Direction;

/// Reset progress of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetState {
    /// No reset issued
    Idle,
    /// Reset issued, flag still set
    Resetting {
        /// Polls left in the budget
        polls_left: u32,
    },
    /// Flag cleared within the budget
    Done,
    /// Budget exhausted with the flag still set
    TimedOut,
}

/// Bounded poller driving one channel reset to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetPoller {
    direction: Direction,
    budget: u32,
    polls: u32,
    state: ResetState,
}

impl ResetPoller {
    /// Poller for `direction` with a budget of `budget` polls.
    pub const fn new(direction: Direction, budget: u32) -> Self {
        Self {
            direction,
            budget,
            polls: 0,
            state: ResetState::Idle,
        }
    }

    /// Current state.
    pub const fn state(&self) -> ResetState {
        self.state
    }

    /// Polls consumed since [`start`](Self::start).
    pub const fn polls_used(&self) -> u32 {
        self.polls
    }

    /// Mark the reset command as issued. Restarts the budget.
    pub fn start(&mut self) {
        self.polls = 0;
        self.state = match self.budget {
            0 => ResetState::TimedOut,
            polls_left => ResetState::Resetting { polls_left },
        };
    }

    /// Feed one sample of the "reset not done" flag.
    ///
    /// Each call while `Resetting` consumes one poll. Terminal states are
    /// sticky.
    pub fn poll(&mut self, reset_not_done: bool) -> ResetState {
        if let ResetState::Resetting { polls_left } = self.state {
            self.polls = self.polls.saturating_add(1);
            self.state = if !reset_not_done {
                ResetState::Done
            } else if polls_left <= 1 {
                ResetState::TimedOut
            } else {
                ResetState::Resetting {
                    polls_left: polls_left.saturating_sub(1),
                }
            };
        }
        self.state
    }

    /// Drive a reset whose command has just been issued: sample
    /// `reset_not_done` until it clears or the budget runs out.
    ///
    /// Returns the number of polls taken on success.
    pub fn run(&mut self, mut reset_not_done: impl FnMut() -> bool) -> Result<u32, ResetTimeout> {
        self.start();
        while let ResetState::Resetting { .. } = self.state {
            self.poll(reset_not_done());
        }
        match self.state {
            ResetState::Done => Ok(self.polls),
            _ => Err(ResetTimeout {
                direction: self.direction,
                polls: self.polls,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let poller = ResetPoller::new(Direction::Read, 10);
        assert_eq!(poller.state(), ResetState::Idle);
        assert_eq!(poller.polls_used(), 0);
    }

    #[test]
    fn flag_clear_on_first_poll_completes() {
        let mut poller = ResetPoller::new(Direction::Write, 10);
        assert_eq!(poller.run(|| false), Ok(1));
        assert_eq!(poller.state(), ResetState::Done);
    }

    #[test]
    fn flag_clearing_late_within_budget_completes() {
        let mut remaining = 9u32;
        let mut poller = ResetPoller::new(Direction::Read, 10);
        let result = poller.run(|| {
            if remaining == 0 {
                false
            } else {
                remaining = remaining.saturating_sub(1);
                true
            }
        });
        assert_eq!(result, Ok(10));
    }

    #[test]
    fn stuck_flag_times_out_after_full_budget() {
        let mut samples = 0u32;
        let mut poller = ResetPoller::new(Direction::Read, 10);
        let result = poller.run(|| {
            samples = samples.saturating_add(1);
            true
        });
        assert_eq!(
            result,
            Err(ResetTimeout {
                direction: Direction::Read,
                polls: 10
            })
        );
        assert_eq!(samples, 10);
        assert_eq!(poller.state(), ResetState::TimedOut);
    }

    #[test]
    fn terminal_states_are_sticky() {
        let mut poller = ResetPoller::new(Direction::Write, 1);
        poller.start();
        assert_eq!(poller.poll(true), ResetState::TimedOut);
        assert_eq!(poller.poll(false), ResetState::TimedOut);
    }

    #[test]
    fn zero_budget_times_out_without_sampling() {
        let mut sampled = false;
        let mut poller = ResetPoller::new(Direction::Write, 0);
        let result = poller.run(|| {
            sampled = true;
            false
        });
        assert!(result.is_err());
        assert!(!sampled);
    }

    #[test]
    fn restart_resets_budget() {
        let mut poller = ResetPoller::new(Direction::Read, 3);
        assert!(poller.run(|| true).is_err());
        assert_eq!(poller.run(|| false), Ok(1));
    }
}
