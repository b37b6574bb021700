//! PIN entry state machine
//!
//! The machine is pure: it never sleeps and never calls the verifier. Time is
//! passed in, pending timers are exposed as a single [`deadline`], and the
//! owner calls [`poll`] once the deadline passes. Dropping or resetting the
//! machine drops its timers with it.
//!
//! ```text
//! Idle -> Entering -> Validating -> Accepted
//!                          |
//!                          +-> Draining -> Idle (Rejected feedback)
//! ```
//!
//! [`deadline`]: PinEntryMachine::deadline
//! [`poll`]: PinEntryMachine::poll

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::GateConfig;
use crate::pin::{Pin, PinBuffer};

/// Message shown once a rejected PIN has fully drained
pub const INCORRECT_PIN_MESSAGE: &str = "Incorrect PIN Code. Try again.";

/// User-facing result of the last attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FeedbackState {
    #[default]
    Neutral,
    Rejected(String),
}

/// Colour of the PIN dots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PinColor {
    #[default]
    Normal,
    Error,
}

/// Observable phase of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPhase {
    /// Empty buffer, nothing pending
    Idle,
    /// Accepting digits
    Entering,
    /// Buffer full; waiting for the debounce or for a verdict
    Validating,
    /// Rejected; removing one character per tick
    Draining,
    /// Verified; the machine accepts nothing further
    Accepted,
}

/// Work the owner must perform on the machine's behalf
#[derive(Debug, PartialEq, Eq)]
pub enum EntryAction {
    /// Run the verifier on this candidate and report back via `resolve`
    Verify(Pin),
}

/// Timer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTimings {
    /// Delay between the final digit and validation
    pub debounce: Duration,
    /// Interval between removed characters after a rejection
    pub drain_interval: Duration,
}

impl Default for EntryTimings {
    fn default() -> Self {
        Self::from(&GateConfig::default())
    }
}

impl From<&GateConfig> for EntryTimings {
    fn from(config: &GateConfig) -> Self {
        Self {
            debounce: config.debounce(),
            drain_interval: config.drain_interval(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Entering,
    Debouncing { due: Instant },
    Verifying,
    Draining { next: Instant },
    Accepted,
}

/// Accumulates digits and drives validation and rejection feedback
#[derive(Debug)]
pub struct PinEntryMachine {
    timings: EntryTimings,
    buffer: PinBuffer,
    feedback: FeedbackState,
    color: PinColor,
    phase: Phase,
}

impl PinEntryMachine {
    pub fn new(timings: EntryTimings) -> Self {
        Self {
            timings,
            buffer: PinBuffer::new(),
            feedback: FeedbackState::Neutral,
            color: PinColor::Normal,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> EntryPhase {
        match self.phase {
            Phase::Idle => EntryPhase::Idle,
            Phase::Entering => EntryPhase::Entering,
            Phase::Debouncing { .. } | Phase::Verifying => EntryPhase::Validating,
            Phase::Draining { .. } => EntryPhase::Draining,
            Phase::Accepted => EntryPhase::Accepted,
        }
    }

    pub fn feedback(&self) -> &FeedbackState {
        &self.feedback
    }

    pub fn color(&self) -> PinColor {
        self.color
    }

    /// Number of digits currently in the buffer
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// When the owner must next call [`poll`](Self::poll), if ever
    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Debouncing { due } => Some(due),
            Phase::Draining { next } => Some(next),
            _ => None,
        }
    }

    /// Append a digit. Returns whether it was taken.
    pub fn input_digit(&mut self, c: char, now: Instant) -> bool {
        if !matches!(self.phase, Phase::Idle | Phase::Entering) {
            return false;
        }
        if !self.buffer.push(c) {
            return false;
        }

        self.feedback = FeedbackState::Neutral;
        self.color = PinColor::Normal;
        self.phase = if self.buffer.is_full() {
            Phase::Debouncing {
                due: now + self.timings.debounce,
            }
        } else {
            Phase::Entering
        };
        true
    }

    /// Remove the last digit while entering. Returns whether one was removed.
    pub fn delete_digit(&mut self) -> bool {
        if self.phase != Phase::Entering || !self.buffer.pop() {
            return false;
        }
        self.feedback = FeedbackState::Neutral;
        self.color = PinColor::Normal;
        if self.buffer.is_empty() {
            self.phase = Phase::Idle;
        }
        true
    }

    /// Advance any timer that is due at `now`
    pub fn poll(&mut self, now: Instant) -> Option<EntryAction> {
        match self.phase {
            Phase::Debouncing { due } if now >= due => {
                self.phase = Phase::Verifying;
                match self.buffer.to_pin() {
                    Some(pin) => Some(EntryAction::Verify(pin)),
                    None => {
                        self.reset();
                        None
                    }
                }
            }
            Phase::Draining { mut next } if now >= next => {
                while now >= next {
                    if !self.drain_one() {
                        return None;
                    }
                    next += self.timings.drain_interval;
                }
                self.phase = Phase::Draining { next };
                None
            }
            _ => None,
        }
    }

    /// Report the verifier's verdict for the candidate handed out by `poll`
    ///
    /// Returns true when the verdict was applied; a verdict arriving after a
    /// reset is ignored.
    pub fn resolve(&mut self, accepted: bool, now: Instant) -> bool {
        if self.phase != Phase::Verifying {
            return false;
        }

        if accepted {
            info!("PIN accepted");
            self.buffer.clear();
            self.feedback = FeedbackState::Neutral;
            self.color = PinColor::Normal;
            self.phase = Phase::Accepted;
        } else {
            info!("PIN rejected");
            self.color = PinColor::Error;
            if self.drain_one() {
                self.phase = Phase::Draining {
                    next: now + self.timings.drain_interval,
                };
            }
        }
        true
    }

    /// Return to Idle, discarding the buffer, feedback, and pending timers
    pub fn reset(&mut self) {
        if self.phase != Phase::Idle || !self.buffer.is_empty() {
            debug!("Entry machine reset from {:?}", self.phase());
        }
        self.buffer.clear();
        self.feedback = FeedbackState::Neutral;
        self.color = PinColor::Normal;
        self.phase = Phase::Idle;
    }

    /// Remove one character. Returns false once the buffer is empty, at
    /// which point the rejection message is shown and the machine is Idle.
    fn drain_one(&mut self) -> bool {
        self.buffer.pop();
        if self.buffer.is_empty() {
            self.feedback = FeedbackState::Rejected(INCORRECT_PIN_MESSAGE.to_string());
            self.phase = Phase::Idle;
            return false;
        }
        true
    }
}

impl Default for PinEntryMachine {
    fn default() -> Self {
        Self::new(EntryTimings::default())
    }
}
