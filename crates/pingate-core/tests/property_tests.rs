//! Property-based tests for the PIN entry machine using proptest
//!
//! These tests verify invariants that should hold for any input sequence.

use std::time::Duration;

use pingate_core::{EntryAction, EntryPhase, FeedbackState, PinColor, PinEntryMachine, PIN_LENGTH};
use proptest::prelude::*;
use tokio::time::Instant;

#[derive(Debug, Clone)]
enum Input {
    Digit(char),
    Delete,
    Wait(u64),
    Verdict(bool),
}

fn arb_input() -> impl Strategy<Value = Input> {
    prop_oneof![
        4 => prop::char::range('0', '9').prop_map(Input::Digit),
        1 => Just(Input::Delete),
        2 => (0u64..400).prop_map(Input::Wait),
        1 => any::<bool>().prop_map(Input::Verdict),
    ]
}

/// Apply inputs, returning how many verify actions were handed out
fn drive(machine: &mut PinEntryMachine, inputs: &[Input], start: Instant) -> usize {
    let mut now = start;
    let mut verifications = 0;
    for input in inputs {
        match input {
            Input::Digit(c) => {
                machine.input_digit(*c, now);
            }
            Input::Delete => {
                machine.delete_digit();
            }
            Input::Wait(ms) => {
                now += Duration::from_millis(*ms);
            }
            Input::Verdict(ok) => {
                machine.resolve(*ok, now);
            }
        }
        if let Some(EntryAction::Verify(_)) = machine.poll(now) {
            verifications += 1;
        }
    }
    verifications
}

proptest! {
    #[test]
    fn prop_short_sequences_never_validate(
        digits in prop::collection::vec(prop::char::range('0', '9'), 0..PIN_LENGTH),
        wait_ms in 0u64..10_000,
    ) {
        let mut machine = PinEntryMachine::default();
        let start = Instant::now();
        for c in &digits {
            machine.input_digit(*c, start);
        }
        prop_assert_eq!(machine.poll(start + Duration::from_millis(wait_ms)), None);
        prop_assert!(machine.deadline().is_none());
    }

    #[test]
    fn prop_full_sequence_validates_exactly_once(
        gaps in prop::collection::vec(0u64..1_000, PIN_LENGTH),
        extra_polls in 1usize..20,
    ) {
        let mut machine = PinEntryMachine::default();
        let mut now = Instant::now();
        for gap in &gaps {
            now += Duration::from_millis(*gap);
            machine.input_digit('7', now);
        }

        let mut verifications = 0;
        prop_assert!(machine.poll(now + Duration::from_millis(299)).is_none());
        for i in 0..extra_polls {
            let at = now + Duration::from_millis(300 + i as u64 * 50);
            if machine.poll(at).is_some() {
                verifications += 1;
            }
        }
        prop_assert_eq!(verifications, 1);
    }

    #[test]
    fn prop_buffer_stays_bounded(inputs in prop::collection::vec(arb_input(), 0..200)) {
        let mut machine = PinEntryMachine::default();
        let start = Instant::now();
        let mut now = start;
        for input in &inputs {
            drive(&mut machine, std::slice::from_ref(input), now);
            if let Input::Wait(ms) = input {
                now += Duration::from_millis(*ms);
            }
            prop_assert!(machine.len() <= PIN_LENGTH);
        }
    }

    #[test]
    fn prop_focus_regain_always_yields_idle(
        inputs in prop::collection::vec(arb_input(), 0..100),
    ) {
        let mut machine = PinEntryMachine::default();
        let start = Instant::now();
        drive(&mut machine, &inputs, start);

        machine.reset();
        prop_assert_eq!(machine.phase(), EntryPhase::Idle);
        prop_assert!(machine.is_empty());
        prop_assert_eq!(machine.feedback(), &FeedbackState::Neutral);
        prop_assert_eq!(machine.color(), PinColor::Normal);
        prop_assert!(machine.deadline().is_none());
    }

    #[test]
    fn prop_rejection_drains_within_bound(digit in prop::char::range('0', '9')) {
        let mut machine = PinEntryMachine::default();
        let start = Instant::now();
        for _ in 0..PIN_LENGTH {
            machine.input_digit(digit, start);
        }
        let verified_at = start + Duration::from_millis(300);
        prop_assert!(machine.poll(verified_at).is_some());
        machine.resolve(false, verified_at);

        let bound = verified_at + Duration::from_millis(25 * PIN_LENGTH as u64);
        let mut now = verified_at;
        while now < bound && !machine.is_empty() {
            now = machine.deadline().unwrap_or(bound);
            machine.poll(now);
        }
        prop_assert!(machine.is_empty());
        prop_assert!(now <= bound);
        prop_assert_eq!(
            machine.feedback(),
            &FeedbackState::Rejected(pingate_core::INCORRECT_PIN_MESSAGE.to_string())
        );
    }
}
