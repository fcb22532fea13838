#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! One-shot debug key that reveals the collision overlay.
//!
//! The toggle starts armed. The first debug key press moves it to triggered and
//! emits [`Command::EnableDebugOverlay`]; once triggered it ignores every
//! further press, so the overlay can never be hidden again in a session.

use cypher_town_core::Command;

/// State of the one-shot debug binding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebugOverlayToggle {
    /// Waiting for the first debug key press.
    #[default]
    Armed,
    /// The overlay has been requested; later presses are ignored.
    Triggered,
}

impl DebugOverlayToggle {
    /// Feeds the debug key state observed this frame into the state machine.
    ///
    /// Returns `true` on the single transition from armed to triggered.
    pub fn observe(&mut self, key_pressed: bool) -> bool {
        match (*self, key_pressed) {
            (Self::Armed, true) => {
                *self = Self::Triggered;
                true
            }
            _ => false,
        }
    }

    /// Observes the key and emits the enable command when the toggle fires.
    pub fn handle(&mut self, key_pressed: bool, out: &mut Vec<Command>) {
        if self.observe(key_pressed) {
            log::info!("collision debug overlay enabled");
            out.push(Command::EnableDebugOverlay);
        }
    }

    /// Reports whether the overlay has been requested.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        matches!(self, Self::Triggered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_sequence(sequence: &[bool]) -> (Vec<bool>, Vec<Command>) {
        let mut toggle = DebugOverlayToggle::default();
        let mut fired = Vec::new();
        let mut commands = Vec::new();
        for &pressed in sequence {
            let before = commands.len();
            toggle.handle(pressed, &mut commands);
            fired.push(commands.len() > before);
        }
        (fired, commands)
    }

    #[test]
    fn starts_armed() {
        let toggle = DebugOverlayToggle::default();

        assert_eq!(toggle, DebugOverlayToggle::Armed);
        assert!(!toggle.is_triggered());
    }

    #[test]
    fn fires_only_on_first_press() {
        let (fired, commands) = run_sequence(&[false, true, false, true, true]);

        assert_eq!(fired, vec![false, true, false, false, false]);
        assert_eq!(commands, vec![Command::EnableDebugOverlay]);
    }

    #[test]
    fn without_presses_nothing_fires() {
        let (fired, commands) = run_sequence(&[false, false, false]);

        assert!(fired.iter().all(|fired| !fired));
        assert!(commands.is_empty());
    }

    #[test]
    fn triggered_state_is_idempotent() {
        let mut toggle = DebugOverlayToggle::Triggered;

        assert!(!toggle.observe(true));
        assert!(!toggle.observe(false));
        assert!(toggle.is_triggered());
    }
}
