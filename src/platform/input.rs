//! Input mapping
//!
//! Keyboard (Space / ArrowUp) and pointer presses both mean "start" on the
//! start screen and "jump" during a run. The host collects presses between
//! frames and hands them to the next simulation step.

use crate::sim::{GamePhase, TickInput};

/// What a press does in the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Jump,
}

/// `KeyboardEvent.code` values that act as the action button
#[inline]
pub fn is_action_key(code: &str) -> bool {
    matches!(code, "Space" | "ArrowUp")
}

/// Meaning of a press in `phase` (game over waits for the restart button)
pub fn action_for(phase: GamePhase) -> Option<Action> {
    match phase {
        GamePhase::Ready => Some(Action::Start),
        GamePhase::Playing => Some(Action::Jump),
        GamePhase::GameOver => None,
    }
}

/// Presses latched until the next simulation step consumes them
#[derive(Debug, Clone, Default)]
pub struct InputLatch {
    pending: TickInput,
}

impl InputLatch {
    /// Record a press; returns the action it mapped to
    pub fn press(&mut self, phase: GamePhase) -> Option<Action> {
        let action = action_for(phase)?;
        match action {
            Action::Start => self.pending.start = true,
            Action::Jump => self.pending.jump = true,
        }
        Some(action)
    }

    /// Hand the latched input to a step and clear it
    pub fn take(&mut self) -> TickInput {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending = TickInput::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_keys() {
        assert!(is_action_key("Space"));
        assert!(is_action_key("ArrowUp"));
        assert!(!is_action_key("ArrowDown"));
        assert!(!is_action_key("KeyW"));
    }

    #[test]
    fn test_press_maps_by_phase() {
        let mut latch = InputLatch::default();
        assert_eq!(latch.press(GamePhase::Ready), Some(Action::Start));
        let input = latch.take();
        assert!(input.start && !input.jump);

        assert_eq!(latch.press(GamePhase::Playing), Some(Action::Jump));
        let input = latch.take();
        assert!(input.jump && !input.start);

        assert_eq!(latch.press(GamePhase::GameOver), None);
        let input = latch.take();
        assert!(!input.jump && !input.start);
    }

    #[test]
    fn test_take_is_one_shot() {
        let mut latch = InputLatch::default();
        latch.press(GamePhase::Playing);
        assert!(latch.take().jump);
        assert!(!latch.take().jump);
    }
}
