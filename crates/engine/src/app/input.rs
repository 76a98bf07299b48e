use winit::event::ElementState;

/// Continuous-hold actions, sampled every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Quit,
}

const ACTION_COUNT: usize = 4;

/// Edge-triggered presses: reported for exactly one tick per physical press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEdge {
    Confirm,
    /// Enter only, so the jump key never picks a menu item.
    MenuSelect,
    MenuToggle,
    MenuUp,
    MenuDown,
}

const EDGE_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Quit => 3,
        }
    }
}

impl InputEdge {
    const fn index(self) -> usize {
        match self {
            InputEdge::Confirm => 0,
            InputEdge::MenuSelect => 1,
            InputEdge::MenuToggle => 2,
            InputEdge::MenuUp => 3,
            InputEdge::MenuDown => 4,
        }
    }
}

/// Presses collected between ticks. OS key repeats are ignored, so each
/// physical press is reported once no matter which other keys are held.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EdgeStates {
    pressed: [bool; EDGE_COUNT],
}

impl EdgeStates {
    pub(crate) fn handle(&mut self, edge: InputEdge, state: ElementState, repeat: bool) {
        if state == ElementState::Pressed && !repeat {
            self.pressed[edge.index()] = true;
        }
    }

    pub(crate) fn was_pressed(&self, edge: InputEdge) -> bool {
        self.pressed[edge.index()]
    }

    pub(crate) fn with_pressed(mut self, edge: InputEdge, pressed: bool) -> Self {
        self.pressed[edge.index()] = pressed;
        self
    }

    /// Returns the presses collected since the last call and clears them.
    pub(crate) fn take_pressed(&mut self) -> Self {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_states_track_each_action_independently() {
        let mut states = ActionStates::default();
        states.set(InputAction::MoveLeft, true);
        states.set(InputAction::Jump, true);
        states.set(InputAction::Jump, false);

        assert!(states.is_down(InputAction::MoveLeft));
        assert!(!states.is_down(InputAction::MoveRight));
        assert!(!states.is_down(InputAction::Jump));
    }

    #[test]
    fn held_key_does_not_repeat_edge() {
        let mut edges = EdgeStates::default();

        edges.handle(InputEdge::Confirm, ElementState::Pressed, false);
        assert!(edges.take_pressed().was_pressed(InputEdge::Confirm));

        edges.handle(InputEdge::Confirm, ElementState::Pressed, true);
        assert!(!edges.take_pressed().was_pressed(InputEdge::Confirm));

        edges.handle(InputEdge::Confirm, ElementState::Released, false);
        edges.handle(InputEdge::Confirm, ElementState::Pressed, false);
        assert!(edges.take_pressed().was_pressed(InputEdge::Confirm));
    }

    #[test]
    fn releasing_one_confirm_key_does_not_rearm_another() {
        let mut edges = EdgeStates::default();
        edges.handle(InputEdge::Confirm, ElementState::Pressed, false);
        edges.handle(InputEdge::Confirm, ElementState::Pressed, false);
        assert!(edges.take_pressed().was_pressed(InputEdge::Confirm));

        edges.handle(InputEdge::Confirm, ElementState::Released, false);
        edges.handle(InputEdge::Confirm, ElementState::Pressed, true);
        assert!(!edges.take_pressed().was_pressed(InputEdge::Confirm));
    }

    #[test]
    fn edges_are_tracked_per_key() {
        let mut edges = EdgeStates::default();
        edges.handle(InputEdge::MenuToggle, ElementState::Pressed, false);

        let taken = edges.take_pressed();
        assert!(taken.was_pressed(InputEdge::MenuToggle));
        assert!(!taken.was_pressed(InputEdge::Confirm));
        assert!(!taken.was_pressed(InputEdge::MenuDown));
    }
}
