use tracing::{debug, info};

use crate::core::state::GameState;

/// Observer of state transitions. Both callbacks default to no-ops.
pub trait StateHook {
    /// Runs before `from` is left.
    fn on_leave(&mut self, _from: GameState, _to: GameState) {}

    /// Runs after `to` has become current.
    fn on_enter(&mut self, _from: GameState, _to: GameState) {}
}

/// Current state plus a LIFO stack of saved states.
pub struct StateMachine {
    current: GameState,
    stack: Vec<GameState>,
    return_state: GameState,
    hooks: Vec<Box<dyn StateHook>>,
}

impl StateMachine {
    /// `return_state` is where [`StateMachine::return_to_previous`] goes when
    /// nothing has been saved.
    pub fn new(initial: GameState, return_state: GameState) -> Self {
        Self {
            current: initial,
            stack: Vec::new(),
            return_state,
            hooks: Vec::new(),
        }
    }

    pub fn current(&self) -> GameState {
        self.current
    }

    pub fn has_previous(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Most recently saved state, if any.
    pub fn previous(&self) -> Option<GameState> {
        self.stack.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn return_state(&self) -> GameState {
        self.return_state
    }

    pub fn add_hook(&mut self, hook: Box<dyn StateHook>) {
        self.hooks.push(hook);
    }

    /// Moves to `next`, saving the state being left when `save_current` is set.
    ///
    /// Leave hooks run before the switch and enter hooks after it, both before
    /// this returns. Transitioning to the current state is still a full
    /// transition.
    pub fn transition(&mut self, next: GameState, save_current: bool) {
        let from = self.current;
        for hook in self.hooks.iter_mut() {
            hook.on_leave(from, next);
        }

        if save_current {
            self.stack.push(from);
        }
        self.current = next;
        info!(from=%from, to=%next, saved=save_current, depth=self.stack.len(), "state transition");

        for hook in self.hooks.iter_mut() {
            hook.on_enter(from, next);
        }
    }

    /// Pops the last saved state and enters it, or the return state when the
    /// stack is empty. Returns the state entered.
    pub fn return_to_previous(&mut self) -> GameState {
        let next = match self.stack.pop() {
            Some(saved) => saved,
            None => {
                debug!(fallback=%self.return_state, "no saved state; using fallback");
                self.return_state
            }
        };
        self.transition(next, false);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl StateHook for Recorder {
        fn on_leave(&mut self, from: GameState, to: GameState) {
            self.0.borrow_mut().push(format!("leave {from} -> {to}"));
        }

        fn on_enter(&mut self, from: GameState, to: GameState) {
            self.0.borrow_mut().push(format!("enter {from} -> {to}"));
        }
    }

    #[test]
    fn save_then_return_restores_state() {
        let mut fsm = StateMachine::new(GameState::InLevel, GameState::InLevel);
        fsm.transition(GameState::MainMenu, true);
        assert_eq!(fsm.current(), GameState::MainMenu);
        assert!(fsm.has_previous());
        assert_eq!(fsm.depth(), 1);

        assert_eq!(fsm.return_to_previous(), GameState::InLevel);
        assert_eq!(fsm.current(), GameState::InLevel);
        assert!(!fsm.has_previous());
    }

    #[test]
    fn unsaved_transition_leaves_stack_alone() {
        let mut fsm = StateMachine::new(GameState::Init, GameState::InLevel);
        fsm.transition(GameState::MainMenu, false);
        assert!(!fsm.has_previous());
        assert_eq!(fsm.previous(), None);
    }

    #[test]
    fn empty_stack_falls_back_to_return_state() {
        let mut fsm = StateMachine::new(GameState::Paused, GameState::LevelStarting);
        assert_eq!(fsm.return_to_previous(), GameState::LevelStarting);
        assert_eq!(fsm.current(), GameState::LevelStarting);
        assert!(!fsm.has_previous());
    }

    #[test]
    fn stack_is_lifo() {
        let mut fsm = StateMachine::new(GameState::Init, GameState::InLevel);
        fsm.transition(GameState::MainMenu, true);
        fsm.transition(GameState::LevelLoading, true);
        fsm.transition(GameState::Paused, true);
        assert_eq!(fsm.previous(), Some(GameState::LevelLoading));

        assert_eq!(fsm.return_to_previous(), GameState::LevelLoading);
        assert_eq!(fsm.return_to_previous(), GameState::MainMenu);
        assert_eq!(fsm.return_to_previous(), GameState::Init);
        assert_eq!(fsm.depth(), 0);
    }

    #[test]
    fn hooks_run_leave_then_enter_even_for_same_state() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut fsm = StateMachine::new(GameState::InLevel, GameState::InLevel);
        fsm.add_hook(Box::new(Recorder(log.clone())));

        fsm.transition(GameState::InLevel, false);
        fsm.transition(GameState::Paused, true);
        fsm.return_to_previous();

        assert_eq!(
            *log.borrow(),
            vec![
                "leave in_level -> in_level",
                "enter in_level -> in_level",
                "leave in_level -> paused",
                "enter in_level -> paused",
                "leave paused -> in_level",
                "enter paused -> in_level",
            ]
        );
    }
}
