pub mod director;
pub mod overlay;
pub mod spinner;

use std::cell::RefCell;
use std::rc::Rc;

pub use director::{Cue, CueAction, Director};
pub use overlay::PauseOverlay;
pub use spinner::Spinner;

use crate::core::manager::Manager;
use crate::core::state::GameState;

/// Owners of the demo objects. The manager only holds weak handles, so the
/// scene has to outlive the ticks that use them.
pub struct Scene {
    pub spinners: Vec<Rc<RefCell<Spinner>>>,
    pub overlay: Rc<RefCell<PauseOverlay>>,
    pub director: Rc<RefCell<Director>>,
}

impl Scene {
    /// A level with two spinners, a pause overlay, and a director that pauses
    /// and resumes a few times before ending the level.
    pub fn demo() -> Self {
        let cues = vec![
            Cue { at_tick: 1, action: CueAction::Enter(GameState::LevelStarting) },
            Cue { at_tick: 2, action: CueAction::Enter(GameState::InLevel) },
            Cue { at_tick: 10, action: CueAction::Pause },
            Cue { at_tick: 15, action: CueAction::Resume },
            Cue { at_tick: 30, action: CueAction::Enter(GameState::LevelEnding) },
            Cue { at_tick: 31, action: CueAction::Exit },
        ];
        Self {
            spinners: vec![
                Rc::new(RefCell::new(Spinner::new(3.0))),
                Rc::new(RefCell::new(Spinner::new(-1.5))),
            ],
            overlay: Rc::new(RefCell::new(PauseOverlay::new(4))),
            director: Rc::new(RefCell::new(Director::new(cues))),
        }
    }

    pub fn register_all(&self, manager: &mut Manager) {
        manager.register_object(&self.director);
        for spinner in &self.spinners {
            manager.register_object(spinner);
        }
        manager.register_object(&self.overlay);
    }
}
