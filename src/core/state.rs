use std::fmt;

use serde::{Deserialize, Serialize};

/// Overall mode the game is in. Exactly one is current at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Init,
    MainMenu,
    LevelLoading,
    LevelStarting,
    InLevel,
    LevelEnding,
    Paused,
}

impl GameState {
    /// Every state, in declaration order. New states must be added here too.
    pub const ALL: [GameState; 7] = [
        GameState::Init,
        GameState::MainMenu,
        GameState::LevelLoading,
        GameState::LevelStarting,
        GameState::InLevel,
        GameState::LevelEnding,
        GameState::Paused,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`GameState::ALL`]; used to index dispatch tables.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameState::Init => "init",
            GameState::MainMenu => "main_menu",
            GameState::LevelLoading => "level_loading",
            GameState::LevelStarting => "level_starting",
            GameState::InLevel => "in_level",
            GameState::LevelEnding => "level_ending",
            GameState::Paused => "paused",
        }
    }
}

// `ALL` must list every variant in declaration order; `index` relies on it.
const _: () = {
    let mut i = 0;
    while i < GameState::COUNT {
        assert!(GameState::ALL[i] as usize == i);
        i += 1;
    }
    assert!(GameState::Paused as usize + 1 == GameState::COUNT);
};

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects which [`Registrant`](crate::core::registrant::Registrant) update
/// method a tick invokes. One variant per update method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOp {
    Init,
    MainMenu,
    LevelLoading,
    LevelStarting,
    InLevel,
    LevelEnding,
    Paused,
}

impl UpdateOp {
    /// The op a state dispatches to unless a table says otherwise.
    pub fn namesake(state: GameState) -> Self {
        match state {
            GameState::Init => UpdateOp::Init,
            GameState::MainMenu => UpdateOp::MainMenu,
            GameState::LevelLoading => UpdateOp::LevelLoading,
            GameState::LevelStarting => UpdateOp::LevelStarting,
            GameState::InLevel => UpdateOp::InLevel,
            GameState::LevelEnding => UpdateOp::LevelEnding,
            GameState::Paused => UpdateOp::Paused,
        }
    }

    pub fn method_name(self) -> &'static str {
        match self {
            UpdateOp::Init => "update_init",
            UpdateOp::MainMenu => "update_main_menu",
            UpdateOp::LevelLoading => "update_level_loading",
            UpdateOp::LevelStarting => "update_level_starting",
            UpdateOp::InLevel => "update_in_level",
            UpdateOp::LevelEnding => "update_level_ending",
            UpdateOp::Paused => "update_paused",
        }
    }
}

impl fmt::Display for UpdateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_position_in_all() {
        for (i, state) in GameState::ALL.iter().enumerate() {
            assert_eq!(state.index(), i);
        }
    }

    #[test]
    fn all_covers_every_variant() {
        let listed = |state: GameState| match state {
            GameState::Init
            | GameState::MainMenu
            | GameState::LevelLoading
            | GameState::LevelStarting
            | GameState::InLevel
            | GameState::LevelEnding
            | GameState::Paused => GameState::ALL.contains(&state),
        };
        assert!(GameState::ALL.into_iter().all(listed));
        assert_eq!(GameState::Paused.index(), GameState::COUNT - 1);
    }

    #[test]
    fn serde_names_are_snake_case() {
        let json = serde_json::to_string(&GameState::LevelLoading).unwrap();
        assert_eq!(json, "\"level_loading\"");
        let op: UpdateOp = serde_json::from_str("\"in_level\"").unwrap();
        assert_eq!(op, UpdateOp::InLevel);
    }
}
