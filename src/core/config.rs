use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::core::dispatch::DispatchTable;
use crate::core::error::{Error, Result};
use crate::core::state::{GameState, UpdateOp};

/// Startup settings for a [`Manager`](crate::core::manager::Manager).
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    /// State the manager is created in.
    pub initial_state: GameState,
    /// Where `resume` goes when no state has been saved.
    pub return_state: GameState,
    /// Entered once by `Manager::start`, if set.
    pub boot_state: Option<GameState>,
    /// Complete state-to-update table. Uses the standard table when absent.
    pub dispatch: Option<DispatchEntries>,
}

/// Dispatch table entries as written in the config, repeats included, so
/// that a state mapped twice is caught when the table is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchEntries(pub Vec<(GameState, UpdateOp)>);

impl FromIterator<(GameState, UpdateOp)> for DispatchEntries {
    fn from_iter<I: IntoIterator<Item = (GameState, UpdateOp)>>(iter: I) -> Self {
        DispatchEntries(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for DispatchEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = DispatchEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from state to update op")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((state, op)) = map.next_entry::<GameState, UpdateOp>()? {
                    entries.push((state, op));
                }
                Ok(DispatchEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            initial_state: GameState::Init,
            return_state: GameState::InLevel,
            boot_state: None,
            dispatch: None,
        }
    }
}

impl ManagerConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Builds the dispatch table, failing on any unmapped or repeated state.
    pub fn dispatch_table(&self) -> Result<DispatchTable> {
        match &self.dispatch {
            None => Ok(DispatchTable::standard()),
            Some(DispatchEntries(entries)) => entries
                .iter()
                .fold(DispatchTable::builder(), |b, &(state, op)| b.map(state, op))
                .build(),
        }
    }
}

/// Settings for the fixed-rate tick driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub tick_rate_ms: u64,
    /// Stop after this many ticks; `0` runs until interrupted.
    pub max_ticks: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 16,
            max_ticks: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = ManagerConfig::from_json("{}").unwrap();
        assert_eq!(config.initial_state, GameState::Init);
        assert_eq!(config.return_state, GameState::InLevel);
        assert_eq!(config.boot_state, None);
        assert_eq!(config.dispatch_table().unwrap(), DispatchTable::standard());
    }

    #[test]
    fn partial_dispatch_table_is_a_config_error() {
        let config = ManagerConfig::from_json(
            r#"{ "boot_state": "in_level", "dispatch": { "init": "init", "paused": "paused" } }"#,
        )
        .unwrap();
        assert_eq!(config.boot_state, Some(GameState::InLevel));
        assert!(matches!(config.dispatch_table(), Err(Error::UnmappedState(_))));
    }

    #[test]
    fn full_dispatch_table_is_accepted() {
        let config = ManagerConfig::from_json(
            r#"{
                "dispatch": {
                    "init": "init",
                    "main_menu": "main_menu",
                    "level_loading": "level_loading",
                    "level_starting": "in_level",
                    "in_level": "in_level",
                    "level_ending": "in_level",
                    "paused": "paused"
                }
            }"#,
        )
        .unwrap();
        let table = config.dispatch_table().unwrap();
        assert_eq!(table.resolve(GameState::LevelStarting), UpdateOp::InLevel);
    }

    #[test]
    fn repeated_state_in_dispatch_is_rejected() {
        let config = ManagerConfig::from_json(
            r#"{
                "dispatch": {
                    "init": "init",
                    "main_menu": "main_menu",
                    "level_loading": "level_loading",
                    "level_starting": "level_starting",
                    "in_level": "in_level",
                    "level_ending": "level_ending",
                    "paused": "paused",
                    "paused": "in_level"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.dispatch.as_ref().map(|d| d.0.len()), Some(8));
        assert!(matches!(
            config.dispatch_table(),
            Err(Error::DuplicateMapping(GameState::Paused))
        ));
    }

    #[test]
    fn unknown_state_name_fails_to_parse() {
        assert!(matches!(
            ManagerConfig::from_json(r#"{ "initial_state": "credits" }"#),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ManagerConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
