//! State to update-operation resolution and per-tick dispatch.

use std::panic::{self, AssertUnwindSafe};

use tracing::{error, trace, warn};

use crate::core::command::ManagerHandle;
use crate::core::error::{Error, Result};
use crate::core::registrant::{display_name, Context, Registrant, RegistrantRef};
use crate::core::state::{GameState, UpdateOp};

impl UpdateOp {
    /// Calls the matching update method on `registrant`.
    pub fn invoke(self, registrant: &mut dyn Registrant, ctx: &Context<'_>) -> anyhow::Result<()> {
        match self {
            UpdateOp::Init => registrant.update_init(ctx),
            UpdateOp::MainMenu => registrant.update_main_menu(ctx),
            UpdateOp::LevelLoading => registrant.update_level_loading(ctx),
            UpdateOp::LevelStarting => registrant.update_level_starting(ctx),
            UpdateOp::InLevel => registrant.update_in_level(ctx),
            UpdateOp::LevelEnding => registrant.update_level_ending(ctx),
            UpdateOp::Paused => registrant.update_paused(ctx),
        }
    }
}

/// Total mapping from every [`GameState`] to exactly one [`UpdateOp`].
///
/// Only obtainable through [`DispatchTableBuilder::build`] or
/// [`DispatchTable::standard`], so a table in hand is always complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTable {
    ops: [UpdateOp; GameState::COUNT],
}

impl DispatchTable {
    /// Each state dispatches to its namesake update method.
    pub fn standard() -> Self {
        Self {
            ops: GameState::ALL.map(UpdateOp::namesake),
        }
    }

    pub fn builder() -> DispatchTableBuilder {
        DispatchTableBuilder::default()
    }

    pub fn resolve(&self, state: GameState) -> UpdateOp {
        self.ops[state.index()]
    }

    pub fn entries(&self) -> impl Iterator<Item = (GameState, UpdateOp)> + '_ {
        GameState::ALL
            .into_iter()
            .map(move |state| (state, self.resolve(state)))
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Default)]
pub struct DispatchTableBuilder {
    entries: Vec<(GameState, UpdateOp)>,
}

impl DispatchTableBuilder {
    pub fn map(mut self, state: GameState, op: UpdateOp) -> Self {
        self.entries.push((state, op));
        self
    }

    /// Fails if any state is left unmapped or is mapped twice.
    pub fn build(self) -> Result<DispatchTable> {
        let mut slots: [Option<UpdateOp>; GameState::COUNT] = [None; GameState::COUNT];
        for (state, op) in self.entries {
            let slot = &mut slots[state.index()];
            if slot.is_some() {
                return Err(Error::DuplicateMapping(state));
            }
            *slot = Some(op);
        }

        let mut ops = [UpdateOp::Init; GameState::COUNT];
        for state in GameState::ALL {
            ops[state.index()] = slots[state.index()].ok_or(Error::UnmappedState(state))?;
        }
        Ok(DispatchTable { ops })
    }
}

/// One registrant whose update failed during a tick.
#[derive(Debug, Clone)]
pub struct DispatchFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of a single tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub state: GameState,
    pub op: UpdateOp,
    /// Registrants whose update ran to completion.
    pub invoked: usize,
    /// Snapshot entries whose owner had already dropped them.
    pub skipped: usize,
    pub failures: Vec<DispatchFailure>,
}

/// Runs the resolved update over a registry snapshot.
pub struct Dispatcher {
    table: DispatchTable,
}

impl Dispatcher {
    pub fn new(table: DispatchTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn resolve(&self, state: GameState) -> UpdateOp {
        self.table.resolve(state)
    }

    /// Invokes the op for `state` on every entry of `snapshot`, in order.
    ///
    /// A registrant that errors or panics is reported and dispatch moves on to
    /// the next one.
    pub fn dispatch(
        &self,
        state: GameState,
        tick: u64,
        snapshot: &[RegistrantRef],
        handle: &ManagerHandle,
    ) -> TickReport {
        let op = self.resolve(state);
        let mut report = TickReport {
            tick,
            state,
            op,
            invoked: 0,
            skipped: 0,
            failures: Vec::new(),
        };

        for entry in snapshot {
            let Some(shared) = entry.upgrade() else {
                warn!(?entry, tick, "registrant dropped without unregistering; skipped");
                report.skipped += 1;
                continue;
            };

            let mut registrant = match shared.try_borrow_mut() {
                Ok(r) => r,
                Err(_) => {
                    let failure = DispatchFailure {
                        name: "<busy>".to_string(),
                        reason: "registrant already borrowed".to_string(),
                    };
                    error!(?entry, tick, op=%op, "registrant already borrowed; skipped");
                    report.failures.push(failure);
                    continue;
                }
            };

            let ctx = Context {
                state,
                op,
                tick,
                current: entry,
                handle,
            };
            let name = display_name(&*registrant);
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| op.invoke(&mut *registrant, &ctx)));

            match outcome {
                Ok(Ok(())) => {
                    trace!(registrant=%name, op=%op, tick, "updated");
                    report.invoked += 1;
                }
                Ok(Err(e)) => {
                    error!(registrant=%name, op=%op, tick, error=%e, "update failed");
                    report.failures.push(DispatchFailure {
                        name,
                        reason: format!("{e:#}"),
                    });
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    error!(registrant=%name, op=%op, tick, panic=%reason, "update panicked");
                    report.failures.push(DispatchFailure { name, reason });
                }
            }
        }

        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
