//! Composition of state machine, registry and dispatcher.

use tracing::{debug, info, warn};

use crate::core::command::{Command, CommandQueue, ManagerHandle};
use crate::core::config::ManagerConfig;
use crate::core::dispatch::{DispatchTable, Dispatcher, TickReport};
use crate::core::error::Result;
use crate::core::machine::{StateHook, StateMachine};
use crate::core::registrant::RegistrantRef;
use crate::core::registry::Registry;
use crate::core::state::GameState;

/// Owns the game state and the registered objects, and drives one tick at a
/// time.
///
/// Mutations requested through a [`ManagerHandle`] (including from inside a
/// registrant's update) are queued and applied before and after dispatch,
/// never during it. Entries whose owners were dropped are pruned after the
/// first tick that runs into them.
pub struct Manager {
    machine: StateMachine,
    registry: Registry,
    dispatcher: Dispatcher,
    commands: CommandQueue,
    tick: u64,
    boot_state: Option<GameState>,
    started: bool,
}

impl Manager {
    /// Fails if the configured dispatch table leaves a state unmapped or maps one twice.
    pub fn new(config: &ManagerConfig) -> Result<Self> {
        let table = config.dispatch_table()?;
        Ok(Self::with_table(config, table))
    }

    fn with_table(config: &ManagerConfig, table: DispatchTable) -> Self {
        Self {
            machine: StateMachine::new(config.initial_state, config.return_state),
            registry: Registry::new(),
            dispatcher: Dispatcher::new(table),
            commands: CommandQueue::new(),
            tick: 0,
            boot_state: config.boot_state,
            started: false,
        }
    }

    pub fn current(&self) -> GameState {
        self.machine.current()
    }

    pub fn has_previous(&self) -> bool {
        self.machine.has_previous()
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn dispatch_table(&self) -> &DispatchTable {
        self.dispatcher.table()
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn handle(&self) -> ManagerHandle {
        self.commands.handle()
    }

    pub fn add_state_hook(&mut self, hook: Box<dyn StateHook>) {
        self.machine.add_hook(hook);
    }

    /// Enters the configured boot state. Only the first call does anything.
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        if let Some(boot) = self.boot_state {
            self.transition(boot, false);
        }
        true
    }

    pub fn transition(&mut self, next: GameState, save_current: bool) {
        self.machine.transition(next, save_current);
    }

    pub fn pause(&mut self) {
        self.machine.transition(GameState::Paused, true);
    }

    /// Goes back to the last saved state, or the return state if none.
    pub fn resume(&mut self) -> GameState {
        self.machine.return_to_previous()
    }

    /// Adds a registrant. Null or dropped handles are reported and ignored.
    pub fn register_object(&mut self, registrant: impl Into<RegistrantRef>) -> bool {
        let registrant = registrant.into();
        if let Err(e) = self.registry.add(registrant.clone()) {
            warn!(?registrant, error=%e, "register_object ignored");
            return false;
        }
        debug!(registrant=%registrant.name(), members=self.registry.len(), "registered");

        if let Some(shared) = registrant.upgrade() {
            match shared.try_borrow_mut() {
                Ok(mut obj) => obj.on_registered(),
                Err(_) => warn!(?registrant, "registrant busy; on_registered skipped"),
            }
        }
        true
    }

    /// Removes a registrant. Returns false if it was not a member.
    pub fn unregister_object(&mut self, registrant: impl Into<RegistrantRef>) -> bool {
        let registrant = registrant.into();
        if registrant.is_null() {
            warn!("unregister_object called with a null handle");
            return false;
        }
        if !self.registry.remove(&registrant) {
            return false;
        }
        debug!(?registrant, members=self.registry.len(), "unregistered");

        if let Some(shared) = registrant.upgrade() {
            match shared.try_borrow_mut() {
                Ok(mut obj) => obj.on_unregistered(),
                Err(_) => warn!(?registrant, "registrant busy; on_unregistered skipped"),
            }
        }
        true
    }

    /// Drops registry entries whose owners are gone.
    pub fn prune(&mut self) -> usize {
        let pruned = self.registry.prune_dead();
        if pruned > 0 {
            info!(pruned, "pruned dropped registrants");
        }
        pruned
    }

    /// Applies every queued request in the order it was made.
    pub fn apply_pending(&mut self) -> usize {
        let pending = self.commands.drain();
        let count = pending.len();
        for cmd in pending {
            match cmd {
                Command::Register(r) => {
                    self.register_object(r);
                }
                Command::Unregister(r) => {
                    self.unregister_object(r);
                }
                Command::Transition { next, save_current } => self.transition(next, save_current),
                Command::Resume => {
                    self.resume();
                }
            }
        }
        count
    }

    /// Runs one tick: every registrant in the registry gets the update that
    /// the current state maps to, in registration order.
    pub fn tick(&mut self) -> TickReport {
        self.apply_pending();

        self.tick += 1;
        let state = self.machine.current();
        let snapshot = self.registry.snapshot();
        let handle = self.commands.handle();
        let report = self.dispatcher.dispatch(state, self.tick, &snapshot, &handle);

        let applied = self.apply_pending();
        if report.skipped > 0 {
            self.prune();
        }
        debug!(
            tick = report.tick,
            state = %report.state,
            invoked = report.invoked,
            failed = report.failures.len(),
            applied,
            "tick complete"
        );
        report
    }
}

/// Holds the single live [`Manager`].
///
/// The manager is created on the first `activate`; later activations are
/// ignored and hand back the existing one.
#[derive(Default)]
pub struct ManagerSlot {
    manager: Option<Manager>,
}

impl ManagerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self, config: &ManagerConfig) -> Result<&mut Manager> {
        let manager = match self.manager.take() {
            Some(existing) => {
                debug!("manager already active; activation ignored");
                existing
            }
            None => {
                let manager = Manager::new(config)?;
                info!(state=%manager.current(), "manager activated");
                manager
            }
        };
        Ok(self.manager.insert(manager))
    }

    pub fn is_active(&self) -> bool {
        self.manager.is_some()
    }

    pub fn get(&self) -> Option<&Manager> {
        self.manager.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut Manager> {
        self.manager.as_mut()
    }

    /// Releases the manager so a new one can be activated.
    pub fn deactivate(&mut self) -> Option<Manager> {
        self.manager.take()
    }
}
