/// Deferred requests into the manager
use tokio::sync::mpsc;
use tracing::debug;

use crate::core::registrant::RegistrantRef;
use crate::core::state::GameState;

/// A mutation queued for the manager to apply outside of dispatch.
#[derive(Debug, Clone)]
pub enum Command {
    Register(RegistrantRef),
    Unregister(RegistrantRef),
    Transition { next: GameState, save_current: bool },
    Resume,
}

/// Cloneable sender side of the manager's request queue.
///
/// Owners keep one of these to register on creation and unregister on
/// destruction without holding a borrow of the manager.
#[derive(Debug, Clone)]
pub struct ManagerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ManagerHandle {
    /// Queues a registration. Dropping the returned guard queues the matching
    /// unregistration, so an owner that keeps the guard next to the object is
    /// removed when it is destroyed.
    pub fn register(&self, registrant: impl Into<RegistrantRef>) -> Registration {
        let target = registrant.into();
        self.send(Command::Register(target.clone()));
        Registration {
            handle: self.clone(),
            target,
            armed: true,
        }
    }

    pub fn unregister(&self, registrant: impl Into<RegistrantRef>) {
        self.send(Command::Unregister(registrant.into()));
    }

    pub fn transition(&self, next: GameState, save_current: bool) {
        self.send(Command::Transition { next, save_current });
    }

    pub fn pause(&self) {
        self.transition(GameState::Paused, true);
    }

    pub fn resume(&self) {
        self.send(Command::Resume);
    }

    fn send(&self, cmd: Command) {
        if let Err(e) = self.tx.send(cmd) {
            debug!(command=?e.0, "manager is gone; request dropped");
        }
    }
}

/// Keeps a registrant registered for as long as it is alive.
#[must_use = "dropping a Registration unregisters the object"]
#[derive(Debug)]
pub struct Registration {
    handle: ManagerHandle,
    target: RegistrantRef,
    armed: bool,
}

impl Registration {
    pub fn target(&self) -> &RegistrantRef {
        &self.target
    }

    /// Leaves the object registered after the guard goes away; it then has to
    /// be unregistered explicitly.
    pub fn detach(mut self) -> RegistrantRef {
        self.armed = false;
        self.target.clone()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.armed {
            self.handle.unregister(self.target.clone());
        }
    }
}

/// Receiving side, owned by the manager.
pub(crate) struct CommandQueue {
    tx: mpsc::UnboundedSender<Command>,
    rx: mpsc::UnboundedReceiver<Command>,
}

impl CommandQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub(crate) fn handle(&self) -> ManagerHandle {
        ManagerHandle {
            tx: self.tx.clone(),
        }
    }

    /// Takes everything queued so far, oldest first.
    pub(crate) fn drain(&mut self) -> Vec<Command> {
        let mut pending = Vec::new();
        while let Ok(cmd) = self.rx.try_recv() {
            pending.push(cmd);
        }
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_request_order() {
        let mut queue = CommandQueue::new();
        let handle = queue.handle();
        handle.transition(GameState::InLevel, false);
        handle.pause();
        handle.resume();

        let drained = queue.drain();
        assert_eq!(drained.len(), 3);
        assert!(matches!(
            drained[0],
            Command::Transition { next: GameState::InLevel, save_current: false }
        ));
        assert!(matches!(
            drained[1],
            Command::Transition { next: GameState::Paused, save_current: true }
        ));
        assert!(matches!(drained[2], Command::Resume));
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn dropping_registration_queues_unregister() {
        let mut queue = CommandQueue::new();
        let handle = queue.handle();
        let guard = handle.register(RegistrantRef::null());
        drop(guard);

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], Command::Register(_)));
        assert!(matches!(drained[1], Command::Unregister(_)));
    }

    #[test]
    fn detached_registration_stays() {
        let mut queue = CommandQueue::new();
        let handle = queue.handle();
        let target = handle.register(RegistrantRef::null()).detach();
        assert!(target.is_null());

        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
        assert!(matches!(drained[0], Command::Register(_)));
    }

    #[test]
    fn sending_after_queue_dropped_is_silent() {
        let queue = CommandQueue::new();
        let handle = queue.handle();
        drop(queue);
        handle.pause();
    }
}
