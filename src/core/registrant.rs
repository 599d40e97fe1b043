/// Contract for objects that take part in per-tick, per-state dispatch
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use anyhow::Result;

use crate::core::command::{ManagerHandle, Registration};
use crate::core::state::{GameState, UpdateOp};

/// Shared ownership form a registrant's owner keeps around.
pub type SharedRegistrant = Rc<RefCell<dyn Registrant>>;

/// Anything that reacts to ticks in a state-specific way.
///
/// Every method has a no-op default, so an implementor only overrides the
/// states it cares about. Update methods may fail; a failure is reported by
/// the dispatcher and never stops the rest of the tick.
pub trait Registrant {
    /// Label used in logs and tick reports
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once the manager has added this object to its registry.
    fn on_registered(&mut self) {}

    /// Called once the manager has removed this object from its registry.
    fn on_unregistered(&mut self) {}

    fn update_init(&mut self, _ctx: &Context<'_>) -> Result<()> {
        Ok(())
    }

    fn update_main_menu(&mut self, _ctx: &Context<'_>) -> Result<()> {
        Ok(())
    }

    fn update_level_loading(&mut self, _ctx: &Context<'_>) -> Result<()> {
        Ok(())
    }

    fn update_level_starting(&mut self, _ctx: &Context<'_>) -> Result<()> {
        Ok(())
    }

    fn update_in_level(&mut self, _ctx: &Context<'_>) -> Result<()> {
        Ok(())
    }

    fn update_level_ending(&mut self, _ctx: &Context<'_>) -> Result<()> {
        Ok(())
    }

    fn update_paused(&mut self, _ctx: &Context<'_>) -> Result<()> {
        Ok(())
    }
}

/// Non-owning handle to a registrant.
///
/// The registry only ever stores these; the object itself belongs to whoever
/// created the `Rc`. Identity is pointer identity.
#[derive(Clone)]
pub struct RegistrantRef {
    inner: Option<Weak<RefCell<dyn Registrant>>>,
}

impl RegistrantRef {
    pub fn new<R: Registrant + 'static>(owner: &Rc<RefCell<R>>) -> Self {
        let weak: Weak<RefCell<R>> = Rc::downgrade(owner);
        Self { inner: Some(weak) }
    }

    pub fn from_shared(owner: &SharedRegistrant) -> Self {
        Self {
            inner: Some(Rc::downgrade(owner)),
        }
    }

    /// A handle that never pointed at anything. Registering it is rejected.
    pub fn null() -> Self {
        Self { inner: None }
    }

    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// True while the owner still holds the object.
    pub fn is_alive(&self) -> bool {
        self.inner.as_ref().is_some_and(|weak| weak.strong_count() > 0)
    }

    pub fn upgrade(&self) -> Option<SharedRegistrant> {
        self.inner.as_ref().and_then(Weak::upgrade)
    }

    /// Whether both handles point at the same object. Null handles never match.
    pub fn same(&self, other: &RegistrantRef) -> bool {
        match (&self.inner, &other.inner) {
            (Some(a), Some(b)) => Weak::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn name(&self) -> String {
        match self.upgrade() {
            Some(shared) => match shared.try_borrow() {
                Ok(r) => display_name(&*r),
                Err(_) => "<busy>".to_string(),
            },
            None if self.is_null() => "<null>".to_string(),
            None => "<dropped>".to_string(),
        }
    }

    fn addr(&self) -> Option<*const ()> {
        self.inner.as_ref().map(|weak| weak.as_ptr() as *const ())
    }
}

/// `name()` of a registrant, or `"<unknown>"` if it panics.
pub(crate) fn display_name(registrant: &dyn Registrant) -> String {
    panic::catch_unwind(AssertUnwindSafe(|| registrant.name().to_string()))
        .unwrap_or_else(|_| "<unknown>".to_string())
}

impl<R: Registrant + 'static> From<&Rc<RefCell<R>>> for RegistrantRef {
    fn from(owner: &Rc<RefCell<R>>) -> Self {
        RegistrantRef::new(owner)
    }
}

impl fmt::Debug for RegistrantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr() {
            Some(addr) => f
                .debug_struct("RegistrantRef")
                .field("addr", &addr)
                .field("alive", &self.is_alive())
                .finish(),
            None => f.write_str("RegistrantRef(null)"),
        }
    }
}

/// What a registrant sees while one of its update methods runs.
///
/// Requests made through the context are queued and only applied once the
/// current tick has finished dispatching.
pub struct Context<'a> {
    pub(crate) state: GameState,
    pub(crate) op: UpdateOp,
    pub(crate) tick: u64,
    pub(crate) current: &'a RegistrantRef,
    pub(crate) handle: &'a ManagerHandle,
}

impl<'a> Context<'a> {
    /// State resolved for this tick.
    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn op(&self) -> UpdateOp {
        self.op
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Handle to the registrant being invoked.
    pub fn this(&self) -> &RegistrantRef {
        self.current
    }

    /// Manager handle that can be cloned and kept for later requests.
    pub fn handle(&self) -> &ManagerHandle {
        self.handle
    }

    pub fn unregister_self(&self) {
        self.handle.unregister(self.current.clone());
    }

    /// Registration takes effect from the next tick. See [`Registration`].
    pub fn register(&self, registrant: impl Into<RegistrantRef>) -> Registration {
        self.handle.register(registrant)
    }

    pub fn transition(&self, next: GameState, save_current: bool) {
        self.handle.transition(next, save_current);
    }

    pub fn pause(&self) {
        self.handle.pause();
    }

    pub fn resume(&self) {
        self.handle.resume();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Crate;
    impl Registrant for Crate {
        fn name(&self) -> &str {
            "crate"
        }
    }

    struct Barrel;
    impl Registrant for Barrel {}

    #[test]
    fn null_handle_is_neither_alive_nor_equal_to_itself() {
        let null = RegistrantRef::null();
        assert!(null.is_null());
        assert!(!null.is_alive());
        assert!(!null.same(&null.clone()));
        assert_eq!(null.name(), "<null>");
    }

    #[test]
    fn handle_dies_with_its_owner() {
        let owner = Rc::new(RefCell::new(Crate));
        let handle = RegistrantRef::new(&owner);
        assert!(handle.is_alive());
        assert_eq!(handle.name(), "crate");
        drop(owner);
        assert!(!handle.is_alive());
        assert!(!handle.is_null());
        assert_eq!(handle.name(), "<dropped>");
    }

    #[test]
    fn identity_is_per_object() {
        let a = Rc::new(RefCell::new(Crate));
        let b = Rc::new(RefCell::new(Crate));
        assert!(RegistrantRef::new(&a).same(&RegistrantRef::from(&a)));
        assert!(!RegistrantRef::new(&a).same(&RegistrantRef::new(&b)));
    }

    #[test]
    fn panicking_name_falls_back() {
        struct Anonymous;
        impl Registrant for Anonymous {
            fn name(&self) -> &str {
                panic!("unnamed")
            }
        }

        let owner = Rc::new(RefCell::new(Anonymous));
        assert_eq!(RegistrantRef::new(&owner).name(), "<unknown>");
    }

    #[test]
    fn default_name_is_type_name() {
        let barrel = Rc::new(RefCell::new(Barrel));
        assert!(RegistrantRef::new(&barrel).name().ends_with("Barrel"));
    }
}
