use crate::core::error::{Error, Result};
use crate::core::registrant::RegistrantRef;

/// Live set of registrants, in registration order.
///
/// Holds non-owning handles only. Duplicates are allowed; each entry is
/// dispatched separately.
pub struct Registry {
    members: Vec<RegistrantRef>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Append a registrant. Null or dropped handles are rejected and the set
    /// is left untouched.
    pub fn add(&mut self, registrant: RegistrantRef) -> Result<()> {
        if !registrant.is_alive() {
            return Err(Error::InvalidRegistrant);
        }
        self.members.push(registrant);
        Ok(())
    }

    /// Remove the first entry pointing at the same object. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, registrant: &RegistrantRef) -> bool {
        match self.members.iter().position(|m| m.same(registrant)) {
            Some(idx) => {
                self.members.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Copy of the membership list, used for one tick of dispatch.
    pub fn snapshot(&self) -> Vec<RegistrantRef> {
        self.members.clone()
    }

    pub fn contains(&self, registrant: &RegistrantRef) -> bool {
        self.members.iter().any(|m| m.same(registrant))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Drop entries whose owners went away without unregistering.
    pub fn prune_dead(&mut self) -> usize {
        let before = self.members.len();
        self.members.retain(RegistrantRef::is_alive);
        before - self.members.len()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
