//! Arbitration state machine.
//!
//! ```text
//! Active(controller) --change_controller(account)--> Active(account)
//! Active(controller) --change_controller(Resigned)--> Resigned
//! Resigned: terminal
//! ```

use {
    crate::{Error, Result},
    alloy::primitives::Address,
    model::{Event, EventLog},
    std::{collections::BTreeSet, sync::Mutex},
};

/// Target of a controller change.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Controller {
    Account(Address),
    /// Nobody holds override authority anymore. There is no way back.
    Resigned,
}

impl From<Address> for Controller {
    /// Handing control to the zero (burn) address resigns.
    fn from(address: Address) -> Self {
        if address.is_zero() {
            Self::Resigned
        } else {
            Self::Account(address)
        }
    }
}

#[derive(Debug)]
enum State {
    Active {
        controller: Address,
        parents: BTreeSet<Address>,
    },
    Resigned,
}

/// Override authority over one or more guarded assets.
#[derive(Debug)]
pub struct Authority {
    address: Address,
    state: Mutex<State>,
    events: EventLog,
}

impl Authority {
    pub fn new(address: Address, controller: Address, events: EventLog) -> Self {
        Self {
            address,
            state: Mutex::new(State::Active {
                controller,
                parents: Default::default(),
            }),
            events,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The current controller, `None` once resigned.
    pub fn controller(&self) -> Option<Address> {
        match &*self.state.lock().unwrap() {
            State::Active { controller, .. } => Some(*controller),
            State::Resigned => None,
        }
    }

    pub fn is_resigned(&self) -> bool {
        matches!(*self.state.lock().unwrap(), State::Resigned)
    }

    pub fn parents(&self) -> Vec<Address> {
        match &*self.state.lock().unwrap() {
            State::Active { parents, .. } => parents.iter().copied().collect(),
            State::Resigned => Vec::new(),
        }
    }

    /// Whether `address` currently wields the controller's authority, either
    /// as the controller itself or as one of its delegated parents.
    pub fn is_active_controller(&self, address: Address) -> bool {
        match &*self.state.lock().unwrap() {
            State::Active {
                controller,
                parents,
            } => *controller == address || parents.contains(&address),
            State::Resigned => false,
        }
    }

    /// Hands control to `new`. Delegations granted by the previous controller
    /// do not carry over.
    pub fn change_controller(&self, caller: Address, new: impl Into<Controller>) -> Result<()> {
        let new = new.into();
        let mut state = self.state.lock().unwrap();
        let previous = Self::authorize(&state, caller)?;
        *state = match new {
            Controller::Account(controller) => State::Active {
                controller,
                parents: Default::default(),
            },
            Controller::Resigned => State::Resigned,
        };
        drop(state);

        tracing::debug!(authority = ?self.address, ?previous, ?new, "controller changed");
        self.events.emit(Event::ControllerChanged {
            authority: self.address,
            previous,
            controller: match new {
                Controller::Account(controller) => Some(controller),
                Controller::Resigned => None,
            },
        });
        Ok(())
    }

    /// Permanently gives up override authority.
    pub fn resign(&self, caller: Address) -> Result<()> {
        self.change_controller(caller, Controller::Resigned)
    }

    /// Delegates the controller's authority to `parent`.
    pub fn add_parent(&self, caller: Address, parent: Address) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::authorize(&state, caller)?;
        if let State::Active { parents, .. } = &mut *state {
            parents.insert(parent);
        }
        drop(state);

        tracing::debug!(authority = ?self.address, ?parent, "parent added");
        self.events.emit(Event::ParentAdded {
            authority: self.address,
            parent,
        });
        Ok(())
    }

    /// Revokes a delegation. Revoking an address that is not a parent is a
    /// no-op.
    pub fn remove_parent(&self, caller: Address, parent: Address) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::authorize(&state, caller)?;
        let removed = match &mut *state {
            State::Active { parents, .. } => parents.remove(&parent),
            State::Resigned => false,
        };
        drop(state);

        if removed {
            tracing::debug!(authority = ?self.address, ?parent, "parent removed");
            self.events.emit(Event::ParentRemoved {
                authority: self.address,
                parent,
            });
        }
        Ok(())
    }

    /// Only the controller itself may mutate the authority; parents may not.
    /// Returns the current controller.
    fn authorize(state: &State, caller: Address) -> Result<Address> {
        match state {
            State::Resigned => Err(Error::ArbitratorResigned),
            State::Active { controller, .. } if *controller == caller => Ok(*controller),
            State::Active { .. } => {
                tracing::warn!(?caller, "rejected authority change by non-controller");
                Err(Error::NotAuthorized)
            }
        }
    }
}
