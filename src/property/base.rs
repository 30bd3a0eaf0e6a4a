//! Untyped property state.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::{Access, NotificationStrategy, PropertyChange, PropertyTransport, SetOutcome};
use crate::config::PropertyConfig;
use crate::error::{BusError, Result};
use crate::names::{InterfaceName, MemberName};
use crate::signal::ChangeSignal;
use crate::variant::Variant;

/// Which side of the bus a property lives on
enum Role {
    /// Local object publishing the property
    Owner,
    /// Stand-in for a remote object's property
    Proxy {
        access: Access,
        transport: Arc<dyn PropertyTransport>,
    },
}

/// Stored value and the number of stores so far
#[derive(Default)]
struct Slot {
    value: Option<Variant>,
    generation: u64,
    /// Whether the latest store came from an owner-side write
    owned: bool,
}

/// A property's identity, strategy, current value and change signals.
///
/// Each store bumps a generation under the value's write lock. Listeners
/// run after that lock is released, from whichever thread holds the
/// per-property emitter lock. A writer that finds another thread emitting
/// hands its store over and returns; the emitter drains up to the newest
/// generation before letting go. Stale events are dropped, so the last
/// event every listener receives carries the stored value.
///
/// A listener may call `set_value` on the same property; the new value
/// is stored at once and its notification follows once the current one
/// has reached every listener.
pub struct PropertyCore {
    interface: InterfaceName,
    name: MemberName,
    update: NotificationStrategy,
    role: Role,
    suppress_unchanged: bool,
    slot: RwLock<Slot>,
    /// Last generation handed to listeners
    emitter: Mutex<u64>,
    changed: ChangeSignal<Variant>,
    wire: ChangeSignal<PropertyChange>,
}

impl PropertyCore {
    /// Create an owner-side property with no value.
    ///
    /// # Errors
    ///
    /// [`BusError::InvalidName`] if `interface` is not a valid interface
    /// name or `name` is not a valid member name.
    pub fn create(
        interface: impl Into<String>,
        name: impl Into<String>,
        update: NotificationStrategy,
    ) -> Result<Self> {
        let interface = InterfaceName::try_new(interface)?;
        let name = MemberName::try_new(name)?;
        Ok(Self::with_role(interface, name, update, Role::Owner))
    }

    /// Create an owner-side property using configured defaults
    pub fn create_with(
        interface: impl Into<String>,
        name: impl Into<String>,
        config: &PropertyConfig,
    ) -> Result<Self> {
        let mut core = Self::create(interface, name, config.default_update)?;
        core.suppress_unchanged = config.suppress_unchanged;
        Ok(core)
    }

    /// Create a proxy for a remote property.
    ///
    /// `set_value` is forwarded to `transport` unless `access` is
    /// [`Access::Read`].
    pub fn create_proxy(
        interface: impl Into<String>,
        name: impl Into<String>,
        update: NotificationStrategy,
        access: Access,
        transport: Arc<dyn PropertyTransport>,
    ) -> Result<Self> {
        let interface = InterfaceName::try_new(interface)?;
        let name = MemberName::try_new(name)?;
        Ok(Self::with_role(
            interface,
            name,
            update,
            Role::Proxy { access, transport },
        ))
    }

    fn with_role(
        interface: InterfaceName,
        name: MemberName,
        update: NotificationStrategy,
        role: Role,
    ) -> Self {
        Self {
            interface,
            name,
            update,
            role,
            suppress_unchanged: false,
            slot: RwLock::new(Slot::default()),
            emitter: Mutex::new(0),
            changed: ChangeSignal::new(),
            wire: ChangeSignal::new(),
        }
    }

    /// Skip emission when an owner-side write stores an equal value
    #[must_use]
    pub fn suppress_unchanged(mut self, suppress: bool) -> Self {
        self.suppress_unchanged = suppress;
        self
    }

    /// Property name
    pub fn name(&self) -> &MemberName {
        &self.name
    }

    /// Interface the property belongs to
    pub fn interface_name(&self) -> &InterfaceName {
        &self.interface
    }

    /// Notification strategy chosen at creation
    pub fn update_type(&self) -> NotificationStrategy {
        self.update
    }

    /// Declared access. Owner-side properties are always `ReadWrite`.
    pub fn access(&self) -> Access {
        match &self.role {
            Role::Owner => Access::ReadWrite,
            Role::Proxy { access, .. } => *access,
        }
    }

    /// Whether this stands in for a remote property
    pub fn is_proxy(&self) -> bool {
        matches!(self.role, Role::Proxy { .. })
    }

    /// Current value; `None` while unset
    pub fn value(&self) -> Option<Variant> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .value
            .clone()
    }

    /// Local observers, called with every newly stored value
    pub fn signal_generic_property_changed(&self) -> ChangeSignal<Variant> {
        self.changed.clone()
    }

    /// Wire-bound change events, shaped by the notification strategy
    pub fn signal_wire_change(&self) -> ChangeSignal<PropertyChange> {
        self.wire.clone()
    }

    /// Set the value.
    ///
    /// On the owner side the value is stored, local observers are called,
    /// and a wire event is emitted according to [`Self::update_type`]. If
    /// another thread is emitting for this property at the time, it
    /// delivers this store instead, coalesced with any newer ones.
    ///
    /// On the proxy side the remote `Set` is attempted and the local value
    /// is left alone; the remote's own change notification updates it
    /// through [`Self::apply_remote_change`]. A read-only proxy returns
    /// [`SetOutcome::ReadOnlyNoop`] without touching anything.
    pub fn set_value(&self, value: Variant) -> Result<SetOutcome> {
        match &self.role {
            Role::Owner => Ok(self.publish(value)),
            Role::Proxy { access, .. } if !access.is_writable() => {
                warn!(
                    interface = %self.interface,
                    name = %self.name,
                    "Ignoring write to read-only property"
                );
                Ok(SetOutcome::ReadOnlyNoop)
            },
            Role::Proxy { transport, .. } => {
                transport.set_property(&self.interface, &self.name, &value)?;
                debug!(interface = %self.interface, name = %self.name, "Remote property set");
                Ok(SetOutcome::RemoteWritten)
            },
        }
    }

    fn publish(&self, value: Variant) -> SetOutcome {
        {
            let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
            if self.suppress_unchanged && slot.value.as_ref() == Some(&value) {
                return SetOutcome::Unchanged;
            }
            slot.value = Some(value);
            slot.generation += 1;
            slot.owned = true;
        }
        self.flush();
        SetOutcome::Updated
    }

    /// Apply a change notification received from the bus.
    ///
    /// A new value is stored and handed to local observers. An
    /// invalidation clears the cached value; observers are not called
    /// since there is no value to give them. Nothing is re-emitted on the
    /// wire signal.
    ///
    /// # Errors
    ///
    /// [`BusError::InvalidField`] if `change` names another property.
    pub fn apply_remote_change(&self, change: &PropertyChange) -> Result<()> {
        if change.interface != self.interface || change.name != self.name {
            return Err(BusError::InvalidField(format!(
                "change for {}.{} delivered to {}.{}",
                change.interface, change.name, self.interface, self.name
            )));
        }

        {
            let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
            slot.value = change.value().cloned();
            slot.generation += 1;
            slot.owned = false;
        }
        self.flush();

        debug!(interface = %self.interface, name = %self.name, "Remote change applied");
        Ok(())
    }

    fn generation(&self) -> u64 {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Emit pending stores unless another thread is already doing so
    fn flush(&self) {
        loop {
            let Some(mut emitted) = self.emitter.try_lock() else {
                trace!(interface = %self.interface, name = %self.name, "Emission handed to active emitter");
                return;
            };
            self.drain(&mut emitted);
            let last = *emitted;
            drop(emitted);

            // A store that lost the race for the emitter after our last
            // check is ours to emit.
            if self.generation() == last {
                return;
            }
        }
    }

    /// Emit until the newest generation has been handed to listeners
    fn drain(&self, emitted: &mut u64) {
        loop {
            let (generation, value, owned) = {
                let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
                (slot.generation, slot.value.clone(), slot.owned)
            };
            if generation == *emitted {
                return;
            }
            *emitted = generation;

            let Some(value) = value else {
                continue;
            };
            self.changed.emit(&value);
            if !owned || self.generation() != generation {
                continue;
            }

            let event = match self.update {
                NotificationStrategy::EmitsValue => PropertyChange::changed(
                    self.interface.clone(),
                    self.name.clone(),
                    value,
                ),
                NotificationStrategy::EmitsInvalidation => PropertyChange::invalidated(
                    self.interface.clone(),
                    self.name.clone(),
                ),
                NotificationStrategy::Silent => continue,
            };
            let receivers = self.wire.emit(&event);
            debug!(
                interface = %self.interface,
                name = %self.name,
                strategy = ?self.update,
                generation,
                receivers,
                "Property change emitted"
            );
        }
    }
}

impl fmt::Debug for PropertyCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCore")
            .field("interface", &self.interface)
            .field("name", &self.name)
            .field("update", &self.update)
            .field("access", &self.access())
            .field("value", &self.value())
            .finish()
    }
}
