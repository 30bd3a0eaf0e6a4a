//! Typed facade over [`PropertyCore`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{Access, NotificationStrategy, PropertyCore, PropertyTransport, SetOutcome};
use crate::error::{BusError, Result};
use crate::signal::{ChangeSignal, ListenerId};
use crate::variant::{Variant, VariantType};

/// A property holding values of type `T`.
///
/// Owns its [`PropertyCore`] exclusively and converts at the boundary.
pub struct TypedProperty<T> {
    core: PropertyCore,
    _marker: PhantomData<fn() -> T>,
}

impl<T: VariantType> TypedProperty<T> {
    /// Create an owner-side property
    pub fn create(
        interface: impl Into<String>,
        name: impl Into<String>,
        update: NotificationStrategy,
    ) -> Result<Self> {
        PropertyCore::create(interface, name, update).map(Self::from_core)
    }

    /// Create a proxy for a remote property
    pub fn create_proxy(
        interface: impl Into<String>,
        name: impl Into<String>,
        update: NotificationStrategy,
        access: Access,
        transport: Arc<dyn PropertyTransport>,
    ) -> Result<Self> {
        PropertyCore::create_proxy(interface, name, update, access, transport).map(Self::from_core)
    }

    /// Take ownership of an untyped core
    pub fn from_core(core: PropertyCore) -> Self {
        Self {
            core,
            _marker: PhantomData,
        }
    }

    /// The untyped core
    pub fn core(&self) -> &PropertyCore {
        &self.core
    }

    /// Give the untyped core back
    pub fn into_core(self) -> PropertyCore {
        self.core
    }

    /// Current value.
    ///
    /// # Errors
    ///
    /// [`BusError::Unset`] before any value is stored, or
    /// [`BusError::TypeMismatch`] if the stored value is not a `T`.
    pub fn value(&self) -> Result<T> {
        let stored = self.core.value().ok_or_else(|| BusError::Unset {
            interface: self.core.interface_name().to_string(),
            name: self.core.name().to_string(),
        })?;
        T::from_variant(&stored)
    }

    /// Wrap `value` and forward to [`PropertyCore::set_value`]
    pub fn set_value(&self, value: T) -> Result<SetOutcome> {
        self.core.set_value(value.into_variant())
    }

    /// Typed view of the local change signal
    pub fn signal_property_changed(&self) -> TypedSignal<T> {
        TypedSignal {
            inner: self.core.signal_generic_property_changed(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedProperty").field("core", &self.core).finish()
    }
}

/// Typed view over a [`ChangeSignal`] of variants.
///
/// Listeners receive `Err(BusError::TypeMismatch)` for a notification
/// whose value is not a `T`, rather than having it dropped.
pub struct TypedSignal<T> {
    inner: ChangeSignal<Variant>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: VariantType + 'static> TypedSignal<T> {
    /// Attach a listener
    pub fn connect<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(Result<T>) + Send + Sync + 'static,
    {
        self.inner.connect(move |value| listener(T::from_variant(value)))
    }

    /// Detach a listener
    pub fn disconnect(&self, id: ListenerId) -> bool {
        self.inner.disconnect(id)
    }

    /// Number of connected listeners
    pub fn listener_count(&self) -> usize {
        self.inner.listener_count()
    }
}

impl<T> Clone for TypedSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}
