#![allow(clippy::used_underscore_binding)]

use derive_more::{Display, Error};
use std::any::{Any, TypeId};

#[cfg(feature = "arc")]
mod types {
    use crate::ContainerError;
    use std::{any::Any, sync::Arc};

    /// A reference-counted pointer holding a registered instance. The pointer
    /// type is determined by the feature flags passed to this crate.
    pub type Svc<T> = Arc<T>;

    /// The type-erased form every registered instance is stored as.
    pub type DynService = dyn Any + Send + Sync;

    /// A reference-counted pointer holding an instance of `dyn Any`.
    pub type DynSvc = Arc<DynService>;

    /// The result of an operation on a [`Container`](crate::Container).
    pub type ContainerResult<T> = Result<T, ContainerError>;

    /// Implemented automatically on types that can be registered in a
    /// container.
    pub trait Service: Any + Send + Sync {}
    impl<T: ?Sized + Any + Send + Sync> Service for T {}
}

#[cfg(feature = "rc")]
mod types {
    use crate::ContainerError;
    use std::{any::Any, rc::Rc};

    /// A reference-counted pointer holding a registered instance. The pointer
    /// type is determined by the feature flags passed to this crate.
    pub type Svc<T> = Rc<T>;

    /// The type-erased form every registered instance is stored as.
    pub type DynService = dyn Any;

    /// A reference-counted pointer holding an instance of `dyn Any`.
    pub type DynSvc = Rc<DynService>;

    /// The result of an operation on a [`Container`](crate::Container).
    pub type ContainerResult<T> = Result<T, ContainerError>;

    /// Implemented automatically on types that can be registered in a
    /// container.
    pub trait Service: Any {}
    impl<T: ?Sized + Any> Service for T {}
}

pub use types::*;

/// Identifies the concrete type an instance was registered with.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct ServiceInfo {
    id: TypeId,
    name: &'static str,
}

impl ServiceInfo {
    /// Gets the info for `T`.
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        ServiceInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The [`TypeId`] of the type.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The name of the type. Only meant for diagnostics, it is not
    /// guaranteed to be unique or stable between compiler versions.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// An error from registering or retrieving an instance. Every variant
/// describes a mistake in the calling code rather than a transient failure,
/// so callers normally propagate it up to startup or unwrap it on the spot.
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ContainerError {
    /// An instance was already registered under the key. The existing
    /// instance is left untouched.
    #[display(
        fmt = "an instance of {} is already registered for key {:?}",
        "registered.name()",
        key
    )]
    DuplicateKey {
        /// The key that was registered twice.
        key: String,
        /// The type of the instance already stored under the key.
        registered: ServiceInfo,
    },

    /// No instance is registered under the key.
    #[display(
        fmt = "no instance is registered for key {:?} (requested {})",
        key,
        "requested.name()"
    )]
    MissingKey {
        /// The key that was looked up.
        key: String,
        /// The type the caller asked for.
        requested: ServiceInfo,
    },

    /// The instance under the key has a different type than the one
    /// requested.
    #[display(
        fmt = "key {:?} holds an instance of {}, not {}",
        key,
        "registered.name()",
        "requested.name()"
    )]
    TypeMismatch {
        /// The key that was looked up.
        key: String,
        /// The type the instance was registered with.
        registered: ServiceInfo,
        /// The type the caller asked for.
        requested: ServiceInfo,
    },

    /// Instances cannot be registered under an empty key.
    #[display(fmt = "instance keys must not be empty")]
    EmptyKey,
}
