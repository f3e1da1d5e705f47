use crate::{
    ContainerBuilder, ContainerError, ContainerResult, DynSvc, Key, Service,
    ServiceInfo, Svc,
};
use std::{
    collections::{hash_map::Entry as MapEntry, HashMap},
    fmt::{Debug, Formatter},
};

pub(crate) trait EntryLockEx<T> {
    fn with_inner<R, F: FnOnce(&T) -> R>(&self, f: F) -> R;
    fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R;
}

#[cfg(feature = "rc")]
mod types {
    use super::EntryLockEx;
    use std::cell::RefCell;

    pub type EntryLock<T> = RefCell<T>;

    impl<T> EntryLockEx<T> for EntryLock<T> {
        fn with_inner<R, F: FnOnce(&T) -> R>(&self, f: F) -> R {
            f(&*self.borrow())
        }

        fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
            f(&mut *self.borrow_mut())
        }
    }
}

#[cfg(feature = "arc")]
mod types {
    use super::EntryLockEx;
    use parking_lot::RwLock;

    pub type EntryLock<T> = RwLock<T>;

    impl<T> EntryLockEx<T> for EntryLock<T> {
        // Recursive so a read nested inside `with_instance` doesn't queue
        // behind a waiting writer that is itself waiting on the outer read.
        fn with_inner<R, F: FnOnce(&T) -> R>(&self, f: F) -> R {
            f(&*self.read_recursive())
        }

        fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
            f(&mut *self.write())
        }
    }
}

#[allow(clippy::wildcard_imports)]
pub(crate) use types::*;

/// A registered instance along with the type it was registered as.
#[derive(Clone)]
pub(crate) struct Entry {
    pub info: ServiceInfo,
    pub value: DynSvc,
}

impl Entry {
    pub fn new<T: Service>(value: T) -> Self {
        Entry {
            info: ServiceInfo::of::<T>(),
            value: Svc::new(value),
        }
    }

    /// Recovers the typed pointer, or returns the registered type if it
    /// isn't `T`.
    pub fn downcast<T: Service>(self) -> Result<Svc<T>, ServiceInfo> {
        let info = self.info;
        self.value.downcast::<T>().map_err(|_| info)
    }
}

pub(crate) type EntryMap = HashMap<String, Entry>;

/// Inserts a new entry, refusing empty and already used keys.
pub(crate) fn insert_entry(
    entries: &mut EntryMap,
    key: String,
    entry: Entry,
) -> ContainerResult<()> {
    if key.is_empty() {
        tracing::warn!(
            service = entry.info.name(),
            "rejected instance with an empty key"
        );
        return Err(ContainerError::EmptyKey);
    }

    match entries.entry(key) {
        MapEntry::Occupied(occupied) => {
            let registered = occupied.get().info;
            tracing::warn!(
                key = %occupied.key(),
                registered = registered.name(),
                rejected = entry.info.name(),
                "rejected duplicate instance"
            );
            Err(ContainerError::DuplicateKey {
                key: occupied.key().clone(),
                registered,
            })
        }
        MapEntry::Vacant(vacant) => {
            tracing::debug!(
                key = %vacant.key(),
                service = entry.info.name(),
                "registered instance"
            );
            vacant.insert(entry);
            Ok(())
        }
    }
}

fn missing_key(key: &str, requested: ServiceInfo) -> ContainerError {
    tracing::trace!(key, requested = requested.name(), "instance not found");
    ContainerError::MissingKey {
        key: key.to_owned(),
        requested,
    }
}

fn type_mismatch(
    key: &str,
    registered: ServiceInfo,
    requested: ServiceInfo,
) -> ContainerError {
    tracing::warn!(
        key,
        registered = registered.name(),
        requested = requested.name(),
        "instance requested with the wrong type"
    );
    ContainerError::TypeMismatch {
        key: key.to_owned(),
        registered,
        requested,
    }
}

/// A shared handle to a populated container. This is how a container is
/// normally passed between subsystems once bootstrapping is done.
pub type SharedContainer = Svc<Container>;

/// A keyed dependency injection container. Subsystems publish instances under
/// a string key and other subsystems retrieve them by key, without either side
/// knowing the other's concrete types or construction order.
///
/// Each key is assigned exactly once and the instance stored under it is never
/// replaced or removed. The convention is to key an instance by the plain name
/// of the interface it is used as. For example, an `Svc<dyn Config>` would be
/// registered under `"Config"` even if the concrete type behind it is
/// `EmptyConfig`.
///
/// All access goes through a single readers-writer lock: registrations are
/// exclusive, lookups share the lock with each other.
///
/// # Example
///
/// ```
/// use context_container::{Container, ContainerError};
///
/// let container = Container::new();
/// container.register_instance("MaxConnections", 16u32).unwrap();
///
/// assert_eq!(16, container.get_instance::<u32>("MaxConnections").unwrap());
/// assert_eq!(None, container.find_instance::<u32>("Timeout").unwrap());
///
/// // Each key can only be assigned once
/// assert!(matches!(
///     container.register_instance("MaxConnections", 32u32),
///     Err(ContainerError::DuplicateKey { .. })
/// ));
/// ```
#[derive(Default)]
pub struct Container {
    entries: EntryLock<EntryMap>,
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Container::default()
    }

    /// Creates a builder for populating a container before sharing it.
    #[must_use]
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    pub(crate) fn from_entries(entries: EntryMap) -> Self {
        Container {
            entries: EntryLock::new(entries),
        }
    }

    /// Registers an instance under `key`. Only one instance can ever be
    /// registered per key.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::DuplicateKey`] if the key is already in use. The
    ///   existing instance is kept.
    /// - [`ContainerError::EmptyKey`] if `key` is empty.
    pub fn register_instance<T: Service>(
        &self,
        key: impl Into<String>,
        value: T,
    ) -> ContainerResult<()> {
        let entry = Entry::new(value);
        self.entries
            .with_inner_mut(|entries| insert_entry(entries, key.into(), entry))
    }

    /// Gets a copy of the instance registered under `key`.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::MissingKey`] if nothing is registered under `key`.
    /// - [`ContainerError::TypeMismatch`] if the instance isn't a `T`.
    pub fn get_instance<T: Service + Clone>(
        &self,
        key: &str,
    ) -> ContainerResult<T> {
        self.get_shared::<T>(key).map(|value| T::clone(&value))
    }

    /// Gets a copy of the instance registered under `key` if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::TypeMismatch`] if an instance is registered
    /// under `key` but it isn't a `T`.
    pub fn find_instance<T: Service + Clone>(
        &self,
        key: &str,
    ) -> ContainerResult<Option<T>> {
        self.find_shared::<T>(key)
            .map(|value| value.map(|value| T::clone(&value)))
    }

    /// Gets a pointer to the instance registered under `key` without copying
    /// it.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::MissingKey`] if nothing is registered under `key`.
    /// - [`ContainerError::TypeMismatch`] if the instance isn't a `T`.
    pub fn get_shared<T: Service>(&self, key: &str) -> ContainerResult<Svc<T>> {
        self.find_shared::<T>(key)?
            .ok_or_else(|| missing_key(key, ServiceInfo::of::<T>()))
    }

    /// Gets a pointer to the instance registered under `key` if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::TypeMismatch`] if an instance is registered
    /// under `key` but it isn't a `T`.
    pub fn find_shared<T: Service>(
        &self,
        key: &str,
    ) -> ContainerResult<Option<Svc<T>>> {
        let requested = ServiceInfo::of::<T>();
        // Only the pointer is cloned while the lock is held
        let entry = self.entries.with_inner(|entries| entries.get(key).cloned());
        let entry = match entry {
            Some(entry) => entry,
            None => {
                tracing::trace!(key, "no instance registered");
                return Ok(None);
            }
        };

        entry
            .downcast::<T>()
            .map(Some)
            .map_err(|registered| type_mismatch(key, registered, requested))
    }

    /// Calls `f` with a reference to the instance registered under `key`.
    ///
    /// The read lock is held while `f` runs. `f` may read from this
    /// container again (lookups inside `f` never wait on a pending
    /// registration), but it must not register anything in it: with the
    /// "arc" feature the registration deadlocks on the held read lock, and
    /// with the "rc" feature it panics with a `RefCell` borrow error.
    /// Registrations from other threads wait until `f` returns.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::MissingKey`] if nothing is registered under `key`.
    /// - [`ContainerError::TypeMismatch`] if the instance isn't a `T`.
    pub fn with_instance<T, R, F>(&self, key: &str, f: F) -> ContainerResult<R>
    where
        T: Service,
        F: FnOnce(&T) -> R,
    {
        let requested = ServiceInfo::of::<T>();
        self.entries.with_inner(|entries| {
            let entry = entries
                .get(key)
                .ok_or_else(|| missing_key(key, requested))?;
            let value = entry
                .value
                .downcast_ref::<T>()
                .ok_or_else(|| type_mismatch(key, entry.info, requested))?;
            Ok(f(value))
        })
    }

    /// Registers an instance under a typed key.
    ///
    /// # Errors
    ///
    /// Same as [`Container::register_instance`].
    pub fn register<T: Service>(
        &self,
        key: &Key<T>,
        value: T,
    ) -> ContainerResult<()> {
        self.register_instance(key.name(), value)
    }

    /// Gets a copy of the instance registered under a typed key.
    ///
    /// # Errors
    ///
    /// Same as [`Container::get_instance`]. A type mismatch is only possible
    /// if the key's name was also registered through the untyped API.
    pub fn get<T: Service + Clone>(&self, key: &Key<T>) -> ContainerResult<T> {
        self.get_instance(key.name())
    }

    /// Gets a copy of the instance registered under a typed key if there is
    /// one.
    ///
    /// # Errors
    ///
    /// Same as [`Container::find_instance`].
    pub fn find<T: Service + Clone>(
        &self,
        key: &Key<T>,
    ) -> ContainerResult<Option<T>> {
        self.find_instance(key.name())
    }

    /// Gets a pointer to the instance registered under a typed key.
    ///
    /// # Errors
    ///
    /// Same as [`Container::get_shared`].
    pub fn get_shared_by<T: Service>(
        &self,
        key: &Key<T>,
    ) -> ContainerResult<Svc<T>> {
        self.get_shared(key.name())
    }

    /// Checks whether an instance is registered under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.with_inner(|entries| entries.contains_key(key))
    }

    /// The type the instance under `key` was registered with.
    #[must_use]
    pub fn service_info(&self, key: &str) -> Option<ServiceInfo> {
        self.entries
            .with_inner(|entries| entries.get(key).map(|entry| entry.info))
    }

    /// The number of registered instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.with_inner(EntryMap::len)
    }

    /// Whether nothing has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.with_inner(EntryMap::is_empty)
    }

    /// All registered keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys = self
            .entries
            .with_inner(|entries| entries.keys().cloned().collect::<Vec<_>>());
        keys.sort();
        keys
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.entries.with_inner(|entries| {
            let mut sorted: Vec<_> = entries.iter().collect();
            sorted.sort_by(|(a, _), (b, _)| a.cmp(b));
            f.debug_map()
                .entries(sorted.into_iter().map(|(k, v)| (k, v.info.name())))
                .finish()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Container, ContainerError, ServiceInfo};

    #[test]
    fn rejected_registration_keeps_existing_instance() {
        let container = Container::new();
        container.register_instance("limit", 1_i32).unwrap();

        match container.register_instance("limit", "other".to_string()) {
            Err(ContainerError::DuplicateKey { key, registered })
                if key == "limit" && registered == ServiceInfo::of::<i32>() => {}
            Err(error) => Err(error).unwrap(),
            Ok(()) => panic!("duplicate key was accepted"),
        }

        assert_eq!(1, container.get_instance::<i32>("limit").unwrap());
        assert_eq!(1, container.len());
    }

    #[test]
    fn empty_key_is_rejected() {
        let container = Container::new();
        assert_eq!(
            Err(ContainerError::EmptyKey),
            container.register_instance("", 1_i32)
        );
        assert!(container.is_empty());
    }

    #[test]
    fn debug_lists_keys_with_types() {
        let container = Container::new();
        container.register_instance("b", 2_u8).unwrap();
        container.register_instance("a", 1_i64).unwrap();

        assert_eq!(r#"{"a": "i64", "b": "u8"}"#, format!("{:?}", container));
    }
}
