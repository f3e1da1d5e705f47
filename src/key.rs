use crate::{Service, ServiceInfo};
use std::{
    fmt::{Debug, Formatter},
    marker::PhantomData,
};

/// A key that fixes the type of the instance stored under it. Retrieving
/// through a typed key can't ask for the wrong type, which makes it a good
/// fit for keys that are shared between crates as constants.
///
/// Typed keys live in the same namespace as plain string keys: registering
/// `Key::<T>::new("Config")` and then calling
/// [`register_instance("Config", ..)`](crate::Container::register_instance)
/// is a duplicate registration.
///
/// # Example
///
/// ```
/// use context_container::{Container, Key};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct RetryPolicy {
///     attempts: u32,
/// }
///
/// const RETRY_POLICY: Key<RetryPolicy> = Key::new("RetryPolicy");
///
/// let container = Container::new();
/// container.register(&RETRY_POLICY, RetryPolicy { attempts: 3 }).unwrap();
///
/// let policy = container.get(&RETRY_POLICY).unwrap();
/// assert_eq!(3, policy.attempts);
/// ```
pub struct Key<T>
where
    T: Service,
{
    name: &'static str,
    marker: PhantomData<fn() -> T>,
}

impl<T> Key<T>
where
    T: Service,
{
    /// Creates a key with the given name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Key {
            name,
            marker: PhantomData,
        }
    }

    /// The name the instance is stored under.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The type of instance this key refers to.
    #[must_use]
    pub fn service_info(&self) -> ServiceInfo {
        ServiceInfo::of::<T>()
    }
}

impl<T: Service> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Service> Copy for Key<T> {}

impl<T: Service> Debug for Key<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("service", &self.service_info().name())
            .finish()
    }
}
