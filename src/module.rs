use crate::{
    container::{insert_entry, Entry, EntryMap},
    ContainerResult, Service,
};

/// A collection of instances that can be added all at once to a
/// [`ContainerBuilder`](crate::ContainerBuilder). Modules let each subsystem
/// contribute its own dependencies without touching the builder directly.
///
/// For creating a module easily via a domain specific language, see
/// [`define_module!`].
#[derive(Default)]
pub struct Module {
    pub(crate) entries: EntryMap,
}

impl Module {
    /// Registers an instance under `key`.
    ///
    /// # Errors
    ///
    /// Same as [`Container::register_instance`](crate::Container::register_instance).
    pub fn register_instance<T: Service>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> ContainerResult<()> {
        insert_entry(&mut self.entries, key.into(), Entry::new(value))
    }

    /// The number of instances in this module.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this module has no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Defines a new module from `key => value` pairs. Evaluates to a
/// [`ContainerResult<Module>`](crate::ContainerResult), stopping at the first
/// rejected registration (values after it are not evaluated).
///
/// # Example
///
/// ```
/// use context_container::{define_module, Container, ContainerError};
///
/// let module = define_module! {
///     "RequestTimeoutMs" => 500u64,
///     "UserAgent" => "crawler/1.0",
/// }
/// .unwrap();
/// assert_eq!(2, module.len());
///
/// let duplicate = define_module! {
///     "UserAgent" => "crawler/1.0",
///     "UserAgent" => "crawler/2.0",
/// };
/// assert!(matches!(duplicate, Err(ContainerError::DuplicateKey { .. })));
/// ```
#[macro_export]
macro_rules! define_module {
    {
        $($key:expr => $value:expr),*
        $(,)?
    } => {
        {
            #[allow(unused_mut)]
            let mut module = <$crate::Module as ::std::default::Default>::default();
            #[allow(unused_mut)]
            let mut result: $crate::ContainerResult<()> = ::std::result::Result::Ok(());
            $(
                if result.is_ok() {
                    result = module.register_instance($key, $value);
                }
            )*
            result.map(|()| module)
        }
    };
}
