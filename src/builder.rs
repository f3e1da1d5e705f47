use crate::{
    container::{insert_entry, Entry, EntryMap},
    Container, ContainerError, ContainerResult, Module, Service,
    SharedContainer, Svc,
};

/// A builder for a [`Container`]. This covers the bootstrap phase: instances
/// are collected here, then [`build`](ContainerBuilder::build) freezes them
/// into a handle that can be passed to every subsystem.
///
/// # Example
///
/// ```
/// use context_container::{define_module, Container, SharedContainer};
///
/// let networking = define_module! {
///     "Host" => "localhost".to_string(),
///     "Port" => 8080u16,
/// }
/// .unwrap();
///
/// let mut builder = Container::builder();
/// builder.register_instance("Verbose", true).unwrap();
/// builder.add_module(networking).unwrap();
///
/// let container: SharedContainer = builder.build();
/// assert_eq!(8080, container.get_instance::<u16>("Port").unwrap());
/// assert_eq!(3, container.len());
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    entries: EntryMap,
}

impl ContainerBuilder {
    /// Registers an instance under `key`.
    ///
    /// # Errors
    ///
    /// Same as [`Container::register_instance`].
    pub fn register_instance<T: Service>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> ContainerResult<()> {
        insert_entry(&mut self.entries, key.into(), Entry::new(value))
    }

    /// Adds all the instances registered in a module. Either every instance
    /// is added or none are.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::DuplicateKey`] if any key in the module is
    /// already registered in this builder.
    pub fn add_module(&mut self, module: Module) -> ContainerResult<()> {
        let conflict = module.entries.keys().find_map(|key| {
            self.entries
                .get(key)
                .map(|existing| (key.clone(), existing.info))
        });
        if let Some((key, registered)) = conflict {
            tracing::warn!(key = %key, "module conflicts with a registered instance");
            return Err(ContainerError::DuplicateKey { key, registered });
        }

        tracing::debug!(instances = module.len(), "added module");
        self.entries.extend(module.entries);
        Ok(())
    }

    /// Whether an instance is already registered under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Builds the container and wraps it in a shared handle.
    #[must_use]
    pub fn build(self) -> SharedContainer {
        tracing::debug!(instances = self.entries.len(), "built container");
        Svc::new(Container::from_entries(self.entries))
    }
}
