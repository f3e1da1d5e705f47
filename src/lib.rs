//! Keyed dependency injection.
//!
//! A [`Container`] lets independent subsystems publish and retrieve shared
//! dependencies (configuration objects, service handles, shared utilities) by
//! a string key, without knowing each other's concrete types or the order in
//! which they were constructed.
//!
//! By default, the container is thread-safe: instances are held in an `Arc<T>`
//! and the map of instances is guarded by a readers-writer lock. For
//! single-threaded hosts this can be changed by disabling default features
//! and enabling the "rc" feature, which uses `Rc<T>` and a `RefCell` instead:
//!
//! ```text
//! context_container = {
//!     version = "*",
//!     default_features = false,
//!     features = ["rc"]
//! }
//! ```
//!
//! # Keys and types
//!
//! Every instance is stored under a unique key and can never be replaced or
//! removed. The convention is to use the name of the interface the instance is
//! consumed as, rather than its concrete type: a `Svc<dyn Clock>` backed by a
//! `SystemClock` is registered as `"Clock"`.
//!
//! The type an instance was registered with is recorded next to it, and every
//! lookup is checked against it. Asking for the wrong type is reported as
//! [`ContainerError::TypeMismatch`] instead of reinterpreting the value. To rule
//! mismatches out entirely, use a typed [`Key`].
//!
//! # Errors
//!
//! Registering a key twice, getting a key that was never registered, and
//! getting a key with the wrong type are all mistakes in the calling code.
//! They are returned as [`ContainerError`]s so they can be propagated to the
//! application's startup code or unwrapped on the spot. Looking up a key that
//! might legitimately be missing is done with the `find_*` methods, which
//! return `Ok(None)` instead.
//!
//! # Example
//!
//! ```
//! use context_container::{Container, SharedContainer, Svc};
//! use std::error::Error;
//!
//! // An interface which the rest of the application depends on
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! struct FixedClock(u64);
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 {
//!         self.0
//!     }
//! }
//!
//! // A subsystem that only knows about the container, not about which clock
//! // is actually used
//! struct Scheduler {
//!     clock: Svc<dyn Clock>,
//! }
//!
//! impl Scheduler {
//!     fn new(container: &SharedContainer) -> Result<Self, Box<dyn Error>> {
//!         let clock = container.get_instance::<Svc<dyn Clock>>("Clock")?;
//!         Ok(Scheduler { clock })
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     // Everything is registered during bootstrap...
//!     let mut builder = Container::builder();
//!     let clock: Svc<dyn Clock> = Svc::new(FixedClock(42));
//!     builder.register_instance("Clock", clock)?;
//!     builder.register_instance("WorkerCount", 4usize)?;
//!
//!     // ...then the container is shared read-only with every subsystem
//!     let container = builder.build();
//!     let scheduler = Scheduler::new(&container)?;
//!     assert_eq!(42, scheduler.clock.now());
//!
//!     // Optional dependencies can be looked up without failing
//!     let tracing_enabled = container.find_instance::<bool>("Tracing")?;
//!     assert_eq!(None, tracing_enabled);
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]
#![warn(missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::doc_markdown,
    clippy::needless_doctest_main
)]

#[cfg(not(any(feature = "arc", feature = "rc")))]
compile_error!(
    "Either the 'arc' or 'rc' feature must be enabled (but not both)."
);

#[cfg(all(feature = "arc", feature = "rc"))]
compile_error!(
    "The 'arc' and 'rc' features are mutually exclusive and cannot be enabled together."
);

mod builder;
mod container;
mod key;
mod module;
mod service;

pub use builder::*;
pub use container::*;
pub use key::*;
pub use module::*;
pub use service::*;
