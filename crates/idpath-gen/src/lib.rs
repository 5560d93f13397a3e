//! Id generation and id namespaces for idpath.
//!
//! # Architecture
//!
//! - An [`IdProvider`] owns a namespace: a fixed id size and a membership
//!   test.
//! - [`IdGenerator`] draws random ids until one is free in a provider,
//!   giving up after a retry budget.
//! - [`IdContainer`] is a mutex-guarded set of ids that is both a provider
//!   and an [`IdAllocator`].
//!
//! # Modules
//!
//! - [`error`] — Setup and configuration errors
//! - [`traits`] — The [`IdProvider`] and [`IdAllocator`] traits
//! - [`generator`] — [`IdGenerator`]
//! - [`container`] — [`IdContainer`]
//! - [`config`] — TOML-backed [`IdpathConfig`]

pub mod config;
pub mod container;
pub mod error;
pub mod generator;
pub mod traits;

pub use config::{ContainerConfig, GeneratorConfig, IdpathConfig, DEFAULT_ID_SIZE, DEFAULT_RETRIES};
pub use container::IdContainer;
pub use error::{GenError, Result};
pub use generator::IdGenerator;
pub use traits::{IdAllocator, IdProvider};
