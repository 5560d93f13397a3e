//! In-memory id namespace.
//!
//! [`IdContainer`] keeps the ids it has handed out in a `HashSet` behind a
//! `Mutex`. It implements [`IdProvider`] so an [`IdGenerator`] can draw
//! against it, and [`IdAllocator`] to generate and register in one step.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroU8;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use idpath_types::{Id, Outcome};

use crate::config::{IdpathConfig, DEFAULT_ID_SIZE};
use crate::error::{GenError, Result};
use crate::generator::IdGenerator;
use crate::traits::{IdAllocator, IdProvider};

/// A thread-safe set of assigned ids of a fixed size.
///
/// Every membership check and mutation goes through one mutex. Generation
/// additionally takes the container's generation lock, held across the
/// draw and the insert, so concurrent callers never receive the same id.
#[derive(Debug)]
pub struct IdContainer {
    id_size: NonZeroU8,
    ids: Mutex<HashSet<Id>>,
    generation: Mutex<()>,
    generator: IdGenerator,
}

impl IdContainer {
    /// Create an empty container handing out `id_size`-byte ids.
    pub fn new(id_size: NonZeroU8) -> Self {
        Self::with_generator(id_size, IdGenerator::default())
    }

    pub fn with_generator(id_size: NonZeroU8, generator: IdGenerator) -> Self {
        Self {
            id_size,
            ids: Mutex::new(HashSet::new()),
            generation: Mutex::new(()),
            generator,
        }
    }

    /// Build a container from configuration. Fails on a zero id size.
    pub fn from_config(config: &IdpathConfig) -> Result<Self> {
        let id_size = NonZeroU8::new(config.container.id_size).ok_or(GenError::ZeroIdSize)?;
        Ok(Self::with_generator(
            id_size,
            IdGenerator::from_config(&config.generator),
        ))
    }

    /// Register `id`. Fails if it is invalid or already present.
    pub fn add_id(&self, id: Id) -> Outcome {
        if !id.is_valid() {
            return Outcome::fail_with("Cannot add an invalid id.", self);
        }
        let mut ids = self.lock_ids();
        if ids.contains(&id) {
            return Outcome::fail_with(format!("Id <{id}> already exists."), self);
        }
        debug!(%id, count = ids.len() + 1, "id added");
        ids.insert(id);
        Outcome::success()
    }

    /// Unregister `id`. Fails if it is not present.
    pub fn remove_id(&self, id: &Id) -> Outcome {
        let mut ids = self.lock_ids();
        if !ids.remove(id) {
            return Outcome::fail_with(format!("Id <{id}> does not exist."), self);
        }
        debug!(%id, count = ids.len(), "id removed");
        Outcome::success()
    }

    pub fn len(&self) -> usize {
        self.lock_ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_ids().is_empty()
    }

    /// Sorted snapshot of the registered ids.
    pub fn ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.lock_ids().iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Generate a fresh id, registering it when `add` is set.
    pub fn generate_id(&self, add: bool) -> std::result::Result<Id, Outcome> {
        let _guard = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = self
            .generator
            .generate_id_locked(self)
            .map_err(|failure| failure.append(self))?;
        if add {
            let added = self.add_id(id.clone());
            if added.is_failure() {
                return Err(added);
            }
        }
        Ok(id)
    }

    // Each critical section is a single set operation, so a poisoned set
    // is still consistent.
    fn lock_ids(&self) -> MutexGuard<'_, HashSet<Id>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for IdContainer {
    fn default() -> Self {
        match NonZeroU8::new(DEFAULT_ID_SIZE) {
            Some(size) => Self::new(size),
            None => unreachable!("default id size is non-zero"),
        }
    }
}

impl IdProvider for IdContainer {
    fn id_size(&self) -> u8 {
        self.id_size.get()
    }

    fn has_id(&self, id: &Id) -> bool {
        self.lock_ids().contains(id)
    }

    fn generation_lock(&self) -> &Mutex<()> {
        &self.generation
    }
}

impl IdAllocator for IdContainer {
    fn generate_id(&self, add: bool) -> std::result::Result<Id, Outcome> {
        IdContainer::generate_id(self, add)
    }
}

impl fmt::Display for IdContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdContainer(id_size={})", self.id_size)
    }
}
