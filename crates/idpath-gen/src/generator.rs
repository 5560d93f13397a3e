//! Random id generation against an [`IdProvider`].

use std::sync::PoisonError;

use rand::Rng;
use tracing::{debug, warn};

use idpath_types::{Id, Outcome};

use crate::config::{GeneratorConfig, DEFAULT_RETRIES};
use crate::traits::IdProvider;

/// Draws random ids until one is free in a provider.
///
/// The generator holds no state besides its retry budget, so one instance
/// can serve any number of providers. Randomness comes from the calling
/// thread's RNG.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdGenerator {
    retries: u32,
}

impl IdGenerator {
    /// A generator that gives up after `retries` draws.
    pub fn new(retries: u32) -> Self {
        Self { retries }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.retries)
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Generate an id of `provider.id_size()` random bytes that the
    /// provider does not have.
    ///
    /// The provider's generation lock is held for the whole run. Fails with
    /// a timeout once the retry budget is spent; callers that want the
    /// invalid sentinel can use `unwrap_or(Id::INVALID)`.
    pub fn generate_id<P: IdProvider + ?Sized>(&self, provider: &P) -> Result<Id, Outcome> {
        let _guard = provider
            .generation_lock()
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.generate_id_locked(provider)
    }

    /// [`generate_id`](Self::generate_id) for callers already holding the
    /// provider's generation lock.
    pub fn generate_id_locked<P: IdProvider + ?Sized>(&self, provider: &P) -> Result<Id, Outcome> {
        let size = provider.id_size();
        if size == 0 {
            return Err(Outcome::fail("id size can't be 0."));
        }

        let mut rng = rand::thread_rng();
        let mut bytes = vec![0u8; usize::from(size)];
        for attempt in 1..=self.retries {
            rng.fill(&mut bytes[..]);
            let id = Id::new(bytes.clone());
            if !provider.has_id(&id) {
                debug!(%id, attempt, "generated id");
                return Ok(id);
            }
        }

        warn!(retries = self.retries, size, "id generation retry budget exhausted");
        Err(Outcome::fail(format!(
            "Generating random id timed out after {} attempts.",
            self.retries
        )))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES)
    }
}
