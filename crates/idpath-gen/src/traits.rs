//! The [`IdProvider`] and [`IdAllocator`] traits.
//!
//! A provider owns an id namespace: it knows how long new ids should be
//! and which ids are taken. [`IdGenerator`](crate::IdGenerator) draws
//! against any provider; [`IdContainer`](crate::IdContainer) is the stock
//! implementation, and tests substitute their own.

use std::sync::Mutex;

use idpath_types::{Id, Outcome};

/// A namespace of ids that new ids must not collide with.
pub trait IdProvider: Send + Sync {
    /// Byte length of ids generated for this provider.
    fn id_size(&self) -> u8;

    /// Returns `true` if `id` is already taken.
    fn has_id(&self, id: &Id) -> bool;

    /// Lock held for a whole generation run against this provider, so two
    /// generators cannot both settle on the same free draw.
    fn generation_lock(&self) -> &Mutex<()>;
}

/// Something that hands out fresh ids from its own namespace.
pub trait IdAllocator {
    /// Generate an id not yet in the namespace, adding it when `add` is set.
    ///
    /// On failure the error is a failed [`Outcome`]; there is no id.
    fn generate_id(&self, add: bool) -> Result<Id, Outcome>;
}
