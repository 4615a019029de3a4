use alloc::boxed::Box;

use crate::SubscriberId;

#[cfg(doc)]
use crate::{Notifier, Subscriber};

/// Type-erased error which a [`Subscriber`] may report from [`Subscriber::update()`],
/// or which a pool constructor may fail with.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// A [`Subscriber`] failed to accept a message.
///
/// Returned by [`Notifier::notify()`] and related methods. Delivery stops at the first
/// failure; subscribers earlier in the same delivery have already received the message,
/// and subscribers later in it have not.
#[derive(Debug, thiserror::Error)]
#[error("subscriber {subscriber} failed to accept update")]
pub struct DeliveryError {
    subscriber: SubscriberId,
    #[source]
    source: BoxError,
}

impl DeliveryError {
    pub(crate) fn new(subscriber: SubscriberId, source: BoxError) -> Self {
        Self { subscriber, source }
    }

    /// Returns the ID of the subscriber whose update failed.
    #[must_use]
    pub fn subscriber(&self) -> SubscriberId {
        self.subscriber
    }

    /// Returns the error the subscriber reported.
    #[must_use]
    pub fn into_source(self) -> BoxError {
        self.source
    }
}

/// Constructing a new pooled instance failed; the pool is unchanged.
///
/// Returned by `Pool::try_get_or_create()`.
#[derive(Debug, thiserror::Error)]
#[error("failed to construct pooled instance")]
pub struct ConstructionError {
    #[source]
    source: BoxError,
}

impl ConstructionError {
    pub(crate) fn new(source: BoxError) -> Self {
        Self { source }
    }

    /// Returns the error the constructor reported.
    #[must_use]
    pub fn into_source(self) -> BoxError {
        self.source
    }
}
