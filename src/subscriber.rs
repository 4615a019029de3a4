use alloc::rc::{self, Rc};
use alloc::sync::{self, Arc};
use core::fmt;

use crate::{unsync, BoxError};

#[cfg(doc)]
use crate::Notifier;

// -------------------------------------------------------------------------------------------------

/// A recipient of messages published by a [`Notifier`].
///
/// Subscribers are registered with [`Notifier::attach()`], which stores only a weak
/// reference; the subscriber's owner decides how long it lives, and a dropped subscriber
/// is forgotten by every notifier it was attached to.
///
/// # Generic parameters
///
/// * `M` is the type of message that can be received.
pub trait Subscriber<M>: fmt::Debug {
    /// Accept a newly published message.
    ///
    /// Returning an error stops the delivery in progress: subscribers that come after this
    /// one do not receive the message, and the error is returned to whoever called
    /// [`Notifier::notify()`].
    ///
    /// It is permitted to [attach](Notifier::attach) or [detach](Notifier::detach)
    /// subscribers, including this one, from within `update()`. Such changes take effect
    /// starting with the next delivery.
    ///
    /// # Errors
    ///
    /// Any error the subscriber wishes to report to the publisher.
    fn update(&self, message: &M) -> Result<(), BoxError>;
}

// -------------------------------------------------------------------------------------------------

/// Identifies one attachment of a [`Subscriber`] to a [`Notifier`].
///
/// IDs are assigned by each notifier in increasing order, starting at 1, and are never
/// reused by that notifier.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the numeric value of this ID.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// -------------------------------------------------------------------------------------------------
// Weak handles.

/// Non-owning reference to a type-erased [`Subscriber`], as stored by a [`Notifier`].
///
/// This trait is implemented for [`unsync::WeakSubscriber`] and
/// [`sync::WeakSubscriber`](crate::sync::WeakSubscriber), and generally does not need to
/// be implemented elsewhere.
pub trait SubscriberHandle<M>: Clone {
    /// If the subscriber still exists, calls `f` with it.
    fn with_subscriber<R>(&self, f: impl FnOnce(&dyn Subscriber<M>) -> R) -> Option<R>;

    /// Returns whether the subscriber still exists.
    fn is_alive(&self) -> bool;

    /// Returns whether `self` and `other` refer to the same subscriber.
    fn same_subscriber(&self, other: &Self) -> bool;
}

impl<M> SubscriberHandle<M> for unsync::WeakSubscriber<M> {
    fn with_subscriber<R>(&self, f: impl FnOnce(&dyn Subscriber<M>) -> R) -> Option<R> {
        self.upgrade().map(|strong| f(&*strong))
    }

    fn is_alive(&self) -> bool {
        self.strong_count() > 0
    }

    fn same_subscriber(&self, other: &Self) -> bool {
        rc::Weak::ptr_eq(self, other)
    }
}

impl<M> SubscriberHandle<M> for crate::sync::WeakSubscriber<M> {
    fn with_subscriber<R>(&self, f: impl FnOnce(&dyn Subscriber<M>) -> R) -> Option<R> {
        self.upgrade().map(|strong| f(&*strong))
    }

    fn is_alive(&self) -> bool {
        self.strong_count() > 0
    }

    fn same_subscriber(&self, other: &Self) -> bool {
        sync::Weak::ptr_eq(self, other)
    }
}

/// Conversion from a reference to a subscriber into the [`SubscriberHandle`] type `H`
/// which a [`Notifier`] stores.
///
/// This is what lets [`Notifier::attach()`] accept `&Rc<MySubscriber>` (for
/// [`unsync::Notifier`]) or `&Arc<MySubscriber>` (for
/// [`sync::Notifier`](crate::sync::Notifier)) without the caller writing the coercion.
///
/// # Generic parameters
///
/// * `M` is the type of message accepted by the subscriber.
/// * `H` is the handle type being converted to.
pub trait IntoSubscriberHandle<M, H: SubscriberHandle<M>> {
    /// Produce a handle referring to the same subscriber.
    fn into_subscriber_handle(self) -> H;
}

impl<M, S> IntoSubscriberHandle<M, unsync::WeakSubscriber<M>> for &Rc<S>
where
    S: Subscriber<M> + 'static,
{
    fn into_subscriber_handle(self) -> unsync::WeakSubscriber<M> {
        let weak: rc::Weak<S> = Rc::downgrade(self);
        weak
    }
}

impl<M, S> IntoSubscriberHandle<M, crate::sync::WeakSubscriber<M>> for &Arc<S>
where
    S: Subscriber<M> + Send + Sync + 'static,
{
    fn into_subscriber_handle(self) -> crate::sync::WeakSubscriber<M> {
        let weak: sync::Weak<S> = Arc::downgrade(self);
        weak
    }
}

impl<M> IntoSubscriberHandle<M, unsync::WeakSubscriber<M>> for unsync::WeakSubscriber<M> {
    fn into_subscriber_handle(self) -> unsync::WeakSubscriber<M> {
        self
    }
}

impl<M> IntoSubscriberHandle<M, crate::sync::WeakSubscriber<M>> for crate::sync::WeakSubscriber<M> {
    fn into_subscriber_handle(self) -> crate::sync::WeakSubscriber<M> {
        self
    }
}

// -------------------------------------------------------------------------------------------------
