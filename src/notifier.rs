use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use crate::maybe_sync::Mutex;
use crate::{DeliveryError, IntoSubscriberHandle, SubscriberHandle, SubscriberId};

// -------------------------------------------------------------------------------------------------

#[cfg_attr(not(feature = "sync"), allow(rustdoc::broken_intra_doc_links))]
/// Message publisher.
///
/// A `Notifier<M, H>` holds a current message of type `M` and delivers it to a dynamic set
/// of [`Subscriber`](crate::Subscriber)s, which it refers to by handles of type `H`.
/// `H` is a weak reference type such as [`unsync::WeakSubscriber`](crate::unsync::WeakSubscriber);
/// the notifier never owns its subscribers, and subscribers which have been dropped are
/// skipped and forgotten.
///
/// We recommend that you use the type aliases [`sync::Notifier`](crate::sync::Notifier)
/// or [`unsync::Notifier`](crate::unsync::Notifier), to avoid writing the type parameter
/// `H` outside of special cases.
///
/// # Delivery
///
/// Each delivery first takes a snapshot of the currently attached subscribers, then
/// calls [`Subscriber::update()`](crate::Subscriber::update) on each of them in the order
/// they were attached. No lock is held while a subscriber runs, so subscribers may attach
/// and detach (themselves or others) freely; those changes affect only later deliveries.
///
/// ```
/// use std::rc::Rc;
/// use subpool::{Recorder, unsync::Notifier};
///
/// let notifier: Notifier<String> = Notifier::new();
/// let first = Rc::new(Recorder::new());
/// let second = Rc::new(Recorder::new());
/// notifier.attach(&first);
/// notifier.attach(&second);
///
/// notifier.set_state("hello".to_string()).unwrap();
/// assert_eq!(first.drain(), ["hello"]);
/// assert_eq!(second.drain(), ["hello"]);
///
/// notifier.detach(&first);
/// notifier.set_state("again".to_string()).unwrap();
/// assert!(first.drain().is_empty());
/// assert_eq!(second.drain(), ["again"]);
/// ```
pub struct Notifier<M, H> {
    registry: Mutex<Registry<H>>,
    state: Mutex<M>,
    _phantom: PhantomData<fn(&M)>,
}

struct Registry<H> {
    entries: Vec<Entry<H>>,
    /// The last ID handed out; IDs start at 1.
    last_id: u64,
}

struct Entry<H> {
    id: SubscriberId,
    handle: H,
}

impl<M, H: SubscriberHandle<M>> Notifier<M, H> {
    /// Constructs a new [`Notifier`] with no subscribers, whose current message is
    /// `M::default()`.
    #[must_use]
    pub fn new() -> Self
    where
        M: Default,
    {
        Self::with_state(M::default())
    }

    /// Constructs a new [`Notifier`] with no subscribers and the given current message.
    #[must_use]
    pub fn with_state(initial: M) -> Self {
        Self {
            registry: Mutex::new(Registry {
                entries: Vec::new(),
                last_id: 0,
            }),
            state: Mutex::new(initial),
            _phantom: PhantomData,
        }
    }

    /// Adds a subscriber, which will receive all messages delivered after this call.
    ///
    /// If the subscriber is already attached, this does nothing and returns the ID it was
    /// given when first attached, so a subscriber never receives one message twice.
    ///
    /// The notifier keeps only a weak reference to the subscriber.
    pub fn attach<S: IntoSubscriberHandle<M, H>>(&self, subscriber: S) -> SubscriberId {
        let handle = subscriber.into_subscriber_handle();
        let mut registry = self.registry.lock();
        registry.cleanup::<M>();
        if let Some(existing) = registry
            .entries
            .iter()
            .find(|entry| entry.handle.same_subscriber(&handle))
        {
            log::trace!("subscriber {} already attached", existing.id);
            return existing.id;
        }

        registry.last_id += 1;
        let id = SubscriberId::from_raw(registry.last_id);
        registry.entries.push(Entry { id, handle });
        log::trace!("attached subscriber {id}");
        id
    }

    /// Removes a subscriber, so that it receives no messages from deliveries which start
    /// after this call.
    ///
    /// Returns whether the subscriber was attached. Detaching a subscriber which is not
    /// attached is not an error.
    #[allow(clippy::must_use_candidate)]
    pub fn detach<S: IntoSubscriberHandle<M, H>>(&self, subscriber: S) -> bool {
        let handle = subscriber.into_subscriber_handle();
        self.remove_where(|entry| entry.handle.same_subscriber(&handle))
    }

    /// Removes the subscriber which was given `id` by [`Notifier::attach()`].
    ///
    /// Returns whether the subscriber was attached. Detaching a subscriber which is not
    /// attached is not an error.
    #[allow(clippy::must_use_candidate)]
    pub fn detach_id(&self, id: SubscriberId) -> bool {
        self.remove_where(|entry| entry.id == id)
    }

    fn remove_where(&self, mut predicate: impl FnMut(&Entry<H>) -> bool) -> bool {
        let mut registry = self.registry.lock();
        let Some(index) = registry.entries.iter().position(|entry| predicate(entry)) else {
            return false;
        };
        let Entry { id, .. } = registry.entries.remove(index);
        log::trace!("detached subscriber {id}");
        true
    }

    /// Returns a clone of the current message.
    #[must_use]
    pub fn state(&self) -> M
    where
        M: Clone,
    {
        self.state.lock().clone()
    }

    /// Replaces the current message, then delivers it to all subscribers as if by
    /// [`Notifier::notify()`].
    ///
    /// # Errors
    ///
    /// Returns an error if any subscriber’s update fails. The new message is kept as the
    /// current message regardless.
    pub fn set_state(&self, message: M) -> Result<(), DeliveryError>
    where
        M: Clone,
    {
        *self.state.lock() = message.clone();
        self.deliver(&message, None)
    }

    /// Deliver the current message to every subscriber attached when this call begins.
    ///
    /// Delivering to no subscribers at all is not an error.
    ///
    /// # Errors
    ///
    /// If a subscriber’s update fails, delivery stops and the error is returned.
    /// Subscribers after the failing one do not receive the message.
    pub fn notify(&self) -> Result<(), DeliveryError>
    where
        M: Clone,
    {
        let message = self.state();
        self.deliver(&message, None)
    }

    /// Like [`Notifier::notify()`], but skips the subscriber identified by `modifier`,
    /// which is typically the one whose action caused the change being published.
    ///
    /// # Errors
    ///
    /// If a subscriber’s update fails, delivery stops and the error is returned.
    pub fn notify_except(&self, modifier: SubscriberId) -> Result<(), DeliveryError>
    where
        M: Clone,
    {
        let message = self.state();
        self.deliver(&message, Some(modifier))
    }

    fn deliver(&self, message: &M, skip: Option<SubscriberId>) -> Result<(), DeliveryError> {
        // Subscribers may re-enter this notifier, so nothing is locked past this statement.
        let snapshot: Vec<(SubscriberId, H)> = self
            .registry
            .lock()
            .entries
            .iter()
            .filter(|entry| Some(entry.id) != skip)
            .map(|entry| (entry.id, entry.handle.clone()))
            .collect();

        let mut saw_dropped = false;
        let mut result = Ok(());
        for (id, handle) in snapshot {
            match handle.with_subscriber(|subscriber| subscriber.update(message)) {
                None => saw_dropped = true,
                Some(Ok(())) => {}
                Some(Err(source)) => {
                    log::debug!("delivery to subscriber {id} failed: {source}");
                    result = Err(DeliveryError::new(id, source));
                    break;
                }
            }
        }

        if saw_dropped {
            self.registry.lock().cleanup::<M>();
        }
        result
    }

    /// Counts the subscribers which are attached and still exist.
    ///
    /// This operation is intended for testing and diagnostic purposes.
    #[must_use]
    pub fn count(&self) -> usize {
        let mut registry = self.registry.lock();
        registry.cleanup::<M>();
        registry.entries.len()
    }
}

impl<H> Registry<H> {
    /// Discard entries whose subscriber has been dropped.
    fn cleanup<M>(&mut self)
    where
        H: SubscriberHandle<M>,
    {
        self.entries.retain(|entry| entry.handle.is_alive());
    }
}

impl<M: Default, H: SubscriberHandle<M>> Default for Notifier<M, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, H> fmt::Debug for Notifier<M, H> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        // not using fmt.debug_tuple() so this is never printed on multiple lines
        if let Some(registry) = self.registry.try_lock() {
            write!(fmt, "Notifier({})", registry.entries.len())
        } else {
            write!(fmt, "Notifier(?)")
        }
    }
}

// -------------------------------------------------------------------------------------------------
