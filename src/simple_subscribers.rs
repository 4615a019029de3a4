use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::maybe_sync::Mutex;
use crate::{BoxError, Subscriber};

// -------------------------------------------------------------------------------------------------

/// A [`Subscriber`] which stores all the messages it receives.
///
/// This is only intended for testing and demonstration; real subscribers should not
/// unboundedly accumulate messages.
///
/// # Generic parameters
///
/// * `M` is the type of the messages.
pub struct Recorder<M> {
    messages: Mutex<Vec<M>>,
}

impl<M> Recorder<M> {
    /// Constructs a new empty [`Recorder`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Remove and return all messages received so far.
    ///
    /// ```
    /// use subpool::{Recorder, Subscriber};
    ///
    /// let recorder = Recorder::new();
    /// recorder.update(&1).unwrap();
    /// recorder.update(&2).unwrap();
    /// assert_eq!(recorder.drain(), vec![1, 2]);
    /// recorder.update(&3).unwrap();
    /// assert_eq!(recorder.drain(), vec![3]);
    /// ```
    #[must_use]
    pub fn drain(&self) -> Vec<M> {
        core::mem::take(&mut *self.messages.lock())
    }
}

impl<M: fmt::Debug> fmt::Debug for Recorder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_tuple("Recorder");
        // Debug may be requested while a delivery to this recorder is in progress.
        match self.messages.try_lock() {
            Some(messages) => ds.field(&*messages),
            None => ds.field(&format_args!("<locked>")),
        };
        ds.finish()
    }
}

impl<M: Clone + fmt::Debug> Subscriber<M> for Recorder<M> {
    fn update(&self, message: &M) -> Result<(), BoxError> {
        self.messages.lock().push(message.clone());
        Ok(())
    }
}

impl<M> Default for Recorder<M> {
    // This implementation cannot be derived because we do not want M: Default
    fn default() -> Self {
        Self::new()
    }
}

// -------------------------------------------------------------------------------------------------

/// A [`Subscriber`] which records only whether any messages have been received,
/// until cleared.
///
/// It is implemented as an [`AtomicBool`], and is [`Send`] and [`Sync`] regardless of
/// whether the `"sync"` crate feature is enabled.
///
/// The atomic orderings used are [`Release`](Ordering::Release) for setting the flag, and
/// [`Acquire`](Ordering::Acquire) for reading and clearing it.
pub struct Flag {
    value: AtomicBool,
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never multiline
        write!(f, "Flag({:?})", self.value.load(Ordering::Relaxed))
    }
}

impl Flag {
    const SET_ORDERING: Ordering = Ordering::Release;
    const GET_CLEAR_ORDERING: Ordering = Ordering::Acquire;

    /// Constructs a new [`Flag`] with the given initial value.
    ///
    /// ```
    /// # use subpool::Flag;
    /// assert_eq!(Flag::new(false).get_and_clear(), false);
    /// assert_eq!(Flag::new(true).get_and_clear(), true);
    /// ```
    #[must_use]
    pub const fn new(value: bool) -> Self {
        Self {
            value: AtomicBool::new(value),
        }
    }

    /// Returns the flag value, setting it to [`false`] at the same time.
    #[allow(clippy::must_use_candidate)]
    #[inline]
    pub fn get_and_clear(&self) -> bool {
        self.value.swap(false, Self::GET_CLEAR_ORDERING)
    }

    /// Set the flag value to [`true`], as if a message had been received.
    #[inline]
    pub fn set(&self) {
        self.value.store(true, Self::SET_ORDERING);
    }
}

impl<M> Subscriber<M> for Flag {
    fn update(&self, _message: &M) -> Result<(), BoxError> {
        self.set();
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
