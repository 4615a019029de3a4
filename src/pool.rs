use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::fmt;
use core::hash::Hash;
use core::ops;
use std::collections::HashMap;

use crate::maybe_sync::Mutex;
use crate::{BoxError, ConstructionError};

// -------------------------------------------------------------------------------------------------

/// A value which may be shared among all its equal occurrences, by way of a [`Pool`].
///
/// The [canonical key](SharedState::canonical_key) decides which values are the same:
/// values with equal keys are represented by a single pooled instance.
/// Keys should be structural (e.g. a tuple of the fields) rather than a joined string,
/// so that distinct values cannot produce the same key.
///
/// ```
/// use subpool::SharedState;
///
/// #[derive(Debug)]
/// struct Car {
///     brand: String,
///     model: String,
///     color: String,
/// }
///
/// impl SharedState for Car {
///     type Key = (String, String, String);
///     fn canonical_key(&self) -> Self::Key {
///         (self.brand.clone(), self.model.clone(), self.color.clone())
///     }
/// }
/// ```
pub trait SharedState {
    /// The type of the canonical key.
    type Key: Eq + Hash;

    /// Computes the key which identifies this value within a [`Pool`].
    ///
    /// Must be deterministic, and equal for values which are to be treated as equal.
    fn canonical_key(&self) -> Self::Key;
}

impl SharedState for String {
    type Key = String;
    fn canonical_key(&self) -> Self::Key {
        self.clone()
    }
}

macro_rules! impl_shared_state_for_tuple {
    ($($t:ident),+) => {
        impl<$($t: Clone + Eq + Hash),+> SharedState for ($($t,)+) {
            type Key = Self;
            fn canonical_key(&self) -> Self::Key {
                self.clone()
            }
        }
    };
}
impl_shared_state_for_tuple!(A);
impl_shared_state_for_tuple!(A, B);
impl_shared_state_for_tuple!(A, B, C);
impl_shared_state_for_tuple!(A, B, C, D);

// -------------------------------------------------------------------------------------------------

/// Keeps at most one instance of each distinct [`SharedState`] value, and hands out shared
/// references to it.
///
/// Entries are created the first time their key is requested and are never removed;
/// the pool holds a reference to every instance it has created for as long as the pool
/// exists. Callers receive [`Pooled`] handles and are never responsible for destroying
/// the instance.
///
/// If the `"sync"` feature is enabled, `Pool` is [`Sync`] (given a `Send + Sync` value
/// type), and concurrent requests for the same new key construct it only once.
///
/// # Example
///
/// ```
/// use subpool::{Pool, Pooled};
///
/// let pool: Pool<(&str, &str, &str)> = [("BMW", "M5", "red"), ("BMW", "X6", "white")]
///     .into_iter()
///     .collect();
/// assert_eq!(pool.count(), 2);
///
/// let a = pool.get_or_create(("BMW", "M5", "red"));
/// let b = pool.get_or_create(("BMW", "M5", "red"));
/// assert!(Pooled::ptr_eq(&a, &b));
/// assert_eq!(pool.count(), 2);
///
/// pool.get_or_create(("BMW", "X1", "red"));
/// assert_eq!(pool.count(), 3);
/// ```
pub struct Pool<S: SharedState> {
    entries: Mutex<HashMap<S::Key, Arc<S>>>,
}

/// Shared, read-only reference to an instance owned by a [`Pool`].
///
/// Dereferences to the pooled value. Clones refer to the same instance.
pub struct Pooled<S>(Arc<S>);

impl<S: SharedState> Pool<S> {
    /// Constructs a new empty [`Pool`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Constructs a new empty [`Pool`] with room for at least `capacity` distinct keys
    /// before reallocating.
    #[must_use]
    #[mutants::skip] // capacity is not observable
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::with_capacity(capacity)),
        }
    }

    /// Constructs a pool which already contains the given values.
    ///
    /// Equivalent to [`Pool::new()`] followed by [`Pool::seed()`].
    #[must_use]
    pub fn seeded(initial: impl IntoIterator<Item = S>) -> Self {
        let pool = Self::new();
        pool.seed(initial);
        pool
    }

    /// Adds each of the given values to the pool, exactly as if [`Pool::get_or_create()`]
    /// had been called with each and the results discarded.
    pub fn seed(&self, initial: impl IntoIterator<Item = S>) {
        for state in initial {
            let _ = self.get_or_create(state);
        }
    }

    /// Returns the pooled instance whose key equals `state`’s key, creating it from `state`
    /// if there is none yet.
    ///
    /// When an instance already exists, `state` is discarded and the existing instance is
    /// returned unmodified.
    ///
    /// # Panics
    ///
    /// Without the `"sync"` feature, panics if called from within a constructor passed to
    /// [`Pool::try_get_or_create()`] on the same pool.
    #[allow(clippy::must_use_candidate)]
    pub fn get_or_create(&self, state: S) -> Pooled<S> {
        match self.get_or_insert_with(state, |state, _| Ok::<S, Infallible>(state)) {
            Ok(pooled) => pooled,
            Err(never) => match never {},
        }
    }

    /// Like [`Pool::get_or_create()`], but if there is no instance yet, passes `state`
    /// through `construct` first, which may fail.
    ///
    /// `construct` is not called when an instance already exists. The value it returns
    /// must have the same key as `state`; otherwise it is discarded.
    ///
    /// `construct` runs while the pool is locked, so that no other caller can create an
    /// instance for the same key meanwhile. It must not use this pool.
    ///
    /// # Errors
    ///
    /// Returns the error from `construct`, if it fails, or an error if the value it returns
    /// has a different key than `state`. The pool is left unchanged.
    ///
    /// # Panics
    ///
    /// Without the `"sync"` feature, panics if `construct` uses this pool.
    /// With it, such use deadlocks.
    pub fn try_get_or_create<E, F>(
        &self,
        state: S,
        construct: F,
    ) -> Result<Pooled<S>, ConstructionError>
    where
        F: FnOnce(S) -> Result<S, E>,
        E: Into<BoxError>,
    {
        self.get_or_insert_with(state, |state, key| {
            let instance =
                construct(state).map_err(|error| ConstructionError::new(error.into()))?;
            if instance.canonical_key() != *key {
                log::debug!("pool constructor changed the canonical key");
                return Err(ConstructionError::new(
                    "constructor changed the canonical key".into(),
                ));
            }
            Ok(instance)
        })
    }

    fn get_or_insert_with<E>(
        &self,
        state: S,
        construct: impl FnOnce(S, &S::Key) -> Result<S, E>,
    ) -> Result<Pooled<S>, E> {
        let key = state.canonical_key();
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&key) {
            log::trace!("pool hit");
            return Ok(Pooled(Arc::clone(existing)));
        }

        let instance = Arc::new(construct(state, &key)?);
        entries.insert(key, Arc::clone(&instance));
        log::debug!("pool miss; now holding {} instances", entries.len());
        Ok(Pooled(instance))
    }

    /// Returns the pooled instance with the given key, if there is one, without creating it.
    #[must_use]
    pub fn get(&self, key: &S::Key) -> Option<Pooled<S>> {
        self.entries.lock().get(key).cloned().map(Pooled)
    }

    /// Returns the number of distinct keys in the pool.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns the keys of all pooled instances, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<S::Key>
    where
        S::Key: Clone,
    {
        self.entries.lock().keys().cloned().collect()
    }
}

impl<S: SharedState> Default for Pool<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SharedState> FromIterator<S> for Pool<S> {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::seeded(iter)
    }
}

impl<S: SharedState> fmt::Debug for Pool<S> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never multiline
        if let Some(entries) = self.entries.try_lock() {
            write!(fmt, "Pool({})", entries.len())
        } else {
            write!(fmt, "Pool(?)")
        }
    }
}

// -------------------------------------------------------------------------------------------------

impl<S> Pooled<S> {
    /// Returns whether `this` and `other` are the same instance, rather than merely equal.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<S> Clone for Pooled<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S> ops::Deref for Pooled<S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> AsRef<S> for Pooled<S> {
    fn as_ref(&self) -> &S {
        &self.0
    }
}

impl<S: fmt::Debug> fmt::Debug for Pooled<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&*self.0).finish()
    }
}

// -------------------------------------------------------------------------------------------------
