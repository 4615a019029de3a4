#![no_std]

//! Library for publishing state changes to subscribers, and for sharing one instance among
//! all equal occurrences of a value.
//!
//! # What `subpool` does
//!
//! `subpool` provides two independent primitives:
//!
//! * [`Notifier`] keeps a current message and delivers it to a dynamic set of
//!   [`Subscriber`]s. Subscribers may be attached and detached at any time, including from
//!   inside their own [`update()`](Subscriber::update): each delivery works from a snapshot
//!   of the subscribers attached when it began, so changes made during a delivery only
//!   affect the next one.
//!   The notifier does not own its subscribers; it holds weak references, and forgets
//!   subscribers that have been dropped.
//!
//! * [`Pool`] maps each distinct [`SharedState`] value, as identified by its canonical key,
//!   to a single shared instance. Requesting an equal value again returns the same instance
//!   rather than a copy. Per-use context (the part of the data which differs between uses)
//!   is never stored in the pool; callers keep it alongside the [`Pooled`] handle.
//!
//! # Getting started
//!
//! [`Notifier`] is generic over whether it is <code>[Send] + [Sync]</code>, and requires its
//! subscribers to be too. For convenience, less-generic type aliases are available in the
//! [`sync`] and [`unsync`] modules; the examples use these.
//!
//! ```
//! use std::rc::Rc;
//! use subpool::{Recorder, unsync::Notifier};
//!
//! let notifier: Notifier<&str> = Notifier::new();
//! let recorder = Rc::new(Recorder::new());
//! notifier.attach(&recorder);
//!
//! notifier.set_state("hello").unwrap();
//! assert_eq!(recorder.drain(), ["hello"]);
//! ```
//!
//! # Features and platform requirements
//!
//! `subpool` is compatible with `no_std` platforms, given the `alloc` standard library crate
//! and pointer-sized atomics.
//!
//! The following Cargo feature flags are defined:
//!
//! * `"std"` (default):
//!   Links [`std`]. Required for [`Pool`], which is backed by a hash map.
//!
//! * `"sync"`:
//!   Makes use of [`std::sync::Mutex`] to add [`Sync`] to [`Notifier`] and [`Pool`].
//!   Adds the type alias
#![cfg_attr(feature = "sync", doc = "   [`sync::Notifier`].")]
#![cfg_attr(not(feature = "sync"), doc = "   `sync::Notifier`.")]
//!
//! # Logging
//!
//! Attachment, detachment, failed deliveries, and pool misses are reported through the
//! [`log`] facade at `trace` and `debug` levels. No logger is installed by this library.
//!
//! # Limitations
//!
//! * [`Pooled`] always uses [`Arc`](alloc::sync::Arc), even when [`Rc`](alloc::rc::Rc)
//!   would do, so that its type does not vary with the `"sync"` feature.
//!
//! * Pool entries are never evicted.
//!
#![cfg_attr(not(feature = "std"), doc = " [`std`]: https://doc.rust-lang.org/std/")]
#![cfg_attr(
    not(feature = "std"),
    doc = " [`std::sync::Mutex`]: https://doc.rust-lang.org/std/sync/struct.Mutex.html"
)]
#![cfg_attr(
    not(feature = "std"),
    doc = " [`Pool`]: https://docs.rs/subpool/latest/subpool/struct.Pool.html"
)]
#![cfg_attr(
    not(feature = "std"),
    doc = " [`Pooled`]: https://docs.rs/subpool/latest/subpool/struct.Pooled.html"
)]
#![cfg_attr(
    not(feature = "std"),
    doc = " [`SharedState`]: https://docs.rs/subpool/latest/subpool/trait.SharedState.html"
)]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(explicit_outlives_requirements)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unnameable_types)]
#![warn(unused_extern_crates)]
#![warn(unused_lifetimes)]
#![warn(unreachable_pub)]
#![warn(
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc
)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::exhaustive_enums)]
#![warn(clippy::exhaustive_structs)]
#![warn(clippy::manual_let_else)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::pedantic)]
#![warn(clippy::return_self_not_must_use)]
#![warn(clippy::should_panic_without_expect)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::unnecessary_wraps)]
#![allow(clippy::bool_assert_comparison, reason = "less legible")]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::semicolon_if_nothing_returned, reason = "explicit delegation")]

// -------------------------------------------------------------------------------------------------

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

// -------------------------------------------------------------------------------------------------

mod error;
pub use error::{BoxError, ConstructionError, DeliveryError};

mod maybe_sync;

mod notifier;
pub use notifier::Notifier;

#[cfg(feature = "std")]
mod pool;
#[cfg(feature = "std")]
pub use pool::{Pool, Pooled, SharedState};

mod simple_subscribers;
pub use simple_subscribers::{Flag, Recorder};

mod subscriber;
pub use subscriber::{IntoSubscriberHandle, Subscriber, SubscriberHandle, SubscriberId};

// -------------------------------------------------------------------------------------------------

/// Type aliases for use in applications where subscribers are expected to implement [`Sync`].
///
/// Some of the items in this module are only available with the `"sync"` feature.
pub mod sync {
    use crate::Subscriber;
    use alloc::sync::{Arc, Weak};

    #[cfg(doc)]
    use crate::unsync;

    /// Type-erased form of a [`Subscriber`] which accepts messages of type `M`.
    ///
    /// This type is [`Send`] and [`Sync`]. When that is not satisfiable, use
    /// [`unsync::DynSubscriber`] instead.
    pub type DynSubscriber<M> = Arc<dyn Subscriber<M> + Send + Sync>;

    /// Non-owning reference to a [`DynSubscriber`], as held by [`Notifier`](crate::Notifier).
    ///
    /// This type is [`Send`] and [`Sync`]. When that is not satisfiable, use
    /// [`unsync::WeakSubscriber`] instead.
    pub type WeakSubscriber<M> = Weak<dyn Subscriber<M> + Send + Sync>;

    /// Message publisher.
    ///
    /// This type is [`Send`] and [`Sync`] (given a `Send` message type) and therefore requires
    /// all its [`Subscriber`]s to be so.
    /// When this requirement is undesired, use [`unsync::Notifier`] instead.
    #[cfg(feature = "sync")]
    pub type Notifier<M> = crate::Notifier<M, WeakSubscriber<M>>;
}

/// Type aliases for use in applications where subscribers are not expected to implement
/// [`Sync`].
#[cfg_attr(not(feature = "sync"), allow(rustdoc::broken_intra_doc_links))]
pub mod unsync {
    use crate::Subscriber;
    use alloc::rc::{Rc, Weak};

    #[cfg(doc)]
    use crate::sync;

    /// Type-erased form of a [`Subscriber`] which accepts messages of type `M`.
    ///
    /// This type is not [`Send`] or [`Sync`]. When that is needed, use
    /// [`sync::DynSubscriber`] instead.
    pub type DynSubscriber<M> = Rc<dyn Subscriber<M>>;

    /// Non-owning reference to a [`DynSubscriber`], as held by [`Notifier`](crate::Notifier).
    ///
    /// This type is not [`Send`] or [`Sync`]. When that is needed, use
    /// [`sync::WeakSubscriber`] instead.
    pub type WeakSubscriber<M> = Weak<dyn Subscriber<M>>;

    /// Message publisher.
    ///
    /// This type is not [`Send`] or [`Sync`]. When that is needed, use
    /// [`sync::Notifier`] instead.
    pub type Notifier<M> = crate::Notifier<M, WeakSubscriber<M>>;
}
