#![forbid(unsafe_code)]

//! Observable primitives for declarative dialog binding.
//!
//! This crate provides the change-tracking building blocks the control layer
//! binds against:
//!
//! - [`Event`]: insertion-ordered, synchronous publish/subscribe.
//! - [`Subscription`]: RAII guard that unsubscribes its handler on drop.
//! - [`ObservableField`]: a single value cell raising `(old, new)` on change.
//! - [`ObservableList`]: an ordered sequence raising granular index maps or a
//!   reorder notification, with suspend/resume batching.
//! - [`ObservableMethod`] / [`ObservableCommand`]: wrapped callables whose
//!   "changed" event fires whenever a declared dependency changes.
//! - [`LinkedObservableList`] / [`ViewModelList`]: an observable list of
//!   view-models kept in lockstep with a backing model list.
//!
//! # Architecture
//!
//! Every primitive is a cheap, cloneable handle over `Rc`-shared interior
//! state. Handlers live inside the [`Event`] that raises them; whoever
//! subscribed holds a [`Subscription`] and releases the handler by dropping
//! it. Handlers that need to reach back into their owner capture a `Weak`
//! reference, so subscriptions never keep their subscriber alive.
//!
//! # Invariants
//!
//! 1. Handlers run synchronously, in registration order.
//! 2. A field raises its change event iff the assigned value differs from the
//!    stored one, and only after the store.
//! 3. A suspended list raises nothing; its resume raises at most one event.
//! 4. Methods and commands raise their changed event once per raw dependency
//!    notification, never on construction.
//! 5. Dropping a [`Subscription`] removes its handler before the next raise.

pub mod command;
pub mod event;
pub mod field;
pub mod linked;
pub mod list;
pub mod method;

pub use command::ObservableCommand;
pub use event::{Event, Handler, Subscription};
pub use field::{FieldChange, ObservableField};
pub use linked::{LinkedObservableList, ViewModelList};
pub use list::{ListChange, ObservableList, WeakObservableList};
pub use method::{Dependency, ObservableMethod};
