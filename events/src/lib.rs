#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Candela Events
//!
//! A strategy's `next` step does not call a [`candela_execution::Connector`] directly; it
//! returns an [`event::Event`] describing the order-management action(s) it wants applied. The
//! driver loop then calls [`event::Event::apply`] against the live connector. This indirection
//! lets `Sequential` and `Parallel` composites express multi-step intent (cancel-then-replace,
//! fan out across several orders) without a strategy needing to know how those are executed.

/// The composable event tree and its application logic. See [`event::Event`].
pub mod event;

pub use event::Event;
