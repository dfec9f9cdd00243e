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

//! # Candela Grid
//!
//! Domain overlays built on top of [`candela_events::Event`] and [`candela_execution::Connector`]:
//! a [`grid::Grid`] ladder of resting orders re-anchored as its levels change, and a
//! [`rebalancer`] capital allocator that keeps a portfolio's currency mix synchronized to a
//! target weighting. Neither is part of the core engine loop — a strategy opts into one or both
//! by calling them from its own `next` step.

/// A ladder of resting orders bound to a single symbol. See [`grid::Grid`].
pub mod grid;

/// Target currency weighting and the synchronize/occur capital-allocator operations.
pub mod rebalancer;

pub use grid::{Grid, GridLevel};
pub use rebalancer::{occur, synchronize, PortfolioWeights};
