//! Data model for advocate lifecycle events and their projections.
//!
//! [`AdvocateEvent`] is a closed sum type over the three lifecycle
//! variants. The aggregates in [`advocate`] are the outputs of folding an
//! event sequence.

pub mod advocate;
pub mod event;

pub use advocate::*;
pub use event::*;
