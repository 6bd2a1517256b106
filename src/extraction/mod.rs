//! Profile parsing and event construction.
//!
//! - [`fields`]: label-based field extraction from profile text
//! - [`builder`]: one classified change plus file contents to one event

mod builder;
mod fields;

pub use builder::*;
pub use fields::*;
