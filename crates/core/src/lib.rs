//! Randomized exam assembly.
//!
//! A bank of tagged questions is filtered and counted through a quota tree,
//! sampled until the summed difficulty lands near a target, and rendered
//! through the `((name,arg,...))` macro language into one text per output
//! channel.

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod assembler;
pub mod config;
pub mod error;
pub mod exam;
pub mod macros;
pub mod pipeline;
pub mod question;
pub mod quota;
pub mod render;
pub mod rng;
pub mod sampler;
pub mod tags;
pub mod templates;

pub use error::ExamError;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
