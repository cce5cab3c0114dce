//! `venuity-core` — shared primitives with no infrastructure concerns.
//!
//! Everything here is plain owned data, constructed once at startup and
//! passed by reference afterwards.

pub mod environment;

pub use environment::{Environment, ParseEnvironmentError};
