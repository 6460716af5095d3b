//! # Hookwire Kernel
//!
//! Crate-wide constants and the top-level [`Error`](error::Error) type that
//! wraps every subsystem error.
pub mod constants;
pub mod error;

pub use error::{Error, Result};
