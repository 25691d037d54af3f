//! Prism Core - shared error taxonomy for the Prism pipeline

pub mod error;

pub use error::{PrismError, Result};
