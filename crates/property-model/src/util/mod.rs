//! Utility modules.

pub mod color;

pub use color::{rgba_float_to_hex, rgba_to_hex};
