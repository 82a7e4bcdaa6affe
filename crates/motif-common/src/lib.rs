//! Motif shared types.
//!
//! This crate holds the pieces every other Motif crate agrees on:
//! - The [`Label`] symbol type that names trained classes.
//! - The unified [`Error`] taxonomy and [`Result`] alias.

pub mod error;
pub mod label;

pub use error::{Error, ErrorCategory, HandleKind, Result};
pub use label::Label;
