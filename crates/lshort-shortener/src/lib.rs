//! Async link shortener service.
//!
//! This crate adapts a blocking [`LinkStore`](lshort_core::LinkStore) to
//! async request handlers. Core types are re-exported from `lshort_core`.

pub mod error;
pub mod service;

pub use error::{Result, ShortenerError};
pub use lshort_core::ShortKey;
pub use service::{Shortener, ShortenerService};
