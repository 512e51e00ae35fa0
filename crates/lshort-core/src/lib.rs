//! Core types and traits for the lshort link shortener.
//!
//! This crate provides the key codec, the [`ShortKey`] type, the error
//! types shared by every backend and the [`LinkStore`] contract that the
//! storage backends implement.

pub mod codec;
pub mod error;
pub mod short_key;
pub mod store;

pub use error::{CodecError, LinkError, Operation, Result, StorageError};
pub use short_key::ShortKey;
pub use store::LinkStore;
