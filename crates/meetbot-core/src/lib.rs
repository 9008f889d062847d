//! Core types and trait definitions for meetbot.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the principal record, the token payload, the rules for merging a
//! login or a refresh into a stored record, and the [`store::PrincipalStore`]
//! trait that storage backends implement.

pub mod error;
pub mod principal;
pub mod store;
pub mod token;

pub use error::{Error, Result};
