//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **Language**: Two-letter course language code

mod language;

pub use language::*;
