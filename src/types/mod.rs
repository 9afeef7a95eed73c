//! Core type system and domain definitions
//!
//! This module provides the central type definitions for the stats engine:
//! repository identities, language aggregates, the persisted cache document
//! and the final statistics snapshot.

pub mod cache;
pub mod language;
pub mod lenient;
pub mod repository;
pub mod stats;
pub mod user;

pub use cache::*;
pub use language::*;
pub use repository::*;
pub use stats::*;
pub use user::*;
