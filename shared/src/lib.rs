//! Shared types and grading engine for the Oud Grading Platform
//!
//! This crate contains the pure segregation engine (criteria table, quality
//! scorer, segregation allocator) together with the batch models shared
//! between the backend services and the dashboard (via WASM).

pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
