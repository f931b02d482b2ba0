//! Oud Grading Platform - host services
//!
//! Batch registry, segregation workflow and reporting built on the pure
//! grading engine in `shared`.

pub mod config;
pub mod error;
pub mod services;

pub use config::Config;
