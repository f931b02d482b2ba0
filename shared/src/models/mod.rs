//! Domain models for the Oud Grading Platform

mod allocation;
mod batch;
mod criteria;
mod grade;
mod inspection;
mod scoring;

pub use allocation::*;
pub use batch::*;
pub use criteria::*;
pub use grade::*;
pub use inspection::*;
pub use scoring::*;
