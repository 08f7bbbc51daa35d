//! Core data models for the competition engine.

mod bracket;
mod fixture;
mod ids;
mod standings;
mod team;

pub use bracket::*;
pub use fixture::*;
pub use ids::*;
pub use standings::*;
pub use team::*;
