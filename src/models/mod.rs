//! Data models for registry lookups.

mod degree;

pub use degree::{DegreeColumn, DegreeRecord};
