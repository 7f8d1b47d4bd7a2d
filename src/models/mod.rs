//! Data models for the location picker

pub mod location;

pub use location::{Coordinates, Location, SearchCandidate};
