//! Eviction policies built on the persistent structures.

pub mod priority;
