//! Tests for the region format implementations.
//!
//! These exercise the formats through the registry, the way callers use
//! them, and check round trips between text and regions.
