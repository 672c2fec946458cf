//! Region format implementations.

pub mod ds9;
mod json;

#[cfg(test)]
mod tests;

pub use ds9::Ds9Format;
pub use json::{JsonFormat, RegionsDocument};
