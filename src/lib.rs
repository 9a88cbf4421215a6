#![doc = include_str!("RUSTDOC.md")]

pub mod analytics;
pub mod logger;
pub mod platform;
pub mod util;

pub use analytics::{InitOptions, Sparga};

#[cfg(test)]
pub(crate) mod test_support;
