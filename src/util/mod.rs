pub mod parse;

pub use parse::{parse_float, parse_int};
