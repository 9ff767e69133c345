pub mod matcher;

pub use matcher::{MockMatcher, UpdateListener};
