pub mod error;
pub mod world;

pub use error::{ConfigError, Result, WorldGenError};
