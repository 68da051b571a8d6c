pub mod config;
pub mod preview;

pub use config::PreviewConfig;
