#[cfg(feature = "cli")]
pub mod cli;
pub mod vertical_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use vertical_config::VerticalConfig;
