pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dump;
pub mod engine;
pub mod geometry;
pub mod index;
pub mod place;
pub mod scene;
pub mod text_metrics;

#[cfg(feature = "cli")]
pub use cli::run;
