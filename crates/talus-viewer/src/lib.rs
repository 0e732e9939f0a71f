//! Talus Viewer - terrain scanner viewer library
//!
//! This crate provides the `ViewerApp` application handler for flying
//! over heightmap terrain with the scan overlay, and the TOML config
//! that describes a scene.

mod app;
mod clock;
mod config;
mod input;
mod scene;

pub use app::ViewerApp;
pub use config::ViewerConfig;
