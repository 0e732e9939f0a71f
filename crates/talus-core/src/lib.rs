//! Talus Core - Foundational types for the talus terrain viewer
//!
//! This crate provides the types every other talus crate depends on:
//! - `Vec3`, `Mat4`, `Transform` - Spatial types (column-major matrices)
//! - `Color` - Linear RGBA color
//! - Error types and Result alias

mod error;
mod types;

pub use error::{Result, TalusError};
pub use types::{mat4_mul, Color, Mat4, Transform, Vec3, MAT4_IDENTITY};
