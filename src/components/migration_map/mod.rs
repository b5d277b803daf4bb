//! Migration flows drawn over a world map.
//!
//! Geometry, flow selection, scales, curves, animation and viewport are plain
//! Rust; only `component` and `render` touch the browser.

pub mod animator;
mod component;
pub mod color;
pub mod config;
pub mod curve;
pub mod error;
pub mod flows;
pub mod geometry;
pub mod index;
mod render;
pub mod scale;
pub mod scene;
pub mod state;
pub mod topology;
pub mod types;
pub mod viewport;

pub use component::MigrationMap;
pub use config::{MapConfig, MapStyle};
pub use error::MapError;
pub use render::render;
pub use state::MapState;
pub use topology::Topology;
pub use types::{MigrationRecord, Point};
