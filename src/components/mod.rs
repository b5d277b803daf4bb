//! Canvas components.

pub mod migration_map;
