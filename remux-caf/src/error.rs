//! Error types for CAF chunk coding.
//!
//! Chunk errors live in `remux-core` beside the other container error
//! enums; this module re-exports them with a crate-local result alias.

pub use remux_core::error::ChunkError;

/// Result type for CAF operations.
pub type Result<T> = std::result::Result<T, ChunkError>;
