//! Error types for the `sovereign-world` crate.

/// Errors that can occur while generating a world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The requested map edge length is zero or beyond the supported range.
    #[error("world size {size} is outside 1..={max}")]
    InvalidSize {
        /// Requested edge length.
        size: u32,
        /// Largest supported edge length.
        max: u32,
    },
}
