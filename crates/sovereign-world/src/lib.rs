//! Hex grid geometry and world generation for the Sovereign engine.
//!
//! # Modules
//!
//! - [`hex`] -- Neighbor offsets, adjacency, and pixel layout for the
//!   offset-coordinate hex map.
//! - [`generation`] -- Bulk creation of a fresh continent-shaped world.
//! - [`error`] -- Error types for world generation.

pub mod error;
pub mod generation;
pub mod hex;

pub use error::WorldError;
pub use generation::{MAX_WORLD_SIZE, generate_world, in_bounds};
pub use hex::{HEX_SIZE, is_adjacent, neighbors, to_pixel};
