//! Error types for the `sovereign-economy` crate.

/// Errors raised by policy catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// The category or option key is not in the catalog.
    #[error("unknown policy option `{option}` in category `{category}`")]
    UnknownPolicy {
        /// Requested category name.
        category: String,
        /// Requested option key.
        option: String,
    },
}
