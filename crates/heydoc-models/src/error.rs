//! Error types for the `heydoc-models` crate.
//!
//! All fallible constructors in this crate return variants of [`ModelError`].

/// Errors produced when constructing or validating model types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A required identifier was empty or whitespace-only.
    #[error("{field} must not be empty")]
    Empty {
        /// The name of the offending field.
        field: &'static str,
    },
}
