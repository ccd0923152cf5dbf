//! Error types for adaptive Huffman coding.

use thiserror::Error;

/// Error variants for encoding and decoding runs.
#[derive(Debug, Error)]
pub enum Error {
    /// The node arena cannot hold another symbol.
    #[error("tree full: inserting a symbol would exceed {capacity} nodes")]
    TreeFull {
        /// Maximum number of live nodes.
        capacity: usize,
    },

    /// A literal arrived for a symbol that already has a leaf.
    ///
    /// Only a corrupt stream produces this.
    #[error("literal byte {0:#04x} is already in the tree")]
    DuplicateLiteral(u8),

    /// A structural invariant of the tree does not hold.
    #[error("tree invariant violated: {0}")]
    InvariantViolation(String),

    /// An I/O error occurred during encoding or decoding.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for adaptive Huffman operations.
pub type Result<T> = std::result::Result<T, Error>;
