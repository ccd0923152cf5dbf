//! # Adaptive Huffman Coding
//!
//! *One-pass Huffman compression without a code table.*
//!
//! ## Intuition First
//!
//! Static Huffman coding reads the input twice: once to count symbols, once to
//! emit codes, and the counts travel with the output so the decoder can build
//! the same tree. Adaptive Huffman coding skips the first pass. Encoder and
//! decoder both start from an empty tree and update it after every symbol in
//! exactly the same way, so the decoder always knows the encoder's tree
//! without being told.
//!
//! A symbol never seen before is sent as the code of a special leaf, NYT
//! ("not yet transmitted"), followed by the raw byte. The NYT leaf then
//! splits into an internal node holding NYT and a fresh leaf for the symbol.
//!
//! ## The Problem
//!
//! After every occurrence the tree must stay a Huffman tree for the counts
//! seen so far. Rebuilding from scratch is far too slow. The FGK scheme keeps
//! every node numbered by an *order* such that frequencies never rise with
//! order (the sibling property). Incrementing a leaf only ever requires
//! swapping it, and then each ancestor, to the front of its block of
//! equal-weight nodes before the increment.
//!
//! ## Historical Context
//!
//! ```text
//! 1952  Huffman     Minimum-redundancy prefix codes
//! 1973  Faller      Adaptive Huffman coding, one pass
//! 1978  Gallager    Sibling property; incremental update
//! 1985  Knuth       Dynamic Huffman coding (the FGK algorithm)
//! 1987  Vitter      Algorithm V: fewer swaps, better worst case
//! ```
//!
//! ## Stream Format
//!
//! ```text
//! Stream := Unit*
//! Unit   := Code Literal     (Code leads to NYT)
//!         | Code             (Code leads to a symbol leaf)
//! ```
//!
//! Bits are packed most-significant first. There is no header and no end
//! marker; decoding stops as soon as the input runs out, even mid-code. The
//! final byte is padded (see [`Padding`]).
//!
//! ## Complexity Analysis
//!
//! - **Time**: $O(n)$ per symbol, with $n \le 513$ live nodes (code walk plus
//!   linear scans for the symbol and for swap candidates).
//! - **Space**: $O(n)$ for the node arena.
//!
//! ## Example
//!
//! ```rust
//! let data = b"abracadabra";
//! let coded = ahed::encode_bytes(data)?;
//! assert_eq!(ahed::decode_bytes(&coded)?, data.to_vec());
//! # Ok::<(), ahed::Error>(())
//! ```
//!
//! ## References
//!
//! - Knuth, D. E. (1985). "Dynamic Huffman Coding." Journal of Algorithms 6(2).
//! - Vitter, J. S. (1987). "Design and Analysis of Dynamic Huffman Codes." JACM 34(4).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitio;
pub mod codec;
pub mod error;
pub mod tree;

pub use codec::{
    decode, decode_bytes, encode, encode_bytes, encode_with_config, Decoder, Encoder,
    EncoderConfig, Padding, Summary,
};
pub use error::{Error, Result};
pub use tree::{CodePath, Node, NodeId, Symbol, Tree, ALPHABET_SIZE, MAX_NODES};
