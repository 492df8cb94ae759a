//! # SparkHints compressed delta hints
//!
//! Compresses a glyph's Spark delta hints into a dense nybble opcode stream
//! and packs that stream with a fixed fused Huffman code, for storage in a
//! font binary. The stream can be decoded back into the hints it came from.
//!
//! ## Example
//!
//! ```
//! use sparkhints_codec::{Axis, CompressedHints, DeltaKind, Options, PhaseMap};
//!
//! let mut post = PhaseMap::new();
//! post.insert(Axis::X, 14, 0.25, DeltaKind::DeltaP, Some(9)).unwrap();
//! post.insert(Axis::X, 14, 0.25, DeltaKind::DeltaP, Some(10)).unwrap();
//!
//! let hints = CompressedHints::new(None, &post, &Options::new().verify(true)).unwrap();
//! let packed = hints.to_huffman().unwrap();
//! let back = CompressedHints::from_huffman(&packed).unwrap();
//! assert_eq!(back.run().unwrap(), (None, post));
//! ```

mod decode;
mod disasm;
mod encode;
mod error;
mod hints;
mod options;
mod pack;
mod spark;
mod state;
mod stats;
mod stream;
mod types;

pub mod grain;
pub mod group;
pub mod huffman;
pub mod opcode;

pub use decode::decode;
pub use disasm::{disassemble, instruction_line};
pub use encode::{encode, encode_with};
pub use error::{Error, Result};
pub use hints::CompressedHints;
pub use huffman::FusedKey;
pub use options::Options;
#[cfg(feature = "raw-format")]
pub use pack::{pack_raw, unpack_raw};
pub use pack::{
    GRAY_MARKER, HEADER_BYTE, MONO_MARKER, huffman_body_bits, pack_huffman, unpack_huffman,
};
pub use spark::{DeltaSpec, HeaderStyle, SparkDelta, SparkHints, SparkInstruction};
pub use state::{Base, DEFAULT_DELTA_BASE, DEFAULT_DELTA_SHIFT, EncoderState};
pub use stats::{FusedStatistics, Statistics};
pub use stream::{EMPTY_STREAM, Instructions, NybbleStream, Prolog};
pub use types::{Axis, DeltaHint, DeltaKind, HintTuple, PhaseMap, PpemMap, Shift, ShiftMap, flatten};
