//! CLI command implementations.

mod analyze;
mod compress;
mod disasm;
mod stats;

use anyhow::{Context, Result};
use sparkhints_codec::CompressedHints;

use crate::io::GlyphRecord;

pub use analyze::{analyze, analyze_glyph, render_phase_map};
pub use compress::{compress, compress_glyph, compress_to};
pub use disasm::{disasm, disasm_glyph};
pub use stats::{render_fused, render_split, stats};

/// Unpack a glyph's stream from its fused-Huffman or raw form.
fn unpack(record: &GlyphRecord, raw: bool) -> Result<CompressedHints> {
    let hints = if raw {
        CompressedHints::from_raw(&record.bytes)
    } else {
        CompressedHints::from_huffman(&record.bytes)
    };
    hints.with_context(|| format!("{}: cannot unpack stream", record.name))
}
