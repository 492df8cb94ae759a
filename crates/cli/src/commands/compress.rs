use std::{
    io::{Write, stdout},
    path::Path,
};

use anyhow::{Context, Result};
use log::debug;
use sparkhints_codec::{CompressedHints, Options, SparkHints};

use crate::{
    io::{GlyphFile, GlyphRecord, write_records},
    parallel::{BatchResult, process_parallel_iter},
};

/// Compress one glyph's Spark program into its packed stream.
pub fn compress_glyph(record: &GlyphRecord, options: &Options, raw: bool) -> Result<GlyphRecord> {
    let name = &record.name;
    let program = SparkHints::parse(&record.bytes)
        .with_context(|| format!("{name}: not a Spark hint program"))?;
    let hints = CompressedHints::from_spark(&program, options)
        .with_context(|| format!("{name}: cannot compress hints"))?;
    let packed = (if raw { hints.to_raw() } else { hints.to_huffman() })
        .with_context(|| format!("{name}: cannot pack stream"))?;
    debug!("{name}: {} -> {} bytes", record.bytes.len(), packed.len());
    Ok(GlyphRecord::new(name.clone(), packed))
}

fn compress_records(
    input: &Path,
    raw: bool,
    verify: bool,
) -> Result<(BatchResult, Vec<GlyphRecord>)> {
    let records = GlyphFile::new(input).read()?;
    let options = Options::new().verify(verify);
    Ok(process_parallel_iter("compress", &records, |record| {
        compress_glyph(record, &options, raw)
    }))
}

/// Compress every glyph of `input`, writing the packed lines to `out`.
pub fn compress_to(
    input: &Path,
    out: &mut impl Write,
    raw: bool,
    verify: bool,
) -> Result<BatchResult> {
    let (batch, packed) = compress_records(input, raw, verify)?;
    write_records(out, &packed).context("Failed to write packed glyphs")?;
    Ok(batch)
}

pub fn compress(
    input: &Path,
    output: Option<&Path>,
    raw: bool,
    verify: bool,
) -> Result<BatchResult> {
    match output {
        Some(path) => {
            let (batch, packed) = compress_records(input, raw, verify)?;
            GlyphFile::new(path).write(&packed)?;
            Ok(batch)
        }
        None => compress_to(input, &mut stdout().lock(), raw, verify),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::decode_hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn rtgah_only_glyph() {
        let record = GlyphRecord::new("space", vec![0xB0, 0x0B]);
        let packed = compress_glyph(&record, &Options::default(), false).unwrap();
        assert_eq!(
            packed,
            GlyphRecord::new("space", decode_hex("7f f6 00 08 30 00 09 d4").unwrap())
        );

        let raw = compress_glyph(&record, &Options::default(), true).unwrap();
        assert_eq!(raw.bytes, decode_hex("7f f6 00 08 30 00 0e f0").unwrap());
    }

    #[test]
    fn bad_program_names_the_glyph() {
        let record = GlyphRecord::new("broken", vec![0x12, 0x34]);
        let err = compress_glyph(&record, &Options::default(), false).unwrap_err();
        assert!(format!("{err:#}").starts_with("broken: "));
    }
}
