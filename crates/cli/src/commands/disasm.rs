use std::path::Path;

use anyhow::{Context, Result};

use super::unpack;
use crate::io::{GlyphFile, GlyphRecord};

/// The listing of one glyph's packed stream, headed by its name.
pub fn disasm_glyph(record: &GlyphRecord, raw: bool) -> Result<String> {
    let hints = unpack(record, raw)?;
    let listing = hints
        .disassemble()
        .with_context(|| format!("{}: malformed stream", record.name))?;
    Ok(format!("== {} ==\n{listing}", record.name))
}

pub fn disasm(input: &Path, raw: bool) -> Result<()> {
    for record in GlyphFile::new(input).read()? {
        print!("{}", disasm_glyph(&record, raw)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::decode_hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_stream_listing() {
        let record = GlyphRecord::new("space", decode_hex("7f f6 00 08 30 00 09 d4").unwrap());
        assert_eq!(
            disasm_glyph(&record, false).unwrap(),
            "== space ==\n\
             Granularity is 3\n\
             Base shift is -1.0\n\
             Base PPEM is 9\n\
             Base point is 0\n\
             000  E     RTGAH\n\
             001  F     End of hints\n\
             Total bytes = 4\n"
        );
        let raw = GlyphRecord::new("space", decode_hex("7f f6 00 08 30 00 0e f0").unwrap());
        assert_eq!(disasm_glyph(&raw, true).unwrap(), disasm_glyph(&record, false).unwrap());
    }
}
