//! Glyph hint file I/O.
//!
//! Files hold one glyph per line, `<glyph-name>: <hex bytes>`. Hex digits may
//! be separated by whitespace. Blank lines and lines starting with `#` are
//! skipped.

use std::{
    fs::{create_dir_all, read_to_string, write},
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result, bail};

/// One glyph's name and byte string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRecord {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl GlyphRecord {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    pub fn to_line(&self) -> String {
        format!("{}: {}", self.name, encode_hex(&self.bytes))
    }
}

/// A glyph hint file handle.
#[derive(Debug, Clone)]
pub struct GlyphFile {
    path: PathBuf,
}

impl GlyphFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read(&self) -> Result<Vec<GlyphRecord>> {
        let text = read_to_string(&self.path)
            .with_context(|| format!("Failed to read glyph file: {}", self.path.display()))?;
        parse_records(&text)
            .with_context(|| format!("Malformed glyph file: {}", self.path.display()))
    }

    pub fn write(&self, records: &[GlyphRecord]) -> Result<()> {
        self.ensure_parent_dir()?;
        let mut text = Vec::new();
        write_records(&mut text, records)?;
        write(&self.path, text)
            .with_context(|| format!("Failed to write glyph file: {}", self.path.display()))
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        Ok(())
    }
}

/// Write one `<glyph-name>: <hex>` line per record.
pub fn write_records(out: &mut impl Write, records: &[GlyphRecord]) -> io::Result<()> {
    for record in records {
        writeln!(out, "{}", record.to_line())?;
    }
    Ok(())
}

/// Parse every glyph line of `text`.
pub fn parse_records(text: &str) -> Result<Vec<GlyphRecord>> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record = parse_line(line).with_context(|| format!("line {}", index + 1))?;
        records.push(record);
    }
    Ok(records)
}

fn parse_line(line: &str) -> Result<GlyphRecord> {
    let Some((name, hex)) = line.split_once(':') else {
        bail!("expected `<glyph-name>: <hex>`, got {line:?}");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("missing glyph name");
    }
    let bytes = decode_hex(hex).with_context(|| format!("glyph {name}"))?;
    Ok(GlyphRecord::new(name, bytes))
}

/// Decode hex digits, ignoring whitespace between them.
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    let digits = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            c.to_digit(16)
                .map(|d| d as u8)
                .with_context(|| format!("invalid hex digit {c:?}"))
        })
        .collect::<Result<Vec<u8>>>()?;
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits ({})", digits.len());
    }
    Ok(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}

/// Upper-case hex, bytes separated by single spaces.
pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join(" ")
}
