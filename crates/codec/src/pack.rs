//! Byte framing of nybble streams.
//!
//! Both formats start with `7F`, a marker byte (`F6` monochrome, `F7` gray)
//! and a big-endian length counting every byte, header included.

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use log::debug;
use read_fonts::FontData;

use crate::{
    error::{Error, Result},
    huffman::{Code, FusedKey, MAX_CODE_LEN, code_for, lookup, symbols},
    opcode::OP_END,
    stream::{LONG_PPEM, NybbleStream},
};

pub const HEADER_BYTE: u8 = 0x7F;
pub const MONO_MARKER: u8 = 0xF6;
pub const GRAY_MARKER: u8 = 0xF7;
pub const HEADER_LEN: usize = 4;

pub const fn marker(gray: bool) -> u8 {
    if gray { GRAY_MARKER } else { MONO_MARKER }
}

fn frame(body: Vec<u8>, gray: bool) -> Result<Vec<u8>> {
    let total = body.len() + HEADER_LEN;
    let len = u16::try_from(total).map_err(|_| Error::StreamTooLong(total))?;
    let mut out = Vec::with_capacity(total);
    out.extend([HEADER_BYTE, marker(gray)]);
    out.extend(len.to_be_bytes());
    out.extend(body);
    Ok(out)
}

/// Validate the header of a packed stream, returning the gray flag.
fn read_header(bytes: &[u8]) -> Result<bool> {
    let data = FontData::new(bytes);
    let header = data.read_at::<u8>(0).map_err(|_| Error::BadHeader)?;
    let gray = match data.read_at::<u8>(1).map_err(|_| Error::BadHeader)? {
        MONO_MARKER => false,
        GRAY_MARKER => true,
        _ => return Err(Error::BadHeader),
    };
    let len = data.read_at::<u16>(2).map_err(|_| Error::BadHeader)?;
    if header != HEADER_BYTE || usize::from(len) != bytes.len() {
        return Err(Error::BadHeader);
    }
    Ok(gray)
}

fn code(key: FusedKey) -> Result<Code> {
    code_for(key).ok_or(Error::MissingHuffmanCode { opcode: key.opcode(), operand: key.operand() })
}

/// Pack `stream` with the fused Huffman codes.
///
/// The prolog is written as plain 4-bit groups and the body is zero-padded
/// to a byte boundary.
pub fn pack_huffman(stream: &NybbleStream, gray: bool) -> Result<Vec<u8>> {
    let prolog = stream.prolog()?;
    let keys = symbols(stream)?;
    let mut body = Vec::new();
    {
        let mut writer = BitWriter::endian(&mut body, BigEndian);
        for &nybble in &stream.as_slice()[..prolog.len] {
            writer.write(4, nybble)?;
        }
        for key in keys {
            let code = code(key)?;
            writer.write(u32::from(code.len), code.bits)?;
        }
        writer.byte_align()?;
    }
    debug!("packed {} nybbles into {} bytes", stream.len(), body.len() + HEADER_LEN);
    frame(body, gray)
}

/// Bits the Huffman body takes before padding.
pub fn huffman_body_bits(stream: &NybbleStream) -> Result<usize> {
    let prolog = stream.prolog()?;
    symbols(stream)?
        .into_iter()
        .try_fold(4 * prolog.len, |bits, key| Ok(bits + usize::from(code(key)?.len)))
}

/// Unpack a fused-Huffman stream, returning its gray flag and nybbles.
pub fn unpack_huffman(bytes: &[u8]) -> Result<(bool, NybbleStream)> {
    let gray = read_header(bytes)?;
    let mut reader = BitReader::endian(&bytes[HEADER_LEN..], BigEndian);
    let mut nybbles = Vec::new();
    let mut read_nybble = |nybbles: &mut Vec<u8>| -> Result<u8> {
        let nybble = reader.read::<u8>(4).map_err(|_| Error::TruncatedStream)?;
        nybbles.push(nybble);
        Ok(nybble)
    };
    read_nybble(&mut nybbles)?;
    read_nybble(&mut nybbles)?;
    let prolog_rest = if read_nybble(&mut nybbles)? == LONG_PPEM { 4 } else { 2 };
    for _ in 0..prolog_rest {
        read_nybble(&mut nybbles)?;
    }

    loop {
        let key = read_symbol(&mut reader)?;
        nybbles.extend(key.nybbles());
        if key == FusedKey::Op(OP_END) {
            break;
        }
    }
    Ok((gray, NybbleStream::from_nybbles(nybbles)?))
}

fn read_symbol<R: BitRead>(reader: &mut R) -> Result<FusedKey> {
    let mut bits = 0u16;
    for len in 1..=MAX_CODE_LEN {
        let bit = reader.read_bit().map_err(|_| Error::TruncatedStream)?;
        bits = (bits << 1) | u16::from(bit);
        if let Some(key) = lookup(bits, len) {
            return Ok(key);
        }
    }
    Err(Error::InvalidCode)
}

/// Pack `stream` two nybbles per byte, high nybble first.
#[cfg(feature = "raw-format")]
pub fn pack_raw(stream: &NybbleStream, gray: bool) -> Result<Vec<u8>> {
    let body = stream
        .as_slice()
        .chunks(2)
        .map(|pair| pair[0] << 4 | pair.get(1).copied().unwrap_or(0))
        .collect();
    frame(body, gray)
}

/// Unpack a raw stream; the padding nybble after the end opcode is dropped.
#[cfg(feature = "raw-format")]
pub fn unpack_raw(bytes: &[u8]) -> Result<(bool, NybbleStream)> {
    let gray = read_header(bytes)?;
    let mut nybbles: Vec<u8> =
        bytes[HEADER_LEN..].iter().flat_map(|&b| [b >> 4, b & 0x0F]).collect();
    let stream = NybbleStream::from_nybbles(nybbles.clone())?;
    let mut end = stream.prolog()?.len;
    for key in symbols(&stream)? {
        end += key.nybbles().count();
    }
    nybbles.truncate(end);
    Ok((gray, NybbleStream::from_nybbles(nybbles)?))
}
