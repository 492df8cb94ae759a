//! Compressed hints for one glyph.

use crate::{
    decode::decode,
    disasm::disassemble,
    encode::encode_with,
    error::Result,
    options::Options,
    pack::{pack_huffman, unpack_huffman},
    spark::SparkHints,
    stats::{FusedStatistics, Statistics},
    stream::NybbleStream,
    types::PhaseMap,
};

/// A glyph's compressed delta hints and its gray flag
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedHints {
    stream: NybbleStream,
    gray: bool,
}

impl CompressedHints {
    /// Compress the hints before RTGAH (if any) and after it.
    pub fn new(pre: Option<&PhaseMap>, post: &PhaseMap, options: &Options) -> Result<Self> {
        let stream = encode_with(pre, post, options)?;
        Ok(Self { stream, gray: options.gray })
    }

    /// Compress a parsed Spark program; a gray program stays gray.
    pub fn from_spark(hints: &SparkHints, options: &Options) -> Result<Self> {
        let (pre, post) = hints.analyze()?;
        let options = options.clone().gray(options.gray || hints.gray);
        Self::new(pre.as_ref(), &post, &options)
    }

    /// Read back a fused-Huffman packed stream.
    pub fn from_huffman(bytes: &[u8]) -> Result<Self> {
        let (gray, stream) = unpack_huffman(bytes)?;
        Ok(Self { stream, gray })
    }

    /// Read back a raw nybble-packed stream.
    #[cfg(feature = "raw-format")]
    pub fn from_raw(bytes: &[u8]) -> Result<Self> {
        let (gray, stream) = crate::pack::unpack_raw(bytes)?;
        Ok(Self { stream, gray })
    }

    pub fn from_stream(stream: NybbleStream, gray: bool) -> Self {
        Self { stream, gray }
    }

    pub fn stream(&self) -> &NybbleStream {
        &self.stream
    }

    pub fn is_gray(&self) -> bool {
        self.gray
    }

    pub fn to_huffman(&self) -> Result<Vec<u8>> {
        pack_huffman(&self.stream, self.gray)
    }

    #[cfg(feature = "raw-format")]
    pub fn to_raw(&self) -> Result<Vec<u8>> {
        crate::pack::pack_raw(&self.stream, self.gray)
    }

    /// Replay the stream, recovering the phase maps it was built from.
    pub fn run(&self) -> Result<(Option<PhaseMap>, PhaseMap)> {
        decode(&self.stream)
    }

    pub fn statistics(&self) -> Result<Statistics> {
        Statistics::from_stream(&self.stream)
    }

    pub fn statistics_fused(&self) -> Result<FusedStatistics> {
        FusedStatistics::from_stream(&self.stream)
    }

    pub fn disassemble(&self) -> Result<String> {
        disassemble(&self.stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Axis, DeltaKind};

    #[test]
    fn gray_follows_options_and_program() {
        let mut post = PhaseMap::new();
        post.insert(Axis::X, 12, 0.5, DeltaKind::DeltaS, Some(2)).unwrap();
        let mono = CompressedHints::new(None, &post, &Options::default()).unwrap();
        assert!(!mono.is_gray());
        assert_eq!(mono.to_huffman().unwrap()[1], 0xF6);

        let program =
            SparkHints::parse(&[0x7F, 0xF9, 0x00, 0x09, 0xA2, 0x00, 0x0E, 0x01, 0x5A]).unwrap();
        let gray = CompressedHints::from_spark(&program, &Options::default()).unwrap();
        assert!(gray.is_gray());
    }

    #[test]
    fn huffman_round_trip() {
        let mut post = PhaseMap::new();
        post.insert(Axis::Y, 20, -0.25, DeltaKind::DeltaP, Some(40)).unwrap();
        post.insert(Axis::Y, 21, -0.25, DeltaKind::DeltaP, Some(40)).unwrap();
        let hints = CompressedHints::new(None, &post, &Options::new().gray(true)).unwrap();
        let back = CompressedHints::from_huffman(&hints.to_huffman().unwrap()).unwrap();
        assert_eq!(back, hints);
        assert_eq!(back.run().unwrap(), (None, post));
    }

    #[test]
    fn packed_stream_decodes_to_its_input() {
        let mut post = PhaseMap::new();
        post.insert(Axis::X, 14, 0.25, DeltaKind::DeltaP, Some(9)).unwrap();
        post.insert(Axis::X, 15, 0.75, DeltaKind::DeltaP, Some(12)).unwrap();
        let hints = CompressedHints::new(None, &post, &Options::new().verify(true)).unwrap();
        let back = CompressedHints::from_huffman(&hints.to_huffman().unwrap()).unwrap();
        let (pre, decoded) = back.run().unwrap();
        assert_eq!(pre, None);
        assert_eq!(decoded, post);
    }
}
