//! Opcode and operand histograms over many streams.

use std::collections::BTreeMap;

use crate::{
    error::Result,
    huffman::{FusedKey, symbols},
    stream::NybbleStream,
};

/// Opcode counts, with operand counts per operand-carrying opcode
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub opcodes: BTreeMap<u8, usize>,
    pub operands: BTreeMap<u8, BTreeMap<u8, usize>>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stream(stream: &NybbleStream) -> Result<Self> {
        let mut stats = Self::new();
        stats.accumulate(stream)?;
        Ok(stats)
    }

    /// Count the body of `stream` into these histograms.
    pub fn accumulate(&mut self, stream: &NybbleStream) -> Result<()> {
        for key in symbols(stream)? {
            *self.opcodes.entry(key.opcode()).or_default() += 1;
            if let Some(operand) = key.operand() {
                *self.operands.entry(key.opcode()).or_default().entry(operand).or_default() += 1;
            }
        }
        Ok(())
    }

    pub fn merge(mut self, other: Self) -> Self {
        for (opcode, count) in other.opcodes {
            *self.opcodes.entry(opcode).or_default() += count;
        }
        for (opcode, operands) in other.operands {
            let into = self.operands.entry(opcode).or_default();
            for (operand, count) in operands {
                *into.entry(operand).or_default() += count;
            }
        }
        self
    }
}

/// Counts of Huffman symbols, opcodes fused with their operands
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FusedStatistics {
    pub counts: BTreeMap<FusedKey, usize>,
}

impl FusedStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stream(stream: &NybbleStream) -> Result<Self> {
        let mut stats = Self::new();
        stats.accumulate(stream)?;
        Ok(stats)
    }

    pub fn accumulate(&mut self, stream: &NybbleStream) -> Result<()> {
        for key in symbols(stream)? {
            *self.counts.entry(key).or_default() += 1;
        }
        Ok(())
    }

    pub fn merge(mut self, other: Self) -> Self {
        for (key, count) in other.counts {
            *self.counts.entry(key).or_default() += count;
        }
        self
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stream() -> NybbleStream {
        NybbleStream::from_nybbles(vec![3, 8, 0, 0, 0, 1, 2, 8, 8, 2, 3, 8, 14, 15]).unwrap()
    }

    #[test]
    fn split_counts() {
        let stats = Statistics::from_stream(&stream()).unwrap();
        assert_eq!(stats.opcodes, BTreeMap::from([(1, 1), (2, 1), (8, 3), (14, 1), (15, 1)]));
        assert_eq!(stats.operands[&1], BTreeMap::from([(2, 1)]));
        assert_eq!(stats.operands[&2], BTreeMap::from([(3, 1)]));
        assert!(!stats.operands.contains_key(&8));
    }

    #[test]
    fn fused_counts() {
        let stats = FusedStatistics::from_stream(&stream()).unwrap();
        assert_eq!(stats.counts[&FusedKey::Op(8)], 3);
        assert_eq!(stats.counts[&FusedKey::OpArg(2, 3)], 1);
        assert_eq!(stats.total(), 7);
    }

    #[test]
    fn merging_adds_counts() {
        let one = Statistics::from_stream(&stream()).unwrap();
        let both = one.clone().merge(one);
        assert_eq!(both.opcodes[&8], 6);
        assert_eq!(both.operands[&2][&3], 2);

        let fused = FusedStatistics::from_stream(&stream()).unwrap();
        let mut folded = FusedStatistics::new();
        folded.accumulate(&stream()).unwrap();
        assert_eq!(folded.clone().merge(fused).total(), 14);
        assert_eq!(folded.merge(FusedStatistics::new()).total(), 7);
    }
}
