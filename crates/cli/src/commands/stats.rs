use std::{fmt::Write, path::Path};

use anyhow::{Context, Result};
use sparkhints_codec::{FusedStatistics, Statistics};

use super::unpack;
use crate::{io::GlyphFile, parallel::process_parallel_iter};

/// Opcode counts, each followed by its indented operand counts.
pub fn render_split(stats: &Statistics) -> String {
    let mut out = String::new();
    for (opcode, count) in &stats.opcodes {
        let _ = writeln!(out, "opcode {opcode:X}: {count}");
        for (operand, count) in stats.operands.get(opcode).into_iter().flatten() {
            let _ = writeln!(out, "  operand {operand:X}: {count}");
        }
    }
    out
}

/// Symbol counts in key order, then the total.
pub fn render_fused(stats: &FusedStatistics) -> String {
    let mut out = String::new();
    for (key, count) in &stats.counts {
        let _ = writeln!(out, "{key}: {count}");
    }
    let _ = writeln!(out, "total: {}", stats.total());
    out
}

pub fn stats(input: &Path, fused: bool, raw: bool) -> Result<()> {
    let records = GlyphFile::new(input).read()?;
    let report = if fused {
        let (batch, counts) = process_parallel_iter("stats", &records, |record| {
            unpack(record, raw)?
                .statistics_fused()
                .with_context(|| format!("{}: malformed stream", record.name))
        });
        batch.ok_or_bail("stats")?;
        render_fused(&counts.into_iter().fold(FusedStatistics::new(), FusedStatistics::merge))
    } else {
        let (batch, counts) = process_parallel_iter("stats", &records, |record| {
            unpack(record, raw)?
                .statistics()
                .with_context(|| format!("{}: malformed stream", record.name))
        });
        batch.ok_or_bail("stats")?;
        render_split(&counts.into_iter().fold(Statistics::new(), Statistics::merge))
    };
    print!("{report}");
    Ok(())
}
