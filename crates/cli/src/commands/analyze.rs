use std::{fmt::Write, path::Path};

use anyhow::{Context, Result};
use sparkhints_codec::{PhaseMap, SparkHints};

use crate::io::{GlyphFile, GlyphRecord};

/// One line per (axis, ppem, shift) coordinate, each indented by two spaces.
pub fn render_phase_map(map: &PhaseMap) -> String {
    if map.is_empty() {
        return "  (empty)\n".to_string();
    }
    let mut out = String::new();
    for (axis, ppems) in map.axes() {
        for (ppem, shifts) in ppems {
            for (shift, hints) in shifts {
                let hints: Vec<String> = hints
                    .iter()
                    .map(|hint| match hint.point {
                        Some(point) => format!("{} {point}", hint.kind),
                        None => hint.kind.to_string(),
                    })
                    .collect();
                let _ = writeln!(out, "  {axis} ppem {ppem} shift {shift}: {}", hints.join(", "));
            }
        }
    }
    out
}

/// The parsed program followed by its pre-RTGAH and post-RTGAH phase maps.
pub fn analyze_glyph(record: &GlyphRecord) -> Result<String> {
    let name = &record.name;
    let program = SparkHints::parse(&record.bytes)
        .with_context(|| format!("{name}: not a Spark hint program"))?;
    let (pre, post) = program
        .analyze()
        .with_context(|| format!("{name}: cannot analyze hints"))?;

    let mut out = format!("== {name} ==\n{program}");
    match pre {
        Some(pre) => {
            out.push_str("pre:\n");
            out.push_str(&render_phase_map(&pre));
        }
        None => out.push_str("pre: none\n"),
    }
    out.push_str("post:\n");
    out.push_str(&render_phase_map(&post));
    Ok(out)
}

pub fn analyze(input: &Path) -> Result<()> {
    for record in GlyphFile::new(input).read()? {
        print!("{}", analyze_glyph(&record)?);
    }
    Ok(())
}
