//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{analyze, compress, disasm, stats};

#[derive(Parser)]
#[command(name = "sparkhints")]
#[command(about = "Compress and inspect Spark delta hints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress Spark hint programs into packed SparkHints streams
    Compress {
        /// Lines of `<glyph-name>: <Spark program hex>`
        input: PathBuf,
        /// Write `<glyph-name>: <packed hex>` lines here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pack two nybbles per byte instead of the fused Huffman code
        #[arg(long)]
        raw: bool,
        /// Decode every stream and fail the glyph unless it reproduces its hints
        #[arg(long)]
        verify: bool,
    },
    /// Print the instruction listing of packed streams
    Disasm {
        /// Lines of `<glyph-name>: <packed hex>`
        input: PathBuf,
        /// Input streams are raw-packed
        #[arg(long)]
        raw: bool,
    },
    /// Print parsed Spark instructions and the phase maps they produce
    Analyze {
        /// Lines of `<glyph-name>: <Spark program hex>`
        input: PathBuf,
    },
    /// Print opcode histograms folded over packed streams
    Stats {
        /// Lines of `<glyph-name>: <packed hex>`
        input: PathBuf,
        /// Count opcodes fused with their operands, as the Huffman table does
        #[arg(long)]
        fused: bool,
        /// Input streams are raw-packed
        #[arg(long)]
        raw: bool,
    },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Compress { input, output, raw, verify } => {
                compress(&input, output.as_deref(), raw, verify)?;
            }
            Commands::Disasm { input, raw } => disasm(&input, raw)?,
            Commands::Analyze { input } => analyze(&input)?,
            Commands::Stats { input, fused, raw } => stats(&input, fused, raw)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compress_flags() {
        let cli =
            Cli::parse_from(["sparkhints", "compress", "in.txt", "-o", "out.txt", "--verify"]);
        let Commands::Compress { input, output, raw, verify } = cli.command else {
            panic!("expected compress");
        };
        assert_eq!(input, PathBuf::from("in.txt"));
        assert_eq!(output, Some(PathBuf::from("out.txt")));
        assert!(!raw);
        assert!(verify);
    }
}
