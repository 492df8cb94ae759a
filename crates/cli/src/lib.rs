//! SparkHints command-line library.

pub mod cli;
pub mod commands;
pub mod io;
pub mod parallel;

pub use io::{GlyphFile, GlyphRecord, decode_hex, encode_hex, parse_records, write_records};
pub use parallel::{BatchResult, process_parallel_iter};
