//! Text listings of nybble streams.

use crate::{error::Result, opcode::Instruction, stream::NybbleStream};

/// One listing line: sequence number, the raw nybbles, then what they mean.
pub fn instruction_line(seq: usize, inst: Instruction) -> String {
    let opcode = inst.opcode();
    match inst.operand() {
        Some(operand) => format!("{seq:03}  {opcode:X} {operand:X}   {inst}"),
        None => format!("{seq:03}  {opcode:X}     {inst}"),
    }
}

/// The full listing: prolog values, every instruction, and the packed size.
pub fn disassemble(stream: &NybbleStream) -> Result<String> {
    let prolog = stream.prolog()?;
    let mut out = format!("Granularity is {}\n", prolog.granularity);
    out.push_str(&format!("Base shift is {:?}\n", prolog.base_shift()));
    out.push_str(&format!("Base PPEM is {}\n", prolog.base_ppem));
    out.push_str(&format!("Base point is {}\n", prolog.base_point));
    for (seq, item) in stream.instructions()?.enumerate() {
        let (_, inst) = item?;
        out.push_str(&instruction_line(seq, inst));
        out.push('\n');
    }
    out.push_str(&format!("Total bytes = {}\n", stream.packed_len()));
    Ok(out)
}
