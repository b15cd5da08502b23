use serde::{Deserialize, Serialize};

use crate::isa::{AluOp, Cond, Register};
use crate::memory::{Memory, MEM_WORDS};
use crate::word::Word;

/// Register clobbered by [`Assembler::store_immediate`]. Callers must treat
/// it as volatile across that call.
pub const SCRATCH: Register = Register::R1;

/// Far-jump opcode class in the primary opcode field.
const OP0_JMPF: u16 = 15;
/// Far-jump addressing submode.
const OP1_JMPF: u16 = 2;
/// `[imm16]` absolute addressing mode for load/store/ALU forms.
const OP1_ABS: u16 = 4;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{what} {value:#x} exceeds {max:#x}")]
    OutOfRange {
        what: &'static str,
        value: u32,
        max: u32,
    },
    #[error("Reserved ALU opcode {code:#x}")]
    ReservedOpcode { code: u16 },
    #[error("Emission past end of memory at word {addr:#x}")]
    BufferOverrun { addr: u32 },
    #[error("Patch emitted {got} words where placeholder had {expected}")]
    PatchSizeMismatch { expected: u32, got: u32 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AsmConfig {
    /// Reject out-of-range branch deltas and far-jump targets instead of
    /// reproducing the hardware bring-up tool's silent 6-bit truncation.
    /// Disable for bit-for-bit output parity with truncating encoders.
    pub strict: bool,
}

impl Default for AsmConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// A placeholder instruction's position and word count, captured by
/// [`Assembler::reserve`] so the later [`Assembler::patch`] can verify it
/// overwrites exactly the placeholder and nothing after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub pos: u32,
    pub len: u32,
}

/// One assembly session: the memory image plus the emission cursor.
///
/// The cursor marks the next free cell and is advanced by every emission
/// primitive. It only moves backwards inside [`Assembler::patch`], which
/// restores it before returning; `&mut self` keeps relocations serialized.
pub struct Assembler {
    pub mem: Memory,
    cursor: u32,
    cfg: AsmConfig,
}

impl Assembler {
    pub fn new(cfg: AsmConfig) -> Self {
        Self {
            mem: Memory::new(),
            cursor: 0,
            cfg,
        }
    }

    /// Position the cursor at the start of the code region.
    pub fn set_origin(&mut self, addr: u32) -> Result<(), EncodeError> {
        if addr as usize >= MEM_WORDS {
            return Err(EncodeError::OutOfRange {
                what: "origin",
                value: addr,
                max: MEM_WORDS as u32 - 1,
            });
        }
        self.cursor = addr;
        Ok(())
    }

    /// Current cursor, i.e. the word address the next emission lands on.
    /// Capture this before a block to use it as a branch target.
    pub fn here(&self) -> u32 {
        self.cursor
    }

    fn push(&mut self, w: Word) -> Result<(), EncodeError> {
        if self.cursor as usize >= MEM_WORDS {
            return Err(EncodeError::BufferOverrun { addr: self.cursor });
        }
        self.mem.set_word(self.cursor, w.raw());
        self.cursor += 1;
        Ok(())
    }

    /// `reg = value`: LOAD with the load-immediate selector, followed by the
    /// raw literal word. Two words.
    pub fn emit_set(&mut self, reg: Register, value: u16) -> Result<(), EncodeError> {
        let w = Word::default()
            .with_op_b(reg.index())
            .with_op_n(1)
            .with_op1(OP1_ABS)
            .with_op_a(reg.index())
            .with_op0(AluOp::Load.code());
        self.push(w)?;
        self.push(Word(value))
    }

    /// `reg = [address]`. Two words.
    pub fn emit_load(&mut self, reg: Register, address: u16) -> Result<(), EncodeError> {
        let w = Word::default()
            .with_op_b(reg.index())
            .with_op_n(2)
            .with_op1(OP1_ABS)
            .with_op_a(reg.index())
            .with_op0(AluOp::Load.code());
        self.push(w)?;
        self.push(Word(address))
    }

    /// `[address] = reg`. Two words.
    pub fn emit_store(&mut self, address: u16, reg: Register) -> Result<(), EncodeError> {
        let w = Word::default()
            .with_op_b(reg.index())
            .with_op_n(3)
            .with_op1(OP1_ABS)
            .with_op_a(reg.index())
            .with_op0(AluOp::Store.code());
        self.push(w)?;
        self.push(Word(address))
    }

    /// `[address] = value` via [`SCRATCH`]. Four words; clobbers the scratch
    /// register.
    pub fn store_immediate(&mut self, address: u16, value: u16) -> Result<(), EncodeError> {
        self.emit_set(SCRATCH, value)?;
        self.emit_store(address, SCRATCH)
    }

    /// Register-register ALU operation. One word, no literal.
    pub fn emit_alu(&mut self, op: AluOp, dst: Register, src: Register) -> Result<(), EncodeError> {
        let w = Word::default()
            .with_op_b(src.index())
            .with_op_n(0)
            .with_op1(OP1_ABS)
            .with_op_a(dst.index())
            .with_op0(op.code());
        self.push(w)
    }

    /// PC-relative conditional branch. One word; the 6-bit magnitude limits
    /// the reach to 63 words either side of the following instruction.
    pub fn emit_branch(&mut self, cond: Cond, target: u32) -> Result<(), EncodeError> {
        let pc = self.cursor + 1;
        let delta = i64::from(target) - i64::from(pc);
        let magnitude = delta.unsigned_abs();
        if self.cfg.strict && magnitude > 0x3F {
            return Err(EncodeError::OutOfRange {
                what: "branch delta",
                value: magnitude as u32,
                max: 0x3F,
            });
        }
        let backward = target < pc;
        let w = Word::default()
            .with_opimm(magnitude as u16)
            .with_op1(backward as u16)
            .with_op_a(Register::Pc.index())
            .with_op0(cond.code());
        self.push(w)
    }

    /// Unconditional far jump: address high bits in the immediate field,
    /// low 16 bits in a trailing literal. Two words.
    pub fn emit_goto(&mut self, target: u32) -> Result<(), EncodeError> {
        if self.cfg.strict && target as usize >= MEM_WORDS {
            return Err(EncodeError::OutOfRange {
                what: "jump target",
                value: target,
                max: MEM_WORDS as u32 - 1,
            });
        }
        let w = Word::default()
            .with_opimm((target >> 16) as u16)
            .with_op1(OP1_JMPF)
            .with_op_a(Register::Pc.index())
            .with_op0(OP0_JMPF);
        self.push(w)?;
        self.push(Word(target as u16))
    }

    /// Emit a placeholder instruction whose target is not known yet and
    /// remember its position and width for a later [`Assembler::patch`].
    pub fn reserve<F>(&mut self, emit: F) -> Result<Patch, EncodeError>
    where
        F: FnOnce(&mut Self) -> Result<(), EncodeError>,
    {
        let pos = self.cursor;
        emit(self)?;
        Ok(Patch {
            pos,
            len: self.cursor - pos,
        })
    }

    /// Overwrite a placeholder in place now that its real target is known.
    ///
    /// The closure must re-invoke the same primitive as the placeholder;
    /// emitting a different word count would corrupt the instructions that
    /// follow, so that is checked before the cursor is restored.
    pub fn patch<F>(&mut self, at: Patch, emit: F) -> Result<(), EncodeError>
    where
        F: FnOnce(&mut Self) -> Result<(), EncodeError>,
    {
        let saved = self.cursor;
        self.cursor = at.pos;
        let result = emit(self);
        let emitted = self.cursor - at.pos;
        self.cursor = saved;
        result?;
        if emitted != at.len {
            return Err(EncodeError::PatchSizeMismatch {
                expected: at.len,
                got: emitted,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_branch_wraps_into_six_bits() {
        let mut asm = Assembler::new(AsmConfig { strict: false });
        asm.set_origin(0x100).unwrap();
        // delta = 0x41; a strict session would refuse this
        asm.emit_branch(Cond::Always, 0x100 + 1 + 0x41).unwrap();
        assert_eq!(Word(asm.mem.word(0x100)).opimm(), 0x01);
    }

    #[test]
    fn strict_branch_rejects_delta_over_63() {
        let mut asm = Assembler::new(AsmConfig::default());
        asm.set_origin(0x100).unwrap();
        let err = asm.emit_branch(Cond::Always, 0x100 + 1 + 64).unwrap_err();
        assert!(matches!(err, EncodeError::OutOfRange { .. }));
    }

    #[test]
    fn emission_past_end_of_memory_is_an_error() {
        let mut asm = Assembler::new(AsmConfig::default());
        asm.set_origin(MEM_WORDS as u32 - 1).unwrap();
        asm.emit_alu(AluOp::Add, Register::R1, Register::R2).unwrap();
        let err = asm
            .emit_alu(AluOp::Add, Register::R1, Register::R2)
            .unwrap_err();
        assert_eq!(
            err,
            EncodeError::BufferOverrun {
                addr: MEM_WORDS as u32
            }
        );
    }
}
