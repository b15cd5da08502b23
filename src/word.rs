use serde::{Deserialize, Serialize};

/// One 16-bit instruction word.
///
/// The hardware reinterprets the same 16 bits through three overlapping
/// field groupings, selected by opcode class:
///
/// ```text
/// register form:   op0[15:12] opA[11:9] op1[8:6] opN[5:3] opB[2:0]
/// immediate form:  op0[15:12] opA[11:9] op1[8:6] opimm[5:0]
/// ```
///
/// `opimm` shares storage with `opN`/`opB`; each mutator masks and shifts
/// only its own bits and leaves the rest of the word untouched, so a caller
/// authors one consistent view per instruction by chaining `with_*` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Word(pub u16);

const OP_B_SHIFT: u16 = 0;
const OP_B_MASK: u16 = 0x7;
const OP_N_SHIFT: u16 = 3;
const OP_N_MASK: u16 = 0x7;
const OP1_SHIFT: u16 = 6;
const OP1_MASK: u16 = 0x7;
const OP_A_SHIFT: u16 = 9;
const OP_A_MASK: u16 = 0x7;
const OP0_SHIFT: u16 = 12;
const OP0_MASK: u16 = 0xF;
const OPIMM_SHIFT: u16 = 0;
const OPIMM_MASK: u16 = 0x3F;

#[inline]
fn set_field(raw: u16, shift: u16, mask: u16, val: u16) -> u16 {
    (raw & !(mask << shift)) | ((val & mask) << shift)
}

#[inline]
fn get_field(raw: u16, shift: u16, mask: u16) -> u16 {
    (raw >> shift) & mask
}

impl Word {
    pub fn raw(self) -> u16 {
        self.0
    }

    // Register-form view.

    /// Second/source register operand, bits [2:0].
    pub fn with_op_b(self, v: u16) -> Self {
        Word(set_field(self.0, OP_B_SHIFT, OP_B_MASK, v))
    }
    /// Operation-class selector, bits [5:3].
    pub fn with_op_n(self, v: u16) -> Self {
        Word(set_field(self.0, OP_N_SHIFT, OP_N_MASK, v))
    }
    /// Addressing mode, bits [8:6].
    pub fn with_op1(self, v: u16) -> Self {
        Word(set_field(self.0, OP1_SHIFT, OP1_MASK, v))
    }
    /// First/destination register operand, bits [11:9].
    pub fn with_op_a(self, v: u16) -> Self {
        Word(set_field(self.0, OP_A_SHIFT, OP_A_MASK, v))
    }
    /// Primary opcode or branch condition, bits [15:12].
    pub fn with_op0(self, v: u16) -> Self {
        Word(set_field(self.0, OP0_SHIFT, OP0_MASK, v))
    }

    // Immediate-form view; shares storage with opN/opB.

    /// 6-bit unsigned immediate/offset magnitude, bits [5:0].
    pub fn with_opimm(self, v: u16) -> Self {
        Word(set_field(self.0, OPIMM_SHIFT, OPIMM_MASK, v))
    }

    pub fn op_b(self) -> u16 {
        get_field(self.0, OP_B_SHIFT, OP_B_MASK)
    }
    pub fn op_n(self) -> u16 {
        get_field(self.0, OP_N_SHIFT, OP_N_MASK)
    }
    pub fn op1(self) -> u16 {
        get_field(self.0, OP1_SHIFT, OP1_MASK)
    }
    pub fn op_a(self) -> u16 {
        get_field(self.0, OP_A_SHIFT, OP_A_MASK)
    }
    pub fn op0(self) -> u16 {
        get_field(self.0, OP0_SHIFT, OP0_MASK)
    }
    pub fn opimm(self) -> u16 {
        get_field(self.0, OPIMM_SHIFT, OPIMM_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_cover_all_sixteen_bits() {
        let w = Word::default()
            .with_op_b(0x7)
            .with_op_n(0x7)
            .with_op1(0x7)
            .with_op_a(0x7)
            .with_op0(0xF);
        assert_eq!(w.raw(), 0xFFFF);
    }

    #[test]
    fn mutators_touch_only_their_own_bits() {
        let w = Word(0xFFFF).with_op_n(0);
        assert_eq!(w.raw(), 0xFFC7);
        let w = Word(0xFFFF).with_opimm(0);
        assert_eq!(w.raw(), 0xFFC0);
        let w = Word(0xFFFF).with_op0(0);
        assert_eq!(w.raw(), 0x0FFF);
    }

    #[test]
    fn opimm_overlays_op_b_and_op_n() {
        let w = Word::default().with_opimm(0x3F);
        assert_eq!(w.op_b(), 0x7);
        assert_eq!(w.op_n(), 0x7);
        assert_eq!(w.op1(), 0);
    }

    #[test]
    fn values_are_masked_to_field_width() {
        let w = Word::default().with_op_a(0xFF);
        assert_eq!(w.op_a(), 0x7);
        assert_eq!(w.raw(), 0x7 << 9);
    }
}
