use serde::{Deserialize, Serialize};

use crate::asm::EncodeError;

/// Architectural registers, used directly as the 3-bit operand fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Register {
    Sp = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    Bp = 5,
    Sr = 6,
    Pc = 7,
}

impl Register {
    pub fn index(self) -> u16 {
        self as u16
    }
}

/// ALU operation codes (primary opcode field, register addressing context).
///
/// 5, 7 and 14 are reserved in this namespace. 14 doubles as the "always"
/// branch condition and 15 as the far-jump opcode class, but only under
/// branch addressing modes; the shared 4-bit field means the namespaces are
/// disjoint by context alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AluOp {
    Add = 0,
    Adc = 1,
    Sub = 2,
    Sbc = 3,
    Cmp = 4,
    Neg = 6,
    Xor = 8,
    Load = 9,
    Or = 10,
    And = 11,
    Test = 12,
    Store = 13,
}

impl AluOp {
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Map a raw 4-bit code back to an operation, rejecting reserved codes.
    pub fn from_code(code: u16) -> Result<Self, EncodeError> {
        Ok(match code {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::Cmp,
            6 => AluOp::Neg,
            8 => AluOp::Xor,
            9 => AluOp::Load,
            10 => AluOp::Or,
            11 => AluOp::And,
            12 => AluOp::Test,
            13 => AluOp::Store,
            _ => return Err(EncodeError::ReservedOpcode { code }),
        })
    }
}

/// Conditional-branch condition codes.
///
/// Branch instructions are disambiguated from ALU instructions by the
/// addressing-mode field and `opA = PC`, not by the code value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cond {
    NotEqual = 4,
    Equal = 5,
    Always = 14,
}

impl Cond {
    pub fn code(self) -> u16 {
        self as u16
    }
}

pub const ALL_REGISTERS: [Register; 8] = [
    Register::Sp,
    Register::R1,
    Register::R2,
    Register::R3,
    Register::R4,
    Register::Bp,
    Register::Sr,
    Register::Pc,
];

pub const ALL_ALU_OPS: [AluOp; 12] = [
    AluOp::Add,
    AluOp::Adc,
    AluOp::Sub,
    AluOp::Sbc,
    AluOp::Cmp,
    AluOp::Neg,
    AluOp::Xor,
    AluOp::Load,
    AluOp::Or,
    AluOp::And,
    AluOp::Test,
    AluOp::Store,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alu_codes_round_trip() {
        for op in ALL_ALU_OPS {
            assert_eq!(AluOp::from_code(op.code()).unwrap(), op);
        }
    }

    #[test]
    fn reserved_alu_codes_are_rejected() {
        for code in [5u16, 7, 14, 15] {
            assert!(matches!(
                AluOp::from_code(code),
                Err(EncodeError::ReservedOpcode { code: c }) if c == code
            ));
        }
    }
}
