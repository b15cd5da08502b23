pub mod asm;
pub mod isa;
pub mod memory;
pub mod video;
pub mod word;

pub use asm::{AsmConfig, Assembler, EncodeError, Patch, SCRATCH};
pub use isa::{AluOp, Cond, Register};
pub use memory::{Memory, IMAGE_BYTES, MEM_WORDS};
pub use word::Word;
