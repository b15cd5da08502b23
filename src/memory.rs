use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Number of 16-bit cells in the flat address space.
pub const MEM_WORDS: usize = 0x20000;

/// Size in bytes of a serialized image: always 262144, however little code
/// was emitted.
pub const IMAGE_BYTES: usize = MEM_WORDS * 2;

/// The entire address space of the machine: one contiguous array of 16-bit
/// cells, index = absolute word address. Code and data share this space;
/// specific cells are memory-mapped I/O on real hardware, but this model
/// attaches no semantics to any address.
#[derive(Clone, Serialize, Deserialize)]
pub struct Memory {
    words: Vec<u16>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            words: vec![0; MEM_WORDS],
        }
    }

    pub fn word(&self, addr: u32) -> u16 {
        self.words[addr as usize]
    }

    pub fn set_word(&mut self, addr: u32, val: u16) {
        self.words[addr as usize] = val;
    }

    /// Serialize the image verbatim: little-endian words, no header, no
    /// checksum, no length prefix.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IMAGE_BYTES);
        for w in &self.words {
            out.extend_from_slice(&w.to_le_bytes());
        }
        out
    }

    pub fn write_bin(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }
}
