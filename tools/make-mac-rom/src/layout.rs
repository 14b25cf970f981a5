//! Memory layout of a 68k Macintosh ROM image.
//!
//! The ROM is mapped at [`DEFAULT_ROM_BASE`] on a Mac Plus. On reset the CPU loads its initial
//! program counter from the long word at [`INITIAL_PC_OFFSET`], so that entry must point at the
//! address the compiled code ends up at once the ROM is mapped.

use anyhow::{anyhow, Result};

/// 512 KiB, the Mac Plus ROM size.
pub const DEFAULT_ROM_SIZE: usize = 512 * 1024;

/// Address the ROM is mapped at.
pub const DEFAULT_ROM_BASE: u32 = 0x0040_0000;

/// Offset of the compiled code within the image.
pub const DEFAULT_CODE_OFFSET: usize = 0x2a;

/// Offset of the big-endian initial program counter.
pub const INITIAL_PC_OFFSET: usize = 0x4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomLayout {
    pub rom_size: usize,
    pub rom_base: u32,
    pub code_offset: usize,
}

impl Default for RomLayout {
    fn default() -> Self {
        Self {
            rom_size: DEFAULT_ROM_SIZE,
            rom_base: DEFAULT_ROM_BASE,
            code_offset: DEFAULT_CODE_OFFSET,
        }
    }
}

impl RomLayout {
    /// Address of the first code byte once the ROM is mapped.
    pub fn initial_pc(&self) -> Result<u32> {
        let offset = u32::try_from(self.code_offset)
            .map_err(|_| anyhow!("code offset {:#x} does not fit in 32 bits", self.code_offset))?;
        self.rom_base.checked_add(offset).ok_or_else(|| {
            anyhow!(
                "initial PC overflows: ROM base {:#x} + code offset {:#x}",
                self.rom_base,
                self.code_offset
            )
        })
    }

    pub fn initial_pc_bytes(&self) -> Result<[u8; 4]> {
        Ok(self.initial_pc()?.to_be_bytes())
    }
}
