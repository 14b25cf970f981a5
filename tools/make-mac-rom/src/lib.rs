//! Assembles a bootable ROM image for an emulated 68k Macintosh.
//!
//! The image is a fixed-size [`RomBuffer`] that receives, in order:
//!
//! 1. the initial program counter (big-endian, at [`layout::INITIAL_PC_OFFSET`])
//! 2. the compiled code, at the layout's code offset
//! 3. any extra files requested with `--include OFFSET=PATH`
//!
//! Any placement that overlaps an earlier one or runs past the end of the ROM aborts the build.

pub mod layout;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use macrom_image::{ByteRange, RomBuffer};
use serde::Serialize;

use crate::layout::{RomLayout, INITIAL_PC_OFFSET};

/// A file to be copied verbatim into the image at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub offset: usize,
    pub path: PathBuf,
}

impl FromStr for Placement {
    type Err = anyhow::Error;

    /// Parses `OFFSET=PATH`, e.g. `0x1000=resources.bin`.
    fn from_str(s: &str) -> Result<Self> {
        let (offset, path) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected OFFSET=PATH, got {s:?}"))?;
        if path.is_empty() {
            bail!("missing path in {s:?}");
        }
        Ok(Self {
            offset: parse_usize(offset)?,
            path: PathBuf::from(path),
        })
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal integer.
pub fn parse_u64(s: &str) -> Result<u64> {
    let trimmed = s.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => trimmed.replace('_', "").parse::<u64>(),
    };
    parsed.map_err(|err| anyhow!("invalid number {s:?}: {err}"))
}

pub fn parse_usize(s: &str) -> Result<usize> {
    let value = parse_u64(s)?;
    usize::try_from(value).map_err(|_| anyhow!("{s:?} does not fit in usize"))
}

pub fn parse_u32(s: &str) -> Result<u32> {
    let value = parse_u64(s)?;
    u32::try_from(value).map_err(|_| anyhow!("{s:?} does not fit in 32 bits"))
}

#[derive(Debug, Clone)]
pub struct BuildOpts {
    pub layout: RomLayout,
    /// Compiled 68k code, placed at `layout.code_offset`.
    pub code: PathBuf,
    pub includes: Vec<Placement>,
}

/// Layout summary intended for tooling that consumes the produced image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RomMetadata {
    pub version: u32,
    pub rom_size: usize,
    pub rom_base: u32,
    pub initial_pc: u32,
    pub regions: Vec<RegionMetadata>,
    pub written_ranges: Vec<ByteRange>,
    pub written_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionMetadata {
    pub start: usize,
    pub end: usize,
    pub source: String,
}

#[derive(Debug)]
pub struct BuiltRom {
    pub rom: RomBuffer,
    pub metadata: RomMetadata,
}

pub fn build_rom(opts: &BuildOpts) -> Result<BuiltRom> {
    let layout = opts.layout;
    let initial_pc = layout.initial_pc()?;

    let mut rom = RomBuffer::new(layout.rom_size)
        .with_context(|| format!("allocate {}-byte ROM", layout.rom_size))?;
    let mut regions = Vec::with_capacity(2 + opts.includes.len());

    tracing::info!(
        initial_pc = %format!("{initial_pc:#010x}"),
        "writing initial PC (program counter)"
    );
    let pc_bytes = initial_pc.to_be_bytes();
    rom.write_bytes(INITIAL_PC_OFFSET, &pc_bytes)
        .context("write initial PC")?;
    regions.push(RegionMetadata {
        start: INITIAL_PC_OFFSET,
        end: INITIAL_PC_OFFSET + pc_bytes.len(),
        source: "initial-pc".to_string(),
    });

    let code_len = rom
        .write_file(layout.code_offset, &opts.code)
        .with_context(|| format!("write code {}", opts.code.display()))?;
    regions.push(RegionMetadata {
        start: layout.code_offset,
        end: layout.code_offset + code_len,
        source: opts.code.display().to_string(),
    });

    for include in &opts.includes {
        let len = rom
            .write_file(include.offset, &include.path)
            .with_context(|| format!("write include {}", include.path.display()))?;
        regions.push(RegionMetadata {
            start: include.offset,
            end: include.offset + len,
            source: include.path.display().to_string(),
        });
    }

    let metadata = RomMetadata {
        version: 1,
        rom_size: rom.size(),
        rom_base: layout.rom_base,
        initial_pc,
        regions,
        written_ranges: rom.written_ranges(),
        written_bytes: rom.written_len(),
    };

    Ok(BuiltRom { rom, metadata })
}

/// Persist the full image to `path`, replacing any existing file.
pub fn save_rom(rom: &RomBuffer, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    rom.write_to(BufWriter::new(file))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
