use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use make_mac_rom::layout::{RomLayout, DEFAULT_CODE_OFFSET, DEFAULT_ROM_BASE, DEFAULT_ROM_SIZE};
use make_mac_rom::{build_rom, parse_u32, parse_usize, save_rom, BuildOpts, Placement};

#[derive(Parser, Debug)]
#[command(
    name = "make-mac-rom",
    about = "Build a ROM image for an emulated 68k Mac from compiled code, refusing overlapping or out-of-range writes."
)]
struct Args {
    /// Output ROM image path (overwritten if it exists)
    output: PathBuf,

    /// Compiled 68k code to place in the ROM
    code: PathBuf,

    /// ROM image size in bytes
    #[arg(long, value_name = "BYTES", value_parser = parse_usize, default_value_t = DEFAULT_ROM_SIZE)]
    rom_size: usize,

    /// Address the ROM is mapped at; the initial PC is this plus --code-offset
    #[arg(long, value_name = "ADDR", value_parser = parse_u32, default_value_t = DEFAULT_ROM_BASE)]
    rom_base: u32,

    /// Offset of the compiled code within the ROM
    #[arg(long, value_name = "OFFSET", value_parser = parse_usize, default_value_t = DEFAULT_CODE_OFFSET)]
    code_offset: usize,

    /// Copy an extra file into the ROM (repeatable, e.g. --include 0x1000=resources.bin)
    #[arg(long = "include", value_name = "OFFSET=PATH")]
    includes: Vec<Placement>,

    /// Write layout metadata JSON to this path
    #[arg(long, value_name = "PATH")]
    metadata_out: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, action = clap::ArgAction::SetTrue)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(args)
}

fn run(args: Args) -> Result<()> {
    let opts = BuildOpts {
        layout: RomLayout {
            rom_size: args.rom_size,
            rom_base: args.rom_base,
            code_offset: args.code_offset,
        },
        code: args.code,
        includes: args.includes,
    };

    let built = build_rom(&opts)?;
    save_rom(&built.rom, &args.output)?;

    if let Some(path) = &args.metadata_out {
        let json = serde_json::to_string_pretty(&built.metadata).context("serialize metadata")?;
        fs::write(path, json.as_bytes())
            .with_context(|| format!("write metadata {}", path.display()))?;
    }

    tracing::info!(
        path = %args.output.display(),
        size = built.metadata.rom_size,
        written = built.metadata.written_bytes,
        "ROM successfully written"
    );
    Ok(())
}
