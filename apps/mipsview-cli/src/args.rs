use std::path::PathBuf;

use clap::Parser;
use mipsview_core::{MemoryRegion, Reg};
use tracing::Level;

/// Inspect a MIPS R3000 machine snapshot the way the debugger views show it.
#[derive(Parser, Debug)]
#[command(name = "mipsview", author, version, about, long_about = None)]
pub struct Args {
    /// Main RAM image (up to 2 MiB)
    #[arg(long)]
    pub ram: Option<PathBuf>,

    /// BIOS ROM image (up to 512 KiB)
    #[arg(long)]
    pub bios: Option<PathBuf>,

    /// Scratchpad image (up to 1 KiB)
    #[arg(long)]
    pub scratchpad: Option<PathBuf>,

    /// Expansion region 1 image; EXP1 is absent when omitted
    #[arg(long)]
    pub exp1: Option<PathBuf>,

    /// Program counter
    #[arg(long, value_parser = parse_hex, default_value = "0xBFC00000")]
    pub pc: u32,

    /// Stack pointer
    #[arg(long, value_parser = parse_hex)]
    pub sp: Option<u32>,

    /// Register assignment, e.g. `--reg a0=0x1F800000`
    #[arg(long = "reg", value_name = "NAME=HEX", value_parser = parse_reg_assignment)]
    pub regs: Vec<(Reg, u32)>,

    /// Breakpoint address
    #[arg(long = "breakpoint", value_parser = parse_hex)]
    pub breakpoints: Vec<u32>,

    /// Memory bank shown in the hex view (ram, scratchpad, exp1)
    #[arg(long, default_value = "ram")]
    pub region: MemoryRegion,

    /// Virtual address to scroll the hex view to
    #[arg(long, value_parser = parse_hex)]
    pub memory_address: Option<u32>,

    /// Instruction rows printed around the PC
    #[arg(long, default_value_t = 16)]
    pub code_rows: usize,

    /// Hex view rows
    #[arg(long, default_value_t = 8)]
    pub memory_rows: u32,

    /// Stack slots printed around the stack pointer
    #[arg(long, default_value_t = 8)]
    pub stack_rows: usize,

    /// Show Latin-1 characters in the ASCII column
    #[arg(long)]
    pub latin1: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    pub log_level: Level,
}

fn parse_hex(value: &str) -> Result<u32, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u32::from_str_radix(&digits.replace('_', ""), 16)
        .map_err(|e| format!("invalid hex value `{value}`: {e}"))
}

fn parse_reg_assignment(value: &str) -> Result<(Reg, u32), String> {
    let (name, number) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=HEX, got `{value}`"))?;
    Ok((name.trim().parse()?, parse_hex(number.trim())?))
}
