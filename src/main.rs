use std::path::PathBuf;
use std::process;

use clap::Parser;

mod disasm;
mod firmware;
mod ioregs;
mod labels;
mod matcher;
mod opcodes;
mod registry;
mod render;
mod tagfile;

use crate::disasm::{CodeStyle, Options};

#[derive(Parser)]
#[command(name = "avrdisas", version, about = "Disassembler for AVR flash images")]
struct Cli {
    /// Firmware image, Intel HEX (.hex) or raw binary
    file: PathBuf,

    /// Byte address of the start of the image
    #[arg(short, long, default_value = "0", value_parser = parse_address)]
    base: usize,

    /// Turn jump and call targets into labels
    #[arg(short, long)]
    labels: bool,

    /// Emit C-like pseudocode where a form is known
    #[arg(short, long)]
    pseudocode: bool,

    /// avr-gcc output style, with a used-I/O-register banner
    #[arg(short, long)]
    gcc: bool,

    /// Print the address of each instruction
    #[arg(short, long)]
    addresses: bool,

    /// Print the raw opcode bytes of each instruction
    #[arg(short, long)]
    opcode_bytes: bool,

    /// Print cycle counts
    #[arg(short, long)]
    cycles: bool,

    /// Suppress the comment column
    #[arg(long)]
    no_comments: bool,

    /// Tagfile declaring data ranges inside the image
    #[arg(short, long)]
    tagfile: Option<PathBuf>,
}

fn parse_address(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn main() {
    let cli = Cli::parse();

    let bytes = match firmware::load(&cli.file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("avrdisas: {}", e);
            process::exit(1);
        }
    };

    let opts = Options {
        process_labels: cli.labels,
        show_pseudocode: cli.pseudocode,
        code_style: if cli.gcc {
            CodeStyle::AvrGcc
        } else {
            CodeStyle::Plain
        },
        show_addresses: cli.addresses,
        show_opcode_bytes: cli.opcode_bytes,
        show_cycle_counts: cli.cycles,
        show_comments: !cli.no_comments,
        tagfile: cli.tagfile,
    };

    match disasm::disassemble(&bytes, cli.base, &opts) {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("avrdisas: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_forms() {
        assert_eq!(parse_address("0").unwrap(), 0);
        assert_eq!(parse_address("256").unwrap(), 256);
        assert_eq!(parse_address("0x100").unwrap(), 0x100);
        assert!(parse_address("zzz").is_err());
    }
}
