// Two-pass disassembly orchestration.
//
// The discovery pass scans the whole image once to collect jump/call
// targets and I/O-register usage; it produces no text. The final pass
// scans again, consults the tagfile before decoding, and formats one
// output line per instruction with the optional address / cycle / opcode
// columns.

use std::fmt;
use std::path::PathBuf;

use crate::ioregs::IoRegUsage;
use crate::labels::LabelTable;
use crate::opcodes;
use crate::registry::avr_registry;
use crate::render::Collect;
use crate::tagfile::Tagfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStyle {
    Plain,
    AvrGcc,
}

pub struct Options {
    pub process_labels: bool,
    pub show_pseudocode: bool,
    pub code_style: CodeStyle,
    pub show_addresses: bool,
    pub show_opcode_bytes: bool,
    pub show_cycle_counts: bool,
    pub show_comments: bool,
    pub tagfile: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            process_labels: false,
            show_pseudocode: false,
            code_style: CodeStyle::Plain,
            show_addresses: false,
            show_opcode_bytes: false,
            show_cycle_counts: false,
            show_comments: true,
            tagfile: None,
        }
    }
}

#[derive(Debug)]
pub enum DisasmError {
    BrokenOpcodeTable,
    Tagfile(String),
}

impl fmt::Display for DisasmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisasmError::BrokenOpcodeTable => {
                write!(f, "opcode table broken (this should never happen)")
            }
            DisasmError::Tagfile(msg) => write!(f, "tagfile: {}", msg),
        }
    }
}

impl std::error::Error for DisasmError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Discover,
    Final,
}

/// Mutable state of one disassembly run: cursor, pass flag, collectors,
/// and the accumulated output text.
struct State {
    pass: Pass,
    pos: usize,
    labels: LabelTable,
    ioregs: IoRegUsage,
    out: String,
}

// Raw opcode bytes column is padded to the widest instruction the
// original tool anticipated.
const OPCODE_FIELD_BYTES: usize = 5;

/// Disassemble a flash image. `base` offsets the printed address column;
/// positions, labels, and branch targets are relative to the image start.
pub fn disassemble(bytes: &[u8], base: usize, opts: &Options) -> Result<String, DisasmError> {
    if !opcodes::table_consistent() {
        return Err(DisasmError::BrokenOpcodeTable);
    }

    let tagfile = match &opts.tagfile {
        Some(path) => Some(Tagfile::load(path).map_err(DisasmError::Tagfile)?),
        None => None,
    };

    let registry = avr_registry(opts.show_pseudocode);

    let mut state = State {
        pass: Pass::Final,
        pos: 0,
        labels: LabelTable::new(),
        ioregs: IoRegUsage::new(),
        out: String::new(),
    };

    // Discovery is needed for label cross-references, and for the avr-gcc
    // style's used-register banner when pseudocode is off.
    let want_discovery =
        opts.process_labels || (!opts.show_pseudocode && opts.code_style == CodeStyle::AvrGcc);

    if want_discovery {
        state.pass = Pass::Discover;
        while state.pos < bytes.len() {
            match registry.resolve(&bytes[state.pos..]) {
                Some((t, fields)) => {
                    let mut col = Collect {
                        labels: &mut state.labels,
                        ioregs: &mut state.ioregs,
                    };
                    t.renderer.discover(t.op, &fields, state.pos, &mut col);
                    state.pos += t.width();
                }
                // Unmatched positions are silently skipped in this pass.
                None => state.pos += 2,
            }
        }
        state.labels.enumerate();
        state.pos = 0;
    }

    state.pass = Pass::Final;

    if opts.code_style == CodeStyle::AvrGcc {
        let banner = state.ioregs.emit_summary();
        state.out.push_str(&banner);
    }

    while state.pos < bytes.len() {
        debug_assert_eq!(state.pass, Pass::Final);

        // Pre-declared data short-circuits decoding entirely.
        if let Some(tf) = &tagfile {
            let added = tf.process_data(bytes, state.pos, &mut state.out);
            if added != 0 {
                state.pos += added;
                continue;
            }
        }

        if state.pos + 1 >= bytes.len() {
            state.out.push_str(&format!(
                ".byte 0x{:02x}    ; Trailing byte at 0x{:04x}.\n",
                bytes[state.pos],
                base + state.pos
            ));
            break;
        }

        match registry.resolve(&bytes[state.pos..]) {
            Some((t, fields)) => {
                let mut col = Collect {
                    labels: &mut state.labels,
                    ioregs: &mut state.ioregs,
                };
                let rendered = t.renderer.emit(t.op, &fields, state.pos, &mut col);

                if opts.process_labels {
                    if let Some(block) = state.labels.declarations_at(state.pos) {
                        state.out.push_str(&block);
                    }
                }

                if opts.show_addresses {
                    state.out.push_str(&format!("{:4x}:   ", base + state.pos));
                }
                if opts.show_cycle_counts {
                    state.out.push_str(&format!("[{:<3}] ", t.op.clocks()));
                }
                if opts.show_opcode_bytes {
                    for i in 0..t.width() {
                        state.out.push_str(&format!("{:02x} ", bytes[state.pos + i]));
                    }
                    state.out.push(' ');
                    for _ in t.width()..OPCODE_FIELD_BYTES {
                        state.out.push_str("   ");
                    }
                }

                if rendered.code.is_empty() {
                    state.out.push_str(&format!(
                        "; - Not implemented opcode: {} -\n",
                        t.op.mnemonic()
                    ));
                } else if !rendered.comment.is_empty() && opts.show_comments {
                    let width = if opts.show_pseudocode { 35 } else { 23 };
                    state.out.push_str(&format!(
                        "{:<width$} ; {}\n",
                        rendered.code,
                        rendered.comment,
                        width = width
                    ));
                } else {
                    state.out.push_str(&rendered.code);
                    state.out.push('\n');
                }
                state.out.push_str(&rendered.after);

                state.pos += t.width();
            }
            None => {
                state.out.push_str(&format!(
                    ".word 0x{:02x}{:02x}    ; Invalid opcode at 0x{:04x} ({}). Disassembler skipped two bytes.\n",
                    bytes[state.pos + 1],
                    bytes[state.pos],
                    base + state.pos,
                    base + state.pos
                ));
                state.pos += 2;
            }
        }
    }

    // Close the implicit top-level block the pseudocode style lives in.
    if opts.show_pseudocode {
        state.out.push_str("}\n");
    }

    Ok(state.out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nop_line_with_columns() {
        let opts = Options {
            show_addresses: true,
            show_opcode_bytes: true,
            ..Options::default()
        };
        let out = disassemble(&[0x00, 0x00], 0, &opts).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("0:"));
        assert!(lines[0].contains("00 00"));
        assert!(lines[0].contains("nop"));
        assert!(!out.contains(".word"));
        assert!(!out.contains("Label"));
    }

    #[test]
    fn test_unmatched_word_placeholder() {
        let out = disassemble(&[0xFF, 0xFF], 0, &Options::default()).unwrap();
        assert!(out.contains(".word 0xffff"));
        assert!(out.contains("0x0000"));
    }

    #[test]
    fn test_unmatched_word_advances_two_bytes() {
        let out = disassemble(&[0xFF, 0xFF, 0x00, 0x00], 0, &Options::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(".word 0xffff"));
        assert_eq!(lines[1], "nop");
    }

    #[test]
    fn test_two_pass_label_before_target() {
        // nop; rjmp .-4 (back to the nop)
        let opts = Options {
            process_labels: true,
            ..Options::default()
        };
        let out = disassemble(&[0x00, 0x00, 0xFE, 0xCF], 0, &opts).unwrap();
        assert_eq!(out.matches("Label_1:").count(), 1);
        let label_at = out.find("Label_1:\n").unwrap();
        let nop_at = out.find("nop").unwrap();
        assert!(label_at < nop_at);
        assert!(out.contains("rjmp Label_1"));
        assert!(out.contains("; Referenced from 0x0002 (rjmp)"));
    }

    #[test]
    fn test_supersede_switches_to_pseudocode() {
        let plain = disassemble(&[0x1E, 0x1F], 0, &Options::default()).unwrap();
        assert!(plain.contains("adc r17, r30"));

        let opts = Options {
            show_pseudocode: true,
            ..Options::default()
        };
        let pseudo = disassemble(&[0x1E, 0x1F], 0, &opts).unwrap();
        assert!(pseudo.contains("r17 = r17 + r30 + C;"));
        assert!(pseudo.contains("; adc r17, r30"));
        assert!(pseudo.ends_with("}\n"));
    }

    #[test]
    fn test_gcc_style_emits_io_banner() {
        // out 0x3f, r16
        let opts = Options {
            code_style: CodeStyle::AvrGcc,
            ..Options::default()
        };
        let out = disassemble(&[0x0F, 0xBF], 0, &opts).unwrap();
        let banner_at = out.find("; I/O registers used:").unwrap();
        let code_at = out.find("out 0x3f, r16").unwrap();
        assert!(banner_at < code_at);
        assert!(out.contains("0x3f: SREG"));
    }

    #[test]
    fn test_tagfile_skips_data() {
        let path = std::env::temp_dir().join("avrdisas_test_tags");
        std::fs::write(&path, "0x0000 B 2 table\n").unwrap();
        let opts = Options {
            tagfile: Some(path.clone()),
            ..Options::default()
        };
        let out = disassemble(&[0x12, 0x34, 0x00, 0x00], 0, &opts).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(out.contains("table:"));
        assert!(out.contains(".byte 0x12, 0x34"));
        assert!(out.contains("nop"));
        assert!(!out.contains(".word"));
    }

    #[test]
    fn test_comment_suppression() {
        // ldi r16, 0xaa carries a decimal comment
        let out = disassemble(&[0x0A, 0xEA], 0, &Options::default()).unwrap();
        assert!(out.contains("; 170"));

        let opts = Options {
            show_comments: false,
            ..Options::default()
        };
        let out = disassemble(&[0x0A, 0xEA], 0, &opts).unwrap();
        assert!(!out.contains("; 170"));
        assert!(out.contains("ldi r16, 0xaa"));
    }

    #[test]
    fn test_base_offsets_address_column() {
        let opts = Options {
            show_addresses: true,
            ..Options::default()
        };
        let out = disassemble(&[0x00, 0x00], 0x100, &opts).unwrap();
        assert!(out.contains("100:"));
    }

    #[test]
    fn test_missing_tagfile_is_fatal() {
        let opts = Options {
            tagfile: Some(PathBuf::from("/nonexistent/tags")),
            ..Options::default()
        };
        assert!(matches!(
            disassemble(&[0x00, 0x00], 0, &opts),
            Err(DisasmError::Tagfile(_))
        ));
    }
}
