// Plain assembly renderer: one text form per registered opcode.

use super::{abs_target, collect_effects, rel_target, sext, target_operand, Collect, Render, Rendered};
use crate::ioregs;
use crate::labels::LabelTable;
use crate::matcher::FieldSet;
use crate::opcodes::Opcode;

pub struct AsmRender;

impl Render for AsmRender {
    fn discover(&self, op: Opcode, fields: &FieldSet, pos: usize, col: &mut Collect) {
        collect_effects(op, fields, pos, col);
    }

    fn emit(&self, op: Opcode, fields: &FieldSet, pos: usize, col: &mut Collect) -> Rendered {
        collect_effects(op, fields, pos, col);
        let (code, comment) = text(op, fields, pos, col.labels);
        Rendered {
            code,
            comment,
            after: String::new(),
        }
    }
}

/// Operand of a relative branch/jump plus the comment column. Branch
/// targets print as their canonical label once labels are enumerated, with
/// the absolute address relegated to the comment.
fn branch_operand(pos: usize, k: u32, bits: u32, labels: &LabelTable) -> (String, String) {
    match rel_target(pos, k, bits) {
        Some(target) => {
            let operand = target_operand(labels, target);
            let comment = if labels.name_of(target).is_some() {
                format!("0x{:04x}", target)
            } else {
                String::new()
            };
            (operand, comment)
        }
        None => (format!(".{:+}", 2 * sext(k, bits)), String::new()),
    }
}

fn ioreg_comment(index: u32) -> String {
    ioregs::register_name(index as u8)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Assembly text and comment for one matched opcode. Pure: all recording
/// side effects live in collect_effects.
pub(crate) fn text(op: Opcode, fields: &FieldSet, pos: usize, labels: &LabelTable) -> (String, String) {
    use Opcode::*;

    let name = op.mnemonic();
    let d = fields.get('d');
    let r = fields.get('r');
    let k = fields.get('k');
    let val = fields.get('K');
    let a = fields.get('A');
    let b = fields.get('b');
    let q = fields.get('q');
    let s = fields.get('s');

    match op {
        // Register pairs
        ADC | ADD | AND | CP | CPC | CPSE | EOR | MOV | MUL | OR | SBC | SUB => {
            (format!("{} r{}, r{}", name, d, r), String::new())
        }
        MULS => (format!("muls r{}, r{}", 16 + d, 16 + r), String::new()),
        MULSU | FMUL | FMULS | FMULSU => {
            (format!("{} r{}, r{}", name, 16 + d, 16 + r), String::new())
        }
        MOVW => (
            format!("movw r{}:r{}, r{}:r{}", 2 * d + 1, 2 * d, 2 * r + 1, 2 * r),
            String::new(),
        ),

        // Immediates (upper register file)
        ANDI | CPI | LDI | ORI | SBCI | SBR | SUBI => (
            format!("{} r{}, 0x{:02x}", name, 16 + d, val),
            format!("{}", val),
        ),
        SER => (format!("ser r{}", 16 + d), String::new()),
        ADIW | SBIW => {
            let rd = 24 + 2 * d;
            (
                format!("{} r{}:r{}, 0x{:02x}", name, rd + 1, rd, val),
                format!("{}", val),
            )
        }

        // Single register
        ASR | COM | DEC | INC | LSR | NEG | POP | PUSH | ROR | SWAP => {
            (format!("{} r{}", name, d), String::new())
        }

        // Bit work
        BCLR | BSET => (format!("{} {}", name, s), String::new()),
        BLD | BST => (format!("{} r{}, {}", name, d, b), String::new()),
        SBRC | SBRS => (format!("{} r{}, {}", name, r, b), String::new()),

        // I/O space
        IN => (format!("in r{}, 0x{:02x}", d, a), ioreg_comment(a)),
        OUT => (format!("out 0x{:02x}, r{}", a, r), ioreg_comment(a)),
        SBI | SBIC | SBIS | CBI => {
            (format!("{} 0x{:02x}, {}", name, a, b), ioreg_comment(a))
        }

        // Branches and jumps
        BRCC | BRCS | BREQ | BRGE | BRHC | BRHS | BRID | BRIE | BRLO | BRLT | BRMI | BRNE
        | BRPL | BRSH | BRTC | BRTS | BRVC | BRVS => {
            let (operand, comment) = branch_operand(pos, k, 7, labels);
            (format!("{} {}", name, operand), comment)
        }
        BRBC | BRBS => {
            let (operand, comment) = branch_operand(pos, k, 7, labels);
            (format!("{} {}, {}", name, s, operand), comment)
        }
        RJMP | RCALL => {
            let (operand, comment) = branch_operand(pos, k, 12, labels);
            (format!("{} {}", name, operand), comment)
        }
        JMP | CALL => {
            let target = abs_target(k);
            let comment = if labels.name_of(target).is_some() {
                format!("0x{:04x}", target)
            } else {
                String::new()
            };
            (format!("{} {}", name, target_operand(labels, target)), comment)
        }

        // Loads and stores
        LDX => (format!("ld r{}, X", d), String::new()),
        LDXinc => (format!("ld r{}, X+", d), String::new()),
        LDXdec => (format!("ld r{}, -X", d), String::new()),
        LDY => (format!("ld r{}, Y", d), String::new()),
        LDYinc => (format!("ld r{}, Y+", d), String::new()),
        LDYdec => (format!("ld r{}, -Y", d), String::new()),
        LDDY => (format!("ldd r{}, Y+{}", d, q), String::new()),
        LDZ => (format!("ld r{}, Z", d), String::new()),
        LDZinc => (format!("ld r{}, Z+", d), String::new()),
        LDZdec => (format!("ld r{}, -Z", d), String::new()),
        LDDZ => (format!("ldd r{}, Z+{}", d, q), String::new()),
        STX => (format!("st X, r{}", r), String::new()),
        STXinc => (format!("st X+, r{}", r), String::new()),
        STXdec => (format!("st -X, r{}", r), String::new()),
        STY => (format!("st Y, r{}", r), String::new()),
        STYinc => (format!("st Y+, r{}", r), String::new()),
        STYdec => (format!("st -Y, r{}", r), String::new()),
        STDY => (format!("std Y+{}, r{}", q, r), String::new()),
        STZ => (format!("st Z, r{}", r), String::new()),
        STZinc => (format!("st Z+, r{}", r), String::new()),
        STZdec => (format!("st -Z, r{}", r), String::new()),
        STDZ => (format!("std Z+{}, r{}", q, r), String::new()),
        LDS => (format!("lds r{}, 0x{:04x}", d, k), String::new()),
        STS => (format!("sts 0x{:04x}, r{}", k, d), String::new()),

        // Program memory
        LPM => ("lpm".to_string(), String::new()),
        LPMZ => (format!("lpm r{}, Z", d), String::new()),
        LPMZinc => (format!("lpm r{}, Z+", d), String::new()),
        ELPM => ("elpm".to_string(), String::new()),
        ELPMZ => (format!("elpm r{}, Z", d), String::new()),
        ELPMZinc => (format!("elpm r{}, Z+", d), String::new()),

        // No operands
        BREAK | CLC | CLH | CLI | CLN | CLS | CLT | CLV | CLZ | EICALL | EIJMP | ICALL
        | IJMP | NOP | RET | RETI | SEC | SEH | SEI | SEN | SES | SET | SEV | SEZ | SLEEP
        | SPM | WDR => (name.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::match_template;

    fn fields_for(pattern: &str, window: &[u8]) -> FieldSet {
        let symbols: Vec<char> = pattern.chars().filter(|c| !c.is_whitespace()).collect();
        let mut fields = FieldSet::new();
        assert!(match_template(&symbols, window, &mut fields));
        fields
    }

    #[test]
    fn test_register_pair_text() {
        let fields = fields_for("0001 11rd  dddd rrrr", &[0x1E, 0x1F]);
        let (code, _) = text(Opcode::ADC, &fields, 0, &LabelTable::new());
        assert_eq!(code, "adc r17, r30");
    }

    #[test]
    fn test_immediate_maps_to_upper_registers() {
        // ldi r16, 0xaa
        let fields = fields_for("1110 KKKK  dddd KKKK", &[0x0A, 0xEA]);
        let (code, comment) = text(Opcode::LDI, &fields, 0, &LabelTable::new());
        assert_eq!(code, "ldi r16, 0xaa");
        assert_eq!(comment, "170");
    }

    #[test]
    fn test_branch_without_labels_prints_absolute() {
        // brne .-6 at byte 8 targets byte 4
        let fields = fields_for("1111 01kk  kkkk k001", &[0xE9, 0xF7]);
        let (code, comment) = text(Opcode::BRNE, &fields, 8, &LabelTable::new());
        assert_eq!(code, "brne 0x0004");
        assert_eq!(comment, "");
    }

    #[test]
    fn test_branch_with_label_name() {
        let fields = fields_for("1111 01kk  kkkk k001", &[0xE9, 0xF7]);
        let mut labels = LabelTable::new();
        labels.record_reference(8, 4, Opcode::BRNE);
        labels.enumerate();
        let (code, comment) = text(Opcode::BRNE, &fields, 8, &labels);
        assert_eq!(code, "brne Label_1");
        assert_eq!(comment, "0x0004");
    }

    #[test]
    fn test_io_comment_names_register() {
        // out 0x3f, r16
        let fields = fields_for("1011 1AAr  rrrr AAAA", &[0x0F, 0xBF]);
        let (code, comment) = text(Opcode::OUT, &fields, 0, &LabelTable::new());
        assert_eq!(code, "out 0x3f, r16");
        assert_eq!(comment, "SREG");
    }
}
