// Pseudocode renderer: C-flavoured text for the opcode subset the engine
// supersedes when --pseudocode is active. The plain assembly text moves to
// the comment column so both readings stay visible.

use super::{abs_target, assembly, collect_effects, rel_target, target_operand, Collect, Render, Rendered};
use crate::ioregs;
use crate::matcher::FieldSet;
use crate::opcodes::Opcode;

pub struct PseudoRender;

impl Render for PseudoRender {
    fn discover(&self, op: Opcode, fields: &FieldSet, pos: usize, col: &mut Collect) {
        collect_effects(op, fields, pos, col);
    }

    fn emit(&self, op: Opcode, fields: &FieldSet, pos: usize, col: &mut Collect) -> Rendered {
        collect_effects(op, fields, pos, col);
        let code = pseudo_text(op, fields, pos, col);
        let comment = assembly::text(op, fields, pos, col.labels).0;
        Rendered {
            code,
            comment,
            after: String::new(),
        }
    }
}

/// Condition under which a conditional branch is taken.
fn branch_condition(op: Opcode) -> &'static str {
    use Opcode::*;
    match op {
        BRCS | BRLO => "C",
        BRCC | BRSH => "!C",
        BREQ => "Z",
        BRNE => "!Z",
        BRMI => "N",
        BRPL => "!N",
        BRVS => "V",
        BRVC => "!V",
        BRLT => "N ^ V",
        BRGE => "!(N ^ V)",
        BRHS => "H",
        BRHC => "!H",
        BRTS => "T",
        BRTC => "!T",
        BRIE => "I",
        _ => "!I", // BRID
    }
}

fn io_operand(a: u32) -> String {
    match ioregs::register_name(a as u8) {
        Some(name) => format!("io[{}]", name),
        None => format!("io[0x{:02x}]", a),
    }
}

fn pseudo_text(op: Opcode, fields: &FieldSet, pos: usize, col: &Collect) -> String {
    use Opcode::*;

    let d = fields.get('d');
    let r = fields.get('r');
    let k = fields.get('k');
    let val = fields.get('K');
    let a = fields.get('A');
    let b = fields.get('b');

    match op {
        ADD => format!("r{} += r{};", d, r),
        ADC => format!("r{} = r{} + r{} + C;", d, d, r),
        SUB => format!("r{} -= r{};", d, r),
        SBC => format!("r{} = r{} - r{} - C;", d, d, r),
        AND => format!("r{} &= r{};", d, r),
        OR => format!("r{} |= r{};", d, r),
        EOR => format!("r{} ^= r{};", d, r),
        MOV => format!("r{} = r{};", d, r),
        MUL => format!("r1:r0 = r{} * r{};", d, r),
        CP => format!("compare(r{}, r{});", d, r),
        CPC => format!("compare_carry(r{}, r{});", d, r),
        CPSE => format!("if (r{} == r{}) skip_next();", d, r),
        MOVW => format!(
            "r{}:r{} = r{}:r{};",
            2 * d + 1,
            2 * d,
            2 * r + 1,
            2 * r
        ),

        ANDI => format!("r{} &= 0x{:02x};", 16 + d, val),
        ORI | SBR => format!("r{} |= 0x{:02x};", 16 + d, val),
        SUBI => format!("r{} -= 0x{:02x};", 16 + d, val),
        SBCI => format!("r{} = r{} - 0x{:02x} - C;", 16 + d, 16 + d, val),
        LDI => format!("r{} = 0x{:02x};", 16 + d, val),
        CPI => format!("compare(r{}, 0x{:02x});", 16 + d, val),
        SER => format!("r{} = 0xff;", 16 + d),
        ADIW => {
            let rd = 24 + 2 * d;
            format!("r{}:r{} += 0x{:02x};", rd + 1, rd, val)
        }

        INC => format!("r{}++;", d),
        DEC => format!("r{}--;", d),
        LSR => format!("r{} >>= 1;", d),
        ASR => format!("r{} = ((int8_t) r{}) >> 1;", d, d),
        ROR => format!("r{} = (C << 7) | (r{} >> 1);", d, d),
        SWAP => format!("r{} = (r{} << 4) | (r{} >> 4);", d, d, d),

        IN => format!("r{} = {};", d, io_operand(a)),
        OUT => format!("{} = r{};", io_operand(a), r),
        SBI => format!("{} |= (1 << {});", io_operand(a), b),
        CBI => format!("{} &= ~(1 << {});", io_operand(a), b),
        SBIS => format!("if ({} & (1 << {})) skip_next();", io_operand(a), b),
        SBIC => format!("if (!({} & (1 << {}))) skip_next();", io_operand(a), b),

        CLI => "I = 0;".to_string(),
        SEI => "I = 1;".to_string(),
        RET | RETI => "return;".to_string(),

        LDS => format!("r{} = mem[0x{:04x}];", d, k),
        STS => format!("mem[0x{:04x}] = r{};", k, d),
        LPM => "r0 = pgm[Z];".to_string(),
        STXinc => format!("mem[X++] = r{};", r),

        BRCC | BRCS | BREQ | BRGE | BRHC | BRHS | BRID | BRIE | BRLO | BRLT | BRMI | BRNE
        | BRPL | BRSH | BRTC | BRTS | BRVC | BRVS => match rel_target(pos, k, 7) {
            Some(t) => format!(
                "if ({}) goto {};",
                branch_condition(op),
                target_operand(col.labels, t)
            ),
            None => String::new(),
        },
        RJMP => match rel_target(pos, k, 12) {
            Some(t) => format!("goto {};", target_operand(col.labels, t)),
            None => String::new(),
        },
        RCALL => match rel_target(pos, k, 12) {
            Some(t) => format!("{}();", target_operand(col.labels, t)),
            None => String::new(),
        },
        JMP => format!("goto {};", target_operand(col.labels, abs_target(k))),
        CALL => format!("{}();", target_operand(col.labels, abs_target(k))),

        // Anything outside the superseded subset has no pseudocode form;
        // the orchestrator prints the not-implemented placeholder.
        _ => String::new(),
    }
}
