pub mod assembly;
pub mod pseudocode;

use crate::ioregs::IoRegUsage;
use crate::labels::LabelTable;
use crate::matcher::FieldSet;
use crate::opcodes::Opcode;

/// Per-instruction output of a renderer's final facet. `code` empty means
/// the renderer has no text for this opcode and the orchestrator prints a
/// placeholder instead. `after` is emitted verbatim below the line.
#[derive(Default)]
pub struct Rendered {
    pub code: String,
    pub comment: String,
    pub after: String,
}

/// External collectors a renderer records into on both facets.
pub struct Collect<'a> {
    pub labels: &'a mut LabelTable,
    pub ioregs: &'a mut IoRegUsage,
}

/// One opcode's renderer capability.
///
/// `discover` runs during the first pass and only records jump/call targets
/// and I/O-register usage. `emit` runs during the final pass, records the
/// same side effects, and produces the output text.
pub trait Render {
    fn discover(&self, op: Opcode, fields: &FieldSet, pos: usize, col: &mut Collect);
    fn emit(&self, op: Opcode, fields: &FieldSet, pos: usize, col: &mut Collect) -> Rendered;
}

/// Sign-extend the low `bits` of a field value.
pub fn sext(v: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((v << shift) as i32) >> shift
}

/// Byte address targeted by a relative branch/jump: the offset field counts
/// words from the following instruction. None if it points before the
/// stream start (possible on garbage input).
pub fn rel_target(pos: usize, k: u32, bits: u32) -> Option<usize> {
    let target = pos as i64 + 2 + 2 * i64::from(sext(k, bits));
    if target >= 0 {
        Some(target as usize)
    } else {
        None
    }
}

/// Byte address of a jmp/call 22-bit word-address field.
pub fn abs_target(k: u32) -> usize {
    2 * k as usize
}

/// Branch/jump operand: the canonical label name once labels have been
/// enumerated, the absolute hex address otherwise.
pub fn target_operand(labels: &LabelTable, target: usize) -> String {
    match labels.name_of(target) {
        Some(name) => name.to_string(),
        None => format!("0x{:04x}", target),
    }
}

/// Record the label/IO side effects common to both facets of an opcode.
pub fn collect_effects(op: Opcode, fields: &FieldSet, pos: usize, col: &mut Collect) {
    use Opcode::*;

    match op {
        RJMP | RCALL => {
            if let Some(t) = rel_target(pos, fields.get('k'), 12) {
                col.labels.record_reference(pos, t, op);
            }
        }
        BRCC | BRCS | BREQ | BRGE | BRHC | BRHS | BRID | BRIE | BRLO | BRLT | BRMI | BRNE
        | BRPL | BRSH | BRTC | BRTS | BRVC | BRVS | BRBC | BRBS => {
            if let Some(t) = rel_target(pos, fields.get('k'), 7) {
                col.labels.record_reference(pos, t, op);
            }
        }
        JMP | CALL => {
            col.labels.record_reference(pos, abs_target(fields.get('k')), op);
        }
        IN | OUT | SBI | SBIC | SBIS | CBI => {
            col.ioregs.record_usage(fields.get('A') as u8);
        }
        _ => {}
    }
}
