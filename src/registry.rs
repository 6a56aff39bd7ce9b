// Instruction template registry.
//
// Templates are bit-pattern strings, one symbol per bit: '0'/'1' are
// literal identification bits, any letter names an operand field.
// Overlapping encodings are untangled by specificity (the count of literal
// bits): finalize() sorts most-specific-first, so a fully-literal alias
// like `sec` always wins over its field-bearing parent `bset`.

use std::cmp::Reverse;

use crate::matcher::{match_template, FieldSet};
use crate::opcodes::Opcode;
use crate::render::assembly::AsmRender;
use crate::render::pseudocode::PseudoRender;
use crate::render::Render;

pub struct Template {
    pub op: Opcode,
    pub pattern: &'static str,
    symbols: Vec<char>,
    pub specificity: usize,
    valid: bool,
    pub renderer: Box<dyn Render>,
}

impl Template {
    /// Instruction width in bytes (2 or 4 for AVR).
    pub fn width(&self) -> usize {
        self.symbols.len() / 8
    }
}

pub struct Registry {
    templates: Vec<Template>,
    finalized: bool,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            templates: Vec::new(),
            finalized: false,
        }
    }

    /// Append a template. An invalid pattern (symbol outside '0'/'1'/letter,
    /// or a bit count that is not a whole number of bytes) is diagnosed and
    /// kept as a permanently non-matching entry.
    pub fn register(&mut self, pattern: &'static str, op: Opcode, renderer: Box<dyn Render>) {
        let symbols: Vec<char> = pattern.chars().filter(|c| !c.is_whitespace()).collect();
        let valid = symbols.len() % 8 == 0
            && symbols
                .iter()
                .all(|c| *c == '0' || *c == '1' || c.is_ascii_alphabetic());
        if !valid {
            eprintln!(
                "avrdisas: invalid template for {}: '{}'",
                op.mnemonic(),
                pattern
            );
        }
        self.templates.push(Template {
            op,
            pattern,
            symbols,
            specificity: 0,
            valid,
            renderer,
        });
    }

    /// Swap the renderer of an already-registered opcode, e.g. to switch it
    /// to the pseudocode style. An unknown opcode is diagnosed and skipped.
    pub fn supersede(&mut self, op: Opcode, renderer: Box<dyn Render>) {
        match self.templates.iter_mut().find(|t| t.op == op) {
            Some(t) => t.renderer = renderer,
            None => eprintln!(
                "avrdisas: no template to supersede for opcode {} ({})",
                op as usize,
                op.mnemonic()
            ),
        }
    }

    /// Compute specificities and sort most-specific-first. Call exactly
    /// once, after all registrations and supersessions. The sort is stable,
    /// so equal-specificity templates keep registration order.
    pub fn finalize(&mut self) {
        for t in &mut self.templates {
            t.specificity = t.symbols.iter().filter(|c| **c == '0' || **c == '1').count();
        }
        self.templates.sort_by_key(|t| Reverse(t.specificity));
        self.finalized = true;
    }

    /// Find the first (most specific) template matching the window, along
    /// with its extracted operand fields.
    pub fn resolve(&self, window: &[u8]) -> Option<(&Template, FieldSet)> {
        debug_assert!(self.finalized, "resolve before finalize");
        let mut fields = FieldSet::new();
        for t in &self.templates {
            if !t.valid {
                continue;
            }
            if match_template(&t.symbols, window, &mut fields) {
                return Some((t, fields));
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }
}

/// Registry holding the complete AVR instruction set, finalized and ready
/// to resolve. With `pseudocode` set, the superseded subset renders in the
/// pseudocode style.
pub fn avr_registry(pseudocode: bool) -> Registry {
    use Opcode::*;

    let mut reg = Registry::new();

    macro_rules! op {
        ($pattern:expr, $op:expr) => {
            reg.register($pattern, $op, Box::new(AsmRender));
        };
    }

    op!("0001 11rd  dddd rrrr", ADC);
    op!("0000 11rd  dddd rrrr", ADD);
    op!("1001 0110  KKdd KKKK", ADIW);
    op!("0010 00rd  dddd rrrr", AND);
    op!("0111 KKKK  dddd KKKK", ANDI);
    op!("1001 010d  dddd 0101", ASR);
    op!("1001 0100  1sss 1000", BCLR);
    op!("1111 100d  dddd 0bbb", BLD);
    op!("1111 01kk  kkkk ksss", BRBC);
    op!("1111 00kk  kkkk ksss", BRBS);
    op!("1111 01kk  kkkk k000", BRCC);
    op!("1111 00kk  kkkk k000", BRCS);
    op!("1001 0101  1001 1000", BREAK);
    op!("1111 00kk  kkkk k001", BREQ);
    op!("1111 01kk  kkkk k100", BRGE);
    op!("1111 01kk  kkkk k101", BRHC);
    op!("1111 00kk  kkkk k101", BRHS);
    op!("1111 01kk  kkkk k111", BRID);
    op!("1111 00kk  kkkk k111", BRIE);
    op!("1111 00kk  kkkk k000", BRLO);
    op!("1111 00kk  kkkk k100", BRLT);
    op!("1111 00kk  kkkk k010", BRMI);
    op!("1111 01kk  kkkk k001", BRNE);
    op!("1111 01kk  kkkk k010", BRPL);
    op!("1111 01kk  kkkk k000", BRSH);
    op!("1111 01kk  kkkk k110", BRTC);
    op!("1111 00kk  kkkk k110", BRTS);
    op!("1111 01kk  kkkk k011", BRVC);
    op!("1111 00kk  kkkk k011", BRVS);
    op!("1001 0100  0sss 1000", BSET);
    op!("1111 101d  dddd 0bbb", BST);
    op!("1001 010k  kkkk 111k    kkkk kkkk  kkkk kkkk", CALL);
    op!("1001 1000  AAAA Abbb", CBI);
    op!("1001 0100  1000 1000", CLC);
    op!("1001 0100  1101 1000", CLH);
    op!("1001 0100  1111 1000", CLI);
    op!("1001 0100  1010 1000", CLN);
    op!("1001 0100  1100 1000", CLS);
    op!("1001 0100  1110 1000", CLT);
    op!("1001 0100  1011 1000", CLV);
    op!("1001 0100  1001 1000", CLZ);
    op!("1001 010d  dddd 0000", COM);
    op!("0001 01rd  dddd rrrr", CP);
    op!("0000 01rd  dddd rrrr", CPC);
    op!("0011 KKKK  dddd KKKK", CPI);
    op!("0001 00rd  dddd rrrr", CPSE);
    op!("1001 010d  dddd 1010", DEC);
    op!("1001 0101  0001 1001", EICALL);
    op!("1001 0100  0001 1001", EIJMP);
    op!("1001 0101  1101 1000", ELPM);
    op!("1001 000d  dddd 0110", ELPMZ);
    op!("1001 000d  dddd 0111", ELPMZinc);
    op!("0010 01rd  dddd rrrr", EOR);
    op!("0000 0011  0ddd 1rrr", FMUL);
    op!("0000 0011  1ddd 0rrr", FMULS);
    op!("0000 0011  1ddd 1rrr", FMULSU);
    op!("1001 0101  0000 1001", ICALL);
    op!("1001 0100  0000 1001", IJMP);
    op!("1011 0AAd  dddd AAAA", IN);
    op!("1001 010d  dddd 0011", INC);
    op!("1001 010k  kkkk 110k    kkkk kkkk  kkkk kkkk", JMP);
    op!("1001 000d  dddd 1100", LDX);
    op!("1001 000d  dddd 1101", LDXinc);
    op!("1001 000d  dddd 1110", LDXdec);
    op!("1000 000d  dddd 1000", LDY);
    op!("1001 000d  dddd 1001", LDYinc);
    op!("1001 000d  dddd 1010", LDYdec);
    op!("10q0 qq0d  dddd 1qqq", LDDY);
    op!("1000 000d  dddd 0000", LDZ);
    op!("1001 000d  dddd 0001", LDZinc);
    op!("1001 000d  dddd 0010", LDZdec);
    op!("10q0 qq0d  dddd 0qqq", LDDZ);
    op!("1110 KKKK  dddd KKKK", LDI);
    op!("1001 000d  dddd 0000    kkkk kkkk  kkkk kkkk", LDS);
    op!("1001 0101  1100 1000", LPM);
    op!("1001 000d  dddd 0100", LPMZ);
    op!("1001 000d  dddd 0101", LPMZinc);
    op!("1001 010d  dddd 0110", LSR);
    op!("0010 11rd  dddd rrrr", MOV);
    op!("0000 0001  dddd rrrr", MOVW);
    op!("1001 11rd  dddd rrrr", MUL);
    op!("0000 0010  dddd rrrr", MULS);
    op!("0000 0011  0ddd 0rrr", MULSU);
    op!("1001 010d  dddd 0001", NEG);
    op!("0000 0000  0000 0000", NOP);
    op!("0010 10rd  dddd rrrr", OR);
    op!("0110 KKKK  dddd KKKK", ORI);
    op!("1011 1AAr  rrrr AAAA", OUT);
    op!("1001 000d  dddd 1111", POP);
    op!("1001 001d  dddd 1111", PUSH);
    op!("1101 kkkk  kkkk kkkk", RCALL);
    op!("1001 0101  0000 1000", RET);
    op!("1001 0101  0001 1000", RETI);
    op!("1100 kkkk  kkkk kkkk", RJMP);
    op!("1001 010d  dddd 0111", ROR);
    op!("0000 10rd  dddd rrrr", SBC);
    op!("0100 KKKK  dddd KKKK", SBCI);
    op!("1001 1010  AAAA Abbb", SBI);
    op!("1001 1001  AAAA Abbb", SBIC);
    op!("1001 1011  AAAA Abbb", SBIS);
    op!("1001 0111  KKdd KKKK", SBIW);
    op!("0110 KKKK  dddd KKKK", SBR);
    op!("1111 110r  rrrr 0bbb", SBRC);
    op!("1111 111r  rrrr 0bbb", SBRS);
    op!("1001 0100  0000 1000", SEC);
    op!("1001 0100  0101 1000", SEH);
    op!("1001 0100  0111 1000", SEI);
    op!("1001 0100  0010 1000", SEN);
    op!("1110 1111  dddd 1111", SER);
    op!("1001 0100  0100 1000", SES);
    op!("1001 0100  0110 1000", SET);
    op!("1001 0100  0011 1000", SEV);
    op!("1001 0100  0001 1000", SEZ);
    op!("1001 0101  1000 1000", SLEEP);
    op!("1001 0101  1110 1000", SPM);
    op!("1001 001r  rrrr 1100", STX);
    op!("1001 001r  rrrr 1101", STXinc);
    op!("1001 001r  rrrr 1110", STXdec);
    op!("1000 001r  rrrr 1000", STY);
    op!("1001 001r  rrrr 1001", STYinc);
    op!("1001 001r  rrrr 1010", STYdec);
    op!("10q0 qq1r  rrrr 1qqq", STDY);
    op!("1000 001r  rrrr 0000", STZ);
    op!("1001 001r  rrrr 0001", STZinc);
    op!("1001 001r  rrrr 0010", STZdec);
    op!("10q0 qq1r  rrrr 0qqq", STDZ);
    op!("1001 001d  dddd 0000    kkkk kkkk  kkkk kkkk", STS);
    op!("0001 10rd  dddd rrrr", SUB);
    op!("0101 KKKK  dddd KKKK", SUBI);
    op!("1001 010d  dddd 0010", SWAP);
    op!("1001 0101  1010 1000", WDR);

    if pseudocode {
        for op in [
            ADC, ADD, SUB, SBC, MOV, BRCC, BRCS, BREQ, BRGE, BRHC, BRHS, BRID, BRIE, BRLO,
            BRLT, BRMI, BRNE, BRPL, BRSH, BRTC, BRTS, BRVC, BRVS, OUT, IN, CLI, SEI, RET,
            RETI, ANDI, SUBI, SBCI, SBR, ORI, LDI, LDS, STS, CALL, RCALL, ROR, LSR, EOR,
            SWAP, JMP, RJMP, CPI, ASR, INC, DEC, CP, CPC, CPSE, AND, OR, MUL, SBI, SBIS,
            SBIC, CBI, SER, MOVW, ADIW, LPM, STXinc,
        ] {
            reg.supersede(op, Box::new(PseudoRender));
        }
    }

    reg.finalize();
    reg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtin_patterns_well_formed() {
        let reg = avr_registry(false);
        for t in reg.templates() {
            let symbols: Vec<char> = t.pattern.chars().filter(|c| !c.is_whitespace()).collect();
            assert_eq!(symbols.len() % 8, 0, "{}", t.pattern);
            assert!(
                symbols
                    .iter()
                    .all(|c| *c == '0' || *c == '1' || c.is_ascii_alphabetic()),
                "{}",
                t.pattern
            );
        }
    }

    #[test]
    fn test_finalized_registry_sorted_by_specificity() {
        let reg = avr_registry(false);
        let specs: Vec<usize> = reg.templates().map(|t| t.specificity).collect();
        assert!(specs.windows(2).all(|w| w[0] >= w[1]));
        for t in reg.templates() {
            let literal = t
                .pattern
                .chars()
                .filter(|c| *c == '0' || *c == '1')
                .count();
            assert_eq!(t.specificity, literal);
        }
    }

    #[test]
    fn test_literal_alias_beats_general_template() {
        // 0x9408 is sec, and also bset with s = 0; sec must win on
        // specificity.
        let reg = avr_registry(false);
        let (t, fields) = reg.resolve(&[0x08, 0x94]).unwrap();
        assert_eq!(t.op, Opcode::SEC);
        assert!(fields.is_empty());
    }

    #[test]
    fn test_nop_resolves_with_empty_fields() {
        let reg = avr_registry(false);
        let (t, fields) = reg.resolve(&[0x00, 0x00]).unwrap();
        assert_eq!(t.op, Opcode::NOP);
        assert!(fields.is_empty());
        assert_eq!(t.width(), 2);
    }

    #[test]
    fn test_no_match_on_unused_encoding() {
        let reg = avr_registry(false);
        assert!(reg.resolve(&[0xFF, 0xFF]).is_none());
    }

    #[test]
    fn test_resolution_idempotent() {
        let reg = avr_registry(false);
        let (t1, f1) = reg.resolve(&[0x1E, 0x1F]).unwrap();
        let (t2, f2) = reg.resolve(&[0x1E, 0x1F]).unwrap();
        assert_eq!(t1.op, t2.op);
        assert_eq!(f1.get('d'), f2.get('d'));
        assert_eq!(f1.get('r'), f2.get('r'));
    }

    #[test]
    fn test_32_bit_lds_decodes_address_word() {
        let reg = avr_registry(false);
        let (t, fields) = reg.resolve(&[0x00, 0x90, 0x34, 0x12]).unwrap();
        assert_eq!(t.op, Opcode::LDS);
        assert_eq!(t.width(), 4);
        assert_eq!(fields.get('k'), 0x1234);
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        let mut reg = Registry::new();
        reg.register("0000 00?0  0000 0000", Opcode::WDR, Box::new(AsmRender));
        reg.register("0000 0000  0000 0000", Opcode::NOP, Box::new(AsmRender));
        reg.finalize();
        let (t, _) = reg.resolve(&[0x00, 0x00]).unwrap();
        assert_eq!(t.op, Opcode::NOP);
    }

    #[test]
    fn test_supersede_unknown_is_ignored() {
        let mut reg = Registry::new();
        reg.register("0000 0000  0000 0000", Opcode::NOP, Box::new(AsmRender));
        reg.supersede(Opcode::WDR, Box::new(AsmRender));
        reg.finalize();
        assert_eq!(reg.len(), 1);
    }
}
