// Canonical opcode identity table for the AVR instruction set.
//
// Every opcode known to the disassembler has one entry in OPCODE_INFO,
// indexed by its Opcode discriminant. The registry and renderers key
// everything off Opcode; the table supplies the mnemonic text and the
// cycle-count annotation for the optional cycles column.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    ADC,
    ADD,
    ADIW,
    AND,
    ANDI,
    ASR,
    BCLR,
    BLD,
    BRBC,
    BRBS,
    BRCC,
    BRCS,
    BREAK,
    BREQ,
    BRGE,
    BRHC,
    BRHS,
    BRID,
    BRIE,
    BRLO,
    BRLT,
    BRMI,
    BRNE,
    BRPL,
    BRSH,
    BRTC,
    BRTS,
    BRVC,
    BRVS,
    BSET,
    BST,
    CALL,
    CBI,
    CLC,
    CLH,
    CLI,
    CLN,
    CLS,
    CLT,
    CLV,
    CLZ,
    COM,
    CP,
    CPC,
    CPI,
    CPSE,
    DEC,
    EICALL,
    EIJMP,
    ELPM,
    ELPMZ,
    ELPMZinc,
    EOR,
    FMUL,
    FMULS,
    FMULSU,
    ICALL,
    IJMP,
    IN,
    INC,
    JMP,
    LDX,
    LDXinc,
    LDXdec,
    LDY,
    LDYinc,
    LDYdec,
    LDDY,
    LDZ,
    LDZinc,
    LDZdec,
    LDDZ,
    LDI,
    LDS,
    LPM,
    LPMZ,
    LPMZinc,
    LSR,
    MOV,
    MOVW,
    MUL,
    MULS,
    MULSU,
    NEG,
    NOP,
    OR,
    ORI,
    OUT,
    POP,
    PUSH,
    RCALL,
    RET,
    RETI,
    RJMP,
    ROR,
    SBC,
    SBCI,
    SBI,
    SBIC,
    SBIS,
    SBIW,
    SBR,
    SBRC,
    SBRS,
    SEC,
    SEH,
    SEI,
    SEN,
    SER,
    SES,
    SET,
    SEV,
    SEZ,
    SLEEP,
    SPM,
    STX,
    STXinc,
    STXdec,
    STY,
    STYinc,
    STYdec,
    STDY,
    STZ,
    STZinc,
    STZdec,
    STDZ,
    STS,
    SUB,
    SUBI,
    SWAP,
    WDR,
}

pub struct OpcodeInfo {
    pub op: Opcode,
    pub name: &'static str,
    pub clocks: &'static str,
}

// One row per Opcode discriminant, in discriminant order. The entry point
// refuses to run if this ever gets out of step (see table_consistent).
pub static OPCODE_INFO: &[OpcodeInfo] = &[
    OpcodeInfo { op: Opcode::ADC, name: "adc", clocks: "1" },
    OpcodeInfo { op: Opcode::ADD, name: "add", clocks: "1" },
    OpcodeInfo { op: Opcode::ADIW, name: "adiw", clocks: "2" },
    OpcodeInfo { op: Opcode::AND, name: "and", clocks: "1" },
    OpcodeInfo { op: Opcode::ANDI, name: "andi", clocks: "1" },
    OpcodeInfo { op: Opcode::ASR, name: "asr", clocks: "1" },
    OpcodeInfo { op: Opcode::BCLR, name: "bclr", clocks: "1" },
    OpcodeInfo { op: Opcode::BLD, name: "bld", clocks: "1" },
    OpcodeInfo { op: Opcode::BRBC, name: "brbc", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRBS, name: "brbs", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRCC, name: "brcc", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRCS, name: "brcs", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BREAK, name: "break", clocks: "1" },
    OpcodeInfo { op: Opcode::BREQ, name: "breq", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRGE, name: "brge", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRHC, name: "brhc", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRHS, name: "brhs", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRID, name: "brid", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRIE, name: "brie", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRLO, name: "brlo", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRLT, name: "brlt", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRMI, name: "brmi", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRNE, name: "brne", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRPL, name: "brpl", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRSH, name: "brsh", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRTC, name: "brtc", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRTS, name: "brts", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRVC, name: "brvc", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BRVS, name: "brvs", clocks: "1/2" },
    OpcodeInfo { op: Opcode::BSET, name: "bset", clocks: "1" },
    OpcodeInfo { op: Opcode::BST, name: "bst", clocks: "1" },
    OpcodeInfo { op: Opcode::CALL, name: "call", clocks: "4" },
    OpcodeInfo { op: Opcode::CBI, name: "cbi", clocks: "2" },
    OpcodeInfo { op: Opcode::CLC, name: "clc", clocks: "1" },
    OpcodeInfo { op: Opcode::CLH, name: "clh", clocks: "1" },
    OpcodeInfo { op: Opcode::CLI, name: "cli", clocks: "1" },
    OpcodeInfo { op: Opcode::CLN, name: "cln", clocks: "1" },
    OpcodeInfo { op: Opcode::CLS, name: "cls", clocks: "1" },
    OpcodeInfo { op: Opcode::CLT, name: "clt", clocks: "1" },
    OpcodeInfo { op: Opcode::CLV, name: "clv", clocks: "1" },
    OpcodeInfo { op: Opcode::CLZ, name: "clz", clocks: "1" },
    OpcodeInfo { op: Opcode::COM, name: "com", clocks: "1" },
    OpcodeInfo { op: Opcode::CP, name: "cp", clocks: "1" },
    OpcodeInfo { op: Opcode::CPC, name: "cpc", clocks: "1" },
    OpcodeInfo { op: Opcode::CPI, name: "cpi", clocks: "1" },
    OpcodeInfo { op: Opcode::CPSE, name: "cpse", clocks: "1/2/3" },
    OpcodeInfo { op: Opcode::DEC, name: "dec", clocks: "1" },
    OpcodeInfo { op: Opcode::EICALL, name: "eicall", clocks: "4" },
    OpcodeInfo { op: Opcode::EIJMP, name: "eijmp", clocks: "2" },
    OpcodeInfo { op: Opcode::ELPM, name: "elpm", clocks: "3" },
    OpcodeInfo { op: Opcode::ELPMZ, name: "elpm", clocks: "3" },
    OpcodeInfo { op: Opcode::ELPMZinc, name: "elpm", clocks: "3" },
    OpcodeInfo { op: Opcode::EOR, name: "eor", clocks: "1" },
    OpcodeInfo { op: Opcode::FMUL, name: "fmul", clocks: "2" },
    OpcodeInfo { op: Opcode::FMULS, name: "fmuls", clocks: "2" },
    OpcodeInfo { op: Opcode::FMULSU, name: "fmulsu", clocks: "2" },
    OpcodeInfo { op: Opcode::ICALL, name: "icall", clocks: "3" },
    OpcodeInfo { op: Opcode::IJMP, name: "ijmp", clocks: "2" },
    OpcodeInfo { op: Opcode::IN, name: "in", clocks: "1" },
    OpcodeInfo { op: Opcode::INC, name: "inc", clocks: "1" },
    OpcodeInfo { op: Opcode::JMP, name: "jmp", clocks: "3" },
    OpcodeInfo { op: Opcode::LDX, name: "ld", clocks: "2" },
    OpcodeInfo { op: Opcode::LDXinc, name: "ld", clocks: "2" },
    OpcodeInfo { op: Opcode::LDXdec, name: "ld", clocks: "2" },
    OpcodeInfo { op: Opcode::LDY, name: "ld", clocks: "2" },
    OpcodeInfo { op: Opcode::LDYinc, name: "ld", clocks: "2" },
    OpcodeInfo { op: Opcode::LDYdec, name: "ld", clocks: "2" },
    OpcodeInfo { op: Opcode::LDDY, name: "ldd", clocks: "2" },
    OpcodeInfo { op: Opcode::LDZ, name: "ld", clocks: "2" },
    OpcodeInfo { op: Opcode::LDZinc, name: "ld", clocks: "2" },
    OpcodeInfo { op: Opcode::LDZdec, name: "ld", clocks: "2" },
    OpcodeInfo { op: Opcode::LDDZ, name: "ldd", clocks: "2" },
    OpcodeInfo { op: Opcode::LDI, name: "ldi", clocks: "1" },
    OpcodeInfo { op: Opcode::LDS, name: "lds", clocks: "2" },
    OpcodeInfo { op: Opcode::LPM, name: "lpm", clocks: "3" },
    OpcodeInfo { op: Opcode::LPMZ, name: "lpm", clocks: "3" },
    OpcodeInfo { op: Opcode::LPMZinc, name: "lpm", clocks: "3" },
    OpcodeInfo { op: Opcode::LSR, name: "lsr", clocks: "1" },
    OpcodeInfo { op: Opcode::MOV, name: "mov", clocks: "1" },
    OpcodeInfo { op: Opcode::MOVW, name: "movw", clocks: "1" },
    OpcodeInfo { op: Opcode::MUL, name: "mul", clocks: "2" },
    OpcodeInfo { op: Opcode::MULS, name: "muls", clocks: "2" },
    OpcodeInfo { op: Opcode::MULSU, name: "mulsu", clocks: "2" },
    OpcodeInfo { op: Opcode::NEG, name: "neg", clocks: "1" },
    OpcodeInfo { op: Opcode::NOP, name: "nop", clocks: "1" },
    OpcodeInfo { op: Opcode::OR, name: "or", clocks: "1" },
    OpcodeInfo { op: Opcode::ORI, name: "ori", clocks: "1" },
    OpcodeInfo { op: Opcode::OUT, name: "out", clocks: "1" },
    OpcodeInfo { op: Opcode::POP, name: "pop", clocks: "2" },
    OpcodeInfo { op: Opcode::PUSH, name: "push", clocks: "2" },
    OpcodeInfo { op: Opcode::RCALL, name: "rcall", clocks: "3" },
    OpcodeInfo { op: Opcode::RET, name: "ret", clocks: "4" },
    OpcodeInfo { op: Opcode::RETI, name: "reti", clocks: "4" },
    OpcodeInfo { op: Opcode::RJMP, name: "rjmp", clocks: "2" },
    OpcodeInfo { op: Opcode::ROR, name: "ror", clocks: "1" },
    OpcodeInfo { op: Opcode::SBC, name: "sbc", clocks: "1" },
    OpcodeInfo { op: Opcode::SBCI, name: "sbci", clocks: "1" },
    OpcodeInfo { op: Opcode::SBI, name: "sbi", clocks: "2" },
    OpcodeInfo { op: Opcode::SBIC, name: "sbic", clocks: "1/2/3" },
    OpcodeInfo { op: Opcode::SBIS, name: "sbis", clocks: "1/2/3" },
    OpcodeInfo { op: Opcode::SBIW, name: "sbiw", clocks: "2" },
    OpcodeInfo { op: Opcode::SBR, name: "sbr", clocks: "1" },
    OpcodeInfo { op: Opcode::SBRC, name: "sbrc", clocks: "1/2/3" },
    OpcodeInfo { op: Opcode::SBRS, name: "sbrs", clocks: "1/2/3" },
    OpcodeInfo { op: Opcode::SEC, name: "sec", clocks: "1" },
    OpcodeInfo { op: Opcode::SEH, name: "seh", clocks: "1" },
    OpcodeInfo { op: Opcode::SEI, name: "sei", clocks: "1" },
    OpcodeInfo { op: Opcode::SEN, name: "sen", clocks: "1" },
    OpcodeInfo { op: Opcode::SER, name: "ser", clocks: "1" },
    OpcodeInfo { op: Opcode::SES, name: "ses", clocks: "1" },
    OpcodeInfo { op: Opcode::SET, name: "set", clocks: "1" },
    OpcodeInfo { op: Opcode::SEV, name: "sev", clocks: "1" },
    OpcodeInfo { op: Opcode::SEZ, name: "sez", clocks: "1" },
    OpcodeInfo { op: Opcode::SLEEP, name: "sleep", clocks: "1" },
    OpcodeInfo { op: Opcode::SPM, name: "spm", clocks: "-" },
    OpcodeInfo { op: Opcode::STX, name: "st", clocks: "2" },
    OpcodeInfo { op: Opcode::STXinc, name: "st", clocks: "2" },
    OpcodeInfo { op: Opcode::STXdec, name: "st", clocks: "2" },
    OpcodeInfo { op: Opcode::STY, name: "st", clocks: "2" },
    OpcodeInfo { op: Opcode::STYinc, name: "st", clocks: "2" },
    OpcodeInfo { op: Opcode::STYdec, name: "st", clocks: "2" },
    OpcodeInfo { op: Opcode::STDY, name: "std", clocks: "2" },
    OpcodeInfo { op: Opcode::STZ, name: "st", clocks: "2" },
    OpcodeInfo { op: Opcode::STZinc, name: "st", clocks: "2" },
    OpcodeInfo { op: Opcode::STZdec, name: "st", clocks: "2" },
    OpcodeInfo { op: Opcode::STDZ, name: "std", clocks: "2" },
    OpcodeInfo { op: Opcode::STS, name: "sts", clocks: "2" },
    OpcodeInfo { op: Opcode::SUB, name: "sub", clocks: "1" },
    OpcodeInfo { op: Opcode::SUBI, name: "subi", clocks: "1" },
    OpcodeInfo { op: Opcode::SWAP, name: "swap", clocks: "1" },
    OpcodeInfo { op: Opcode::WDR, name: "wdr", clocks: "1" },
];

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        OPCODE_INFO[self as usize].name
    }

    pub fn clocks(self) -> &'static str {
        OPCODE_INFO[self as usize].clocks
    }
}

/// Startup self-check: every table row must sit at its own discriminant.
/// A mismatch means the table itself is broken and decoding cannot be
/// trusted, so the caller aborts the run.
pub fn table_consistent() -> bool {
    OPCODE_INFO.iter().enumerate().all(|(i, info)| info.op as usize == i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_consistent() {
        assert!(table_consistent());
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Opcode::NOP.mnemonic(), "nop");
        assert_eq!(Opcode::LDXinc.mnemonic(), "ld");
        assert_eq!(Opcode::STDZ.mnemonic(), "std");
        assert_eq!(Opcode::CALL.clocks(), "4");
    }
}
