// I/O register names and usage tracking.
//
// The discovery pass records every I/O address touched by in/out/sbi/cbi
// style instructions; the avr-gcc output style prints a summary banner of
// the registers used before the first instruction.

use std::collections::HashMap;

use lazy_static::lazy_static;

lazy_static! {
    /// Classic AVR (ATmega8 family) I/O space, 0x00..=0x3f.
    static ref IO_REGISTER_NAMES: HashMap<u8, &'static str> = HashMap::from([
        (0x00, "TWBR"),
        (0x01, "TWSR"),
        (0x02, "TWAR"),
        (0x03, "TWDR"),
        (0x04, "ADCL"),
        (0x05, "ADCH"),
        (0x06, "ADCSRA"),
        (0x07, "ADMUX"),
        (0x08, "ACSR"),
        (0x09, "UBRRL"),
        (0x0a, "UCSRB"),
        (0x0b, "UCSRA"),
        (0x0c, "UDR"),
        (0x0d, "SPCR"),
        (0x0e, "SPSR"),
        (0x0f, "SPDR"),
        (0x10, "PIND"),
        (0x11, "DDRD"),
        (0x12, "PORTD"),
        (0x13, "PINC"),
        (0x14, "DDRC"),
        (0x15, "PORTC"),
        (0x16, "PINB"),
        (0x17, "DDRB"),
        (0x18, "PORTB"),
        (0x1c, "EECR"),
        (0x1d, "EEDR"),
        (0x1e, "EEARL"),
        (0x1f, "EEARH"),
        (0x20, "UCSRC"),
        (0x21, "WDTCR"),
        (0x22, "ASSR"),
        (0x23, "OCR2"),
        (0x24, "TCNT2"),
        (0x25, "TCCR2"),
        (0x26, "ICR1L"),
        (0x27, "ICR1H"),
        (0x28, "OCR1BL"),
        (0x29, "OCR1BH"),
        (0x2a, "OCR1AL"),
        (0x2b, "OCR1AH"),
        (0x2c, "TCNT1L"),
        (0x2d, "TCNT1H"),
        (0x2e, "TCCR1B"),
        (0x2f, "TCCR1A"),
        (0x30, "SFIOR"),
        (0x31, "OSCCAL"),
        (0x32, "TCNT0"),
        (0x33, "TCCR0"),
        (0x34, "MCUCSR"),
        (0x35, "MCUCR"),
        (0x36, "TWCR"),
        (0x37, "SPMCR"),
        (0x38, "TIFR"),
        (0x39, "TIMSK"),
        (0x3a, "GIFR"),
        (0x3b, "GICR"),
        (0x3d, "SPL"),
        (0x3e, "SPH"),
        (0x3f, "SREG"),
    ]);
}

/// Name of an I/O register, if the address is in the builtin table.
pub fn register_name(index: u8) -> Option<&'static str> {
    IO_REGISTER_NAMES.get(&index).copied()
}

pub struct IoRegUsage {
    used: [bool; 64],
}

impl IoRegUsage {
    pub fn new() -> Self {
        IoRegUsage { used: [false; 64] }
    }

    pub fn record_usage(&mut self, index: u8) {
        if usize::from(index) < self.used.len() {
            self.used[usize::from(index)] = true;
        }
    }

    /// Summary banner of every register recorded so far, as comment lines.
    /// Empty string if nothing was recorded.
    pub fn emit_summary(&self) -> String {
        let mut out = String::new();
        for (i, used) in self.used.iter().enumerate() {
            if !used {
                continue;
            }
            if out.is_empty() {
                out.push_str("; I/O registers used:\n");
            }
            match register_name(i as u8) {
                Some(name) => out.push_str(&format!(";   0x{:02x}: {}\n", i, name)),
                None => out.push_str(&format!(";   0x{:02x}\n", i)),
            }
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_names() {
        assert_eq!(register_name(0x3f), Some("SREG"));
        assert_eq!(register_name(0x18), Some("PORTB"));
        assert_eq!(register_name(0x3c), None);
    }

    #[test]
    fn test_summary_lists_recorded() {
        let mut usage = IoRegUsage::new();
        assert_eq!(usage.emit_summary(), "");
        usage.record_usage(0x3f);
        usage.record_usage(0x3c);
        let banner = usage.emit_summary();
        assert!(banner.contains("0x3f: SREG"));
        assert!(banner.contains(";   0x3c\n"));
    }
}
