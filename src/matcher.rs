// Bit-exact matching of one instruction template against a byte window.
//
// AVR opcodes are written big-endian as 16-bit words but stored
// little-endian in flash. The template's bit index is therefore mapped
// through the owning 16-bit word: bit i of the template is bit (15 - i%16)
// of the word rebuilt from window[2*(i/16)] (low) and window[2*(i/16)+1]
// (high). 32-bit opcodes are two consecutive words treated identically.

/// Scratch map of operand fields extracted during one match attempt.
///
/// Keyed by the field letters actually present in the active template
/// (typically one to three). Must be cleared before every attempt; after a
/// failed attempt the contents are partial and must not be consumed.
pub struct FieldSet {
    slots: Vec<(char, u32)>,
}

impl FieldSet {
    pub fn new() -> Self {
        FieldSet { slots: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Accumulated value for a field letter, 0 if the letter never occurred.
    pub fn get(&self, letter: char) -> u32 {
        self.slots
            .iter()
            .find(|(c, _)| *c == letter)
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }

    /// Shift one bit into a field, leftmost pattern occurrence first, so
    /// earlier occurrences end up in the more significant positions.
    fn push_bit(&mut self, letter: char, bit: u8) {
        match self.slots.iter_mut().find(|(c, _)| *c == letter) {
            Some((_, v)) => *v = (*v << 1) | u32::from(bit),
            None => self.slots.push((letter, u32::from(bit))),
        }
    }
}

/// Bit of the byte window addressed by a template bit index.
pub fn stream_bit(window: &[u8], i: usize) -> u8 {
    let w = i / 16;
    let k = i % 16;
    let word = (u16::from(window[2 * w + 1]) << 8) | u16::from(window[2 * w]);
    ((word >> (15 - k)) & 1) as u8
}

/// Match a stripped template (one symbol per bit) against a byte window,
/// accumulating field bits into `fields` as a side effect.
///
/// `fields` is cleared first regardless of prior contents. Returns false as
/// soon as a literal bit disagrees; `fields` is then partial.
pub fn match_template(symbols: &[char], window: &[u8], fields: &mut FieldSet) -> bool {
    fields.clear();

    if window.len() * 8 < symbols.len() {
        return false;
    }

    for (i, &sym) in symbols.iter().enumerate() {
        let bit = stream_bit(window, i);
        match sym {
            '0' => {
                if bit != 0 {
                    return false;
                }
            }
            '1' => {
                if bit != 1 {
                    return false;
                }
            }
            letter => fields.push_bit(letter, bit),
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(pattern: &str) -> Vec<char> {
        pattern.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_stream_bit_word_order() {
        // Word 0b1000_0000_0000_0001 stored little-endian: low byte first.
        let window = [0x01, 0x80];
        assert_eq!(stream_bit(&window, 0), 1);
        assert_eq!(stream_bit(&window, 15), 1);
        for i in 1..15 {
            assert_eq!(stream_bit(&window, i), 0);
        }
    }

    #[test]
    fn test_all_zero_window_matches_nop() {
        let tpl = symbols("0000 0000  0000 0000");
        let mut fields = FieldSet::new();
        assert!(match_template(&tpl, &[0x00, 0x00], &mut fields));
        assert!(fields.is_empty());
    }

    #[test]
    fn test_field_extraction_msb_first() {
        // adc r17, r30: d=17 (0b10001), r=30 (0b11110).
        // Pattern 0001 11rd dddd rrrr fills to 0001 1111 0001 1110 =
        // 0x1F1E, stored little-endian as [0x1E, 0x1F].
        let tpl = symbols("0001 11rd  dddd rrrr");
        let mut fields = FieldSet::new();
        assert!(match_template(&tpl, &[0x1E, 0x1F], &mut fields));
        assert_eq!(fields.get('d'), 17);
        assert_eq!(fields.get('r'), 30);
    }

    #[test]
    fn test_literal_mismatch_fails() {
        let tpl = symbols("0000 0000  0000 0000");
        let mut fields = FieldSet::new();
        assert!(!match_template(&tpl, &[0x01, 0x00], &mut fields));
    }

    #[test]
    fn test_fieldset_cleared_between_attempts() {
        let tpl = symbols("0001 11rd  dddd rrrr");
        let mut fields = FieldSet::new();
        assert!(match_template(&tpl, &[0x1E, 0x1F], &mut fields));
        // A second, failing attempt must not leak the old values on the
        // next successful one.
        let nop = symbols("0000 0000  0000 0000");
        assert!(!match_template(&nop, &[0x1E, 0x1F], &mut fields));
        assert!(match_template(&tpl, &[0x1E, 0x1F], &mut fields));
        assert_eq!(fields.get('d'), 17);
        assert_eq!(fields.get('r'), 30);
    }

    #[test]
    fn test_idempotent_resolution() {
        let tpl = symbols("0001 11rd  dddd rrrr");
        let mut a = FieldSet::new();
        let mut b = FieldSet::new();
        assert!(match_template(&tpl, &[0x1E, 0x1F], &mut a));
        assert!(match_template(&tpl, &[0x1E, 0x1F], &mut b));
        assert_eq!(a.get('d'), b.get('d'));
        assert_eq!(a.get('r'), b.get('r'));
    }

    #[test]
    fn test_short_window_fails() {
        let tpl = symbols("1001 010k  kkkk 111k    kkkk kkkk  kkkk kkkk");
        let mut fields = FieldSet::new();
        assert!(!match_template(&tpl, &[0x0E, 0x94], &mut fields));
    }

    #[test]
    fn test_32_bit_template() {
        // call 0x0100 (word address 0x80): 1001 010k kkkk 111k + k16
        // first word k bits all 0 => 0x940E, second word 0x0080.
        let tpl = symbols("1001 010k  kkkk 111k    kkkk kkkk  kkkk kkkk");
        let mut fields = FieldSet::new();
        assert!(match_template(&tpl, &[0x0E, 0x94, 0x80, 0x00], &mut fields));
        assert_eq!(fields.get('k'), 0x80);
    }
}
