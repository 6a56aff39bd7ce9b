// Tagfile support: externally supplied classification of byte ranges as
// data rather than code. Consulted before decoding at every position; a
// hit emits the data rows and tells the orchestrator how many bytes to
// skip.
//
// Format, one tag per line ('#' starts a comment):
//   0xADDR B <count> [name]   count data bytes
//   0xADDR W <count> [name]   count 16-bit words
//   0xADDR S <count> [name]   count ASCII characters

use std::fs;
use std::path::Path;

use regex::Regex;

enum DataKind {
    Byte,
    Word,
    Ascii,
}

struct DataTag {
    address: usize,
    kind: DataKind,
    count: usize,
    name: Option<String>,
}

pub struct Tagfile {
    tags: Vec<DataTag>,
}

impl Tagfile {
    pub fn load(path: &Path) -> Result<Tagfile, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("couldn't open {}: {}", path.display(), e))?;
        Tagfile::parse(&text).map_err(|e| format!("{}: {}", path.display(), e))
    }

    pub fn parse(text: &str) -> Result<Tagfile, String> {
        let re_tag = Regex::new("^0[xX]([0-9A-Fa-f]+)\\s+([BWS])\\s+([0-9]+)(?:\\s+(\\S+))?$").unwrap();

        let mut tags = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let caps = re_tag
                .captures(line)
                .ok_or_else(|| format!("bad tag on line {}: '{}'", lineno + 1, line))?;
            tags.push(DataTag {
                address: usize::from_str_radix(&caps[1], 16)
                    .map_err(|e| format!("bad address on line {}: {}", lineno + 1, e))?,
                kind: match &caps[2] {
                    "B" => DataKind::Byte,
                    "W" => DataKind::Word,
                    _ => DataKind::Ascii,
                },
                count: caps[3]
                    .parse()
                    .map_err(|e| format!("bad count on line {}: {}", lineno + 1, e))?,
                name: caps.get(4).map(|m| m.as_str().to_string()),
            });
        }
        Ok(Tagfile { tags })
    }

    /// Number of pre-declared data bytes at `pos`, 0 if the position is not
    /// tagged. Emits the data rows into `out` as a side effect.
    pub fn process_data(&self, bytes: &[u8], pos: usize, out: &mut String) -> usize {
        let tag = match self.tags.iter().find(|t| t.address == pos) {
            Some(tag) => tag,
            None => return 0,
        };

        let width = match tag.kind {
            DataKind::Word => 2,
            _ => 1,
        };
        let consumed = (tag.count * width).min(bytes.len() - pos);
        if consumed == 0 {
            return 0;
        }
        let data = &bytes[pos..pos + consumed];

        if let Some(name) = &tag.name {
            out.push_str(&format!("{}:\n", name));
        }
        match tag.kind {
            DataKind::Byte => {
                for row in data.chunks(8) {
                    let items: Vec<String> = row.iter().map(|b| format!("0x{:02x}", b)).collect();
                    out.push_str(&format!(".byte {}\n", items.join(", ")));
                }
            }
            DataKind::Word => {
                for row in data.chunks(8) {
                    let items: Vec<String> = row
                        .chunks(2)
                        .map(|w| {
                            let lo = w[0];
                            let hi = if w.len() > 1 { w[1] } else { 0 };
                            format!("0x{:02x}{:02x}", hi, lo)
                        })
                        .collect();
                    out.push_str(&format!(".word {}\n", items.join(", ")));
                }
            }
            DataKind::Ascii => {
                let mut text = String::new();
                for &b in data {
                    if (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\' {
                        text.push(b as char);
                    } else {
                        text.push_str(&format!("\\x{:02x}", b));
                    }
                }
                out.push_str(&format!(".ascii \"{}\"\n", text));
            }
        }
        consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_classify() {
        let tf = Tagfile::parse("# table\n0x0002 B 4 lut\n0x0008 W 2\n").unwrap();
        let bytes = [0u8, 0, 0x11, 0x22, 0x33, 0x44, 0, 0, 0xcd, 0xab, 0x34, 0x12];

        assert_eq!(tf.process_data(&bytes, 0, &mut String::new()), 0);

        let mut out = String::new();
        assert_eq!(tf.process_data(&bytes, 2, &mut out), 4);
        assert!(out.contains("lut:"));
        assert!(out.contains(".byte 0x11, 0x22, 0x33, 0x44"));

        out.clear();
        assert_eq!(tf.process_data(&bytes, 8, &mut out), 4);
        assert!(out.contains(".word 0xabcd, 0x1234"));
    }

    #[test]
    fn test_bad_line_rejected() {
        assert!(Tagfile::parse("0x0002 Q 4\n").is_err());
        assert!(Tagfile::parse("garbage\n").is_err());
    }

    #[test]
    fn test_count_clamped_to_input() {
        let tf = Tagfile::parse("0x0000 B 100\n").unwrap();
        let bytes = [1u8, 2, 3];
        let mut out = String::new();
        assert_eq!(tf.process_data(&bytes, 0, &mut out), 3);
    }
}
