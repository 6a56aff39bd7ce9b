// Firmware image loading. Files with a .hex extension are parsed as
// Intel HEX; anything else is taken as a raw binary flash dump. Gaps
// between hex records read as 0xff, matching erased flash.

use std::fs;
use std::path::Path;

use ihex::Reader;
use ihex::Record;

pub fn load(path: &Path) -> Result<Vec<u8>, String> {
    let is_hex = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("hex"))
        .unwrap_or(false);

    if is_hex {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("couldn't read {}: {}", path.display(), e))?;
        parse_hex(&text).map_err(|e| format!("{}: {}", path.display(), e))
    } else {
        fs::read(path).map_err(|e| format!("couldn't read {}: {}", path.display(), e))
    }
}

fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    let mut image: Vec<u8> = Vec::new();
    for record in Reader::new(text) {
        let record = record.map_err(|e| format!("bad hex record: {}", e))?;
        if let Record::Data { offset, value } = record {
            let offset = usize::from(offset);
            let end = offset + value.len();
            if image.len() < end {
                image.resize(end, 0xff);
            }
            image[offset..end].copy_from_slice(&value);
        }
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_data_record() {
        let image = parse_hex(":020000000000FE\n:00000001FF\n").unwrap();
        assert_eq!(image, vec![0x00, 0x00]);
    }

    #[test]
    fn test_parse_hex_gap_reads_as_erased() {
        let image = parse_hex(":0100040012E9\n:00000001FF\n").unwrap();
        assert_eq!(image.len(), 5);
        assert_eq!(image[0], 0xff);
        assert_eq!(image[2], 0xff);
        assert_eq!(image[4], 0x12);
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex(":02000000XXXXFE\n").is_err());
    }
}
