use crate::error::Error;
use crate::inst::Inst;
use crate::label::SymbolTable;

/// Exactly 32 `0`/`1` characters, most significant bit first.
pub fn parse_word(line: &str) -> Result<u32, Error> {
    let line = line.trim();
    if line.len() != 32 || !line.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(Error::MalformedWord(line.to_string()));
    }
    u32::from_str_radix(line, 2).map_err(|_| Error::MalformedWord(line.to_string()))
}

/// Binary-text line at address `pc` back to its assembly line.
pub fn decode_line(line: &str, pc: u32, labels: &SymbolTable) -> Result<String, Error> {
    let word = parse_word(line)?;
    let inst = Inst::decode(word)?;
    Ok(inst.render(pc, labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode_line, format_word};
    use crate::BASE_ADDR;

    #[test]
    fn word_parsing() {
        assert_eq!(parse_word(&format_word(0x2008_0005)), Ok(0x2008_0005));
        assert_eq!(parse_word("00100000000010000000000000000101\n"), Ok(0x2008_0005));
        // 31 and 33 characters
        assert!(matches!(
            parse_word(&"0".repeat(31)),
            Err(Error::MalformedWord(_))
        ));
        assert!(matches!(
            parse_word(&"0".repeat(33)),
            Err(Error::MalformedWord(_))
        ));
        assert!(matches!(
            parse_word("0010000000001000000000000000010X"),
            Err(Error::MalformedWord(_))
        ));
        assert!(matches!(
            parse_word(crate::SENTINEL),
            Err(Error::MalformedWord(_))
        ));
    }

    #[test]
    fn renders_li_for_zero_base_addi() {
        let labels = SymbolTable::new();
        let line = decode_line(&format_word(0x2008_0005), BASE_ADDR, &labels).unwrap();
        assert_eq!(line, "li $t0, 5");
        let line = decode_line(&format_word(0x2128_0005), BASE_ADDR, &labels).unwrap();
        assert_eq!(line, "addi $t0, $t1, 5");
        // all-ones immediate comes back signed
        let line = decode_line(&format_word(0x2009_FFFF), BASE_ADDR, &labels).unwrap();
        assert_eq!(line, "li $t1, -1");
    }

    #[test]
    fn sign_extension_boundaries() {
        let labels = SymbolTable::new();
        assert_eq!(
            decode_line(&format_word(0x2008_7FFF), BASE_ADDR, &labels).unwrap(),
            "li $t0, 32767"
        );
        assert_eq!(
            decode_line(&format_word(0x2008_8000), BASE_ADDR, &labels).unwrap(),
            "li $t0, -32768"
        );
    }

    #[test]
    fn unknown_word_fails_closed() {
        let labels = SymbolTable::new();
        assert_eq!(
            decode_line(&format_word(0xFC00_0000), BASE_ADDR, &labels),
            Err(Error::UnknownInstruction(0xFC00_0000))
        );
    }

    #[test]
    fn source_roundtrips_through_words() {
        let mut labels = SymbolTable::new();
        labels.define("Loop", BASE_ADDR).unwrap();
        let lines = [
            "li $t0, 5",
            "add $t0, $t1, $t2",
            "lw $t0, -4($sp)",
            "bne $t0, $t1, Loop",
            "jr $ra",
            "syscall",
        ];
        let mut pc = BASE_ADDR;
        for line in lines {
            let words = encode_line(line, pc, &labels).unwrap();
            assert_eq!(words.len(), 1);
            let rendered = decode_line(&format_word(words[0]), pc, &labels).unwrap();
            assert_eq!(rendered, line);
            pc += 4;
        }
    }
}
