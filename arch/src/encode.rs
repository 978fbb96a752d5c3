use crate::error::Error;
use crate::inst::Inst;
use crate::label::SymbolTable;
use crate::op::{Arg, OpKind};
use crate::reg::Reg;

/// Drops everything after `#` and trims.
pub fn strip_comment(line: &str) -> &str {
    match line.split_once('#') {
        Some((code, _)) => code.trim(),
        None => line.trim(),
    }
}

/// A line of the form `Name:` defines a label at the current address.
pub fn label_def(line: &str) -> Option<&str> {
    let name = strip_comment(line).strip_suffix(':')?;
    if name.is_empty() || name.contains(char::is_whitespace) || name.contains(':') {
        return None;
    }
    Some(name)
}

/// Words this line will occupy. Pass 1 and Pass 2 must agree on this
/// even for lines that later fail to encode, so an unparsable
/// instruction still counts as one (its sentinel line).
pub fn line_width(line: &str) -> u32 {
    let line = strip_comment(line);
    if line.is_empty() || label_def(line).is_some() {
        return 0;
    }
    let mnemonic = line.split_whitespace().next().unwrap_or(line);
    match OpKind::parse(mnemonic) {
        Ok(kind) => kind.words(),
        Err(_) => 1,
    }
}

/// Integer literal with an optional sign and `0x`/`0o`/`0b` radix prefix.
pub fn parse_int(token: &str) -> Option<i64> {
    let (neg, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let (radix, digits) = if let Some(d) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (16, d)
    } else if let Some(d) = body.strip_prefix("0o").or_else(|| body.strip_prefix("0O")) {
        (8, d)
    } else if let Some(d) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        (2, d)
    } else {
        (10, body)
    };
    let value = i64::from_str_radix(digits, radix).ok()?;
    Some(if neg { -value } else { value })
}

fn imm16(token: &str) -> Result<i16, Error> {
    let value = parse_int(token).ok_or_else(|| Error::BadImmediate(token.to_string()))?;
    i16::try_from(value).map_err(|_| Error::ImmediateOutOfRange(value))
}

fn uimm16(token: &str) -> Result<u16, Error> {
    let value = parse_int(token).ok_or_else(|| Error::BadImmediate(token.to_string()))?;
    u16::try_from(value).map_err(|_| Error::ImmediateOutOfRange(value))
}

/// `offset($base)`, e.g. `-4($sp)`.
fn mem_operand(token: &str) -> Result<(i16, Reg), Error> {
    let err = || Error::BadMemoryOperand(token.to_string());
    let (off_str, rest) = token.split_once('(').ok_or_else(err)?;
    let base_str = rest.strip_suffix(')').ok_or_else(err)?.trim();
    let off = parse_int(off_str).ok_or_else(err)?;
    let off = i16::try_from(off).map_err(|_| Error::ImmediateOutOfRange(off))?;
    let base = Reg::parse(base_str)?;
    Ok((off, base))
}

/// Branch/jump/la target: numeric address first, then label.
fn target_addr(token: &str, labels: &SymbolTable) -> Result<u32, Error> {
    if let Some(value) = parse_int(token) {
        return u32::try_from(value).map_err(|_| Error::BadImmediate(token.to_string()));
    }
    labels
        .resolve(token)
        .ok_or_else(|| Error::UndefinedLabel(token.to_string()))
}

fn aligned(addr: u32) -> Result<u32, Error> {
    if addr % 4 != 0 {
        return Err(Error::MisalignedTarget(addr));
    }
    Ok(addr)
}

/// Word offset from the delay-slot address, pc+4.
fn branch_offset(target: u32, pc: u32) -> Result<i16, Error> {
    let diff = (i64::from(target) - i64::from(pc) - 4) / 4;
    i16::try_from(diff).map_err(|_| Error::ImmediateOutOfRange(diff))
}

fn jump_field(target: u32) -> Result<u32, Error> {
    if target >= 1 << 28 {
        return Err(Error::AddressOverflow(target));
    }
    Ok(target >> 2)
}

/// A parsed operand, tagged with the role the catalog assigned it.
#[derive(Debug, Clone, Copy)]
enum Operand {
    R(Reg),
    Imm(i16),
    UImm(u16),
    Mem(i16, Reg),
    Target(u32),
}

fn parse_operand(role: Arg, token: &str, labels: &SymbolTable) -> Result<Operand, Error> {
    match role {
        Arg::RD | Arg::RS | Arg::RT => Ok(Operand::R(Reg::parse(token)?)),
        Arg::IMM => Ok(Operand::Imm(imm16(token)?)),
        Arg::UIMM => Ok(Operand::UImm(uimm16(token)?)),
        Arg::MEM => {
            let (off, base) = mem_operand(token)?;
            Ok(Operand::Mem(off, base))
        }
        Arg::TARGET => Ok(Operand::Target(aligned(target_addr(token, labels)?)?)),
    }
}

/// Translates one source line into its word(s). Blank and label-only
/// lines produce nothing; `la` produces two words. Operand parsing is
/// driven by the catalog's role list, so each mnemonic arm only maps
/// already-typed operands onto its instruction fields.
pub fn encode_line(line: &str, pc: u32, labels: &SymbolTable) -> Result<Vec<u32>, Error> {
    let line = strip_comment(line);
    if line.is_empty() || label_def(line).is_some() {
        return Ok(vec![]);
    }
    let text = line.replace(',', " ");
    let mut tokens = text.split_whitespace();
    let mnemonic = tokens.next().unwrap_or(line);
    let kind = OpKind::parse(mnemonic)?;
    let args: Vec<&str> = tokens.collect();
    let field = kind.arg_field();
    let arity_err = || Error::BadOperandCount {
        op: kind,
        expect: field.len(),
        found: args.len(),
    };
    if args.len() != field.len() {
        return Err(arity_err());
    }
    let mut ops = Vec::with_capacity(args.len());
    for (role, token) in field.iter().zip(&args) {
        ops.push(parse_operand(*role, token, labels)?);
    }
    use OpKind::*;
    use Operand::*;
    let words = match (kind, ops.as_slice()) {
        (ADD, &[R(rd), R(rs), R(rt)]) => vec![Inst::ADD(rd, rs, rt).encode()],
        (SLT, &[R(rd), R(rs), R(rt)]) => vec![Inst::SLT(rd, rs, rt).encode()],
        (DIV, &[R(rt), R(rs)]) => vec![Inst::DIV(rt, rs).encode()],
        (MFHI, &[R(rd)]) => vec![Inst::MFHI(rd).encode()],
        (JR, &[R(rs)]) => vec![Inst::JR(rs).encode()],
        (SYSCALL, &[]) => vec![Inst::SYSCALL.encode()],
        (ADDI, &[R(rt), R(rs), Imm(imm)]) => vec![Inst::ADDI(rt, rs, imm).encode()],
        (LI, &[R(rt), Imm(imm)]) => vec![Inst::ADDI(rt, Reg::ZERO, imm).encode()],
        (LW, &[R(rt), Mem(off, base)]) => vec![Inst::LW(rt, off, base).encode()],
        (SW, &[R(rt), Mem(off, base)]) => vec![Inst::SW(rt, off, base).encode()],
        (BEQ, &[R(rs), R(rt), Target(addr)]) => {
            vec![Inst::BEQ(rs, rt, branch_offset(addr, pc)?).encode()]
        }
        (BNE, &[R(rs), R(rt), Target(addr)]) => {
            vec![Inst::BNE(rs, rt, branch_offset(addr, pc)?).encode()]
        }
        (LUI, &[R(rt), UImm(imm)]) => vec![Inst::LUI(rt, imm).encode()],
        (ORI, &[R(rt), R(rs), UImm(imm)]) => vec![Inst::ORI(rt, rs, imm).encode()],
        (J, &[Target(addr)]) => vec![Inst::J(jump_field(addr)?).encode()],
        (JAL, &[Target(addr)]) => vec![Inst::JAL(jump_field(addr)?).encode()],
        (LA, &[R(rt), Target(addr)]) => vec![
            Inst::LUI(rt, (addr >> 16) as u16).encode(),
            Inst::ORI(rt, rt, (addr & 0xFFFF) as u16).encode(),
        ],
        // arg_field and the arms above agree on shape per kind
        _ => return Err(arity_err()),
    };
    Ok(words)
}

/// One word per line, 32 `0`/`1` characters.
pub fn format_word(word: u32) -> String {
    format!("{word:032b}")
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BASE_ADDR;

    fn table() -> SymbolTable {
        let mut t = SymbolTable::new();
        t.define("Main", BASE_ADDR).unwrap();
        t
    }

    fn one(line: &str, pc: u32, labels: &SymbolTable) -> u32 {
        let words = encode_line(line, pc, labels).unwrap();
        assert_eq!(words.len(), 1);
        words[0]
    }

    #[test]
    fn strip_and_label() {
        assert_eq!(strip_comment("  add $t0, $t1, $t2  # sum"), "add $t0, $t1, $t2");
        assert_eq!(strip_comment("# whole line"), "");
        assert_eq!(label_def("Main:"), Some("Main"));
        assert_eq!(label_def("Main: # entry"), Some("Main"));
        assert_eq!(label_def("add $t0, $t1, $t2"), None);
        assert_eq!(label_def(":"), None);
    }

    #[test]
    fn widths() {
        assert_eq!(line_width(""), 0);
        assert_eq!(line_width("Main:"), 0);
        assert_eq!(line_width("# comment"), 0);
        assert_eq!(line_width("syscall"), 1);
        assert_eq!(line_width("la $t0, Main"), 2);
        assert_eq!(line_width("bogus $t0"), 1);
    }

    #[test]
    fn integer_literals() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-42"), Some(-42));
        assert_eq!(parse_int("0x10"), Some(16));
        assert_eq!(parse_int("-0x10"), Some(-16));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("0o17"), Some(15));
        assert_eq!(parse_int("Main"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn arithmetic_words() {
        let labels = SymbolTable::new();
        assert_eq!(one("addi $t0, $zero, 5", BASE_ADDR, &labels), 0x2008_0005);
        assert_eq!(one("li $t1, -1", BASE_ADDR, &labels), 0x2009_FFFF);
        assert_eq!(one("add $t0, $t1, $t2", BASE_ADDR, &labels), 0x012A_4020);
        assert_eq!(one("jr $ra", BASE_ADDR, &labels), 0x03E0_0008);
        assert_eq!(one("mfhi $v0", BASE_ADDR, &labels), 0x0000_1010);
        assert_eq!(one("syscall", BASE_ADDR, &labels), 0x0000_000C);
    }

    #[test]
    fn memory_words() {
        let labels = SymbolTable::new();
        assert_eq!(one("lw $t0, -4($sp)", BASE_ADDR, &labels), 0x8FA8_FFFC);
        assert!(matches!(
            encode_line("lw $t0, ($sp)", BASE_ADDR, &labels),
            Err(Error::BadMemoryOperand(_))
        ));
        assert!(matches!(
            encode_line("sw $t0, 4", BASE_ADDR, &labels),
            Err(Error::BadMemoryOperand(_))
        ));
    }

    #[test]
    fn branch_words() {
        let mut labels = SymbolTable::new();
        labels.define("Loop", BASE_ADDR).unwrap();
        // pc+8 -> Loop is a word offset of -3
        assert_eq!(one("bne $t0, $t1, Loop", BASE_ADDR + 8, &labels), 0x1509_FFFD);
        // numeric target, same encoding
        assert_eq!(
            one("bne $t0, $t1, 0x00400000", BASE_ADDR + 8, &labels),
            0x1509_FFFD
        );
        assert_eq!(
            encode_line("beq $t0, $t1, Exit", BASE_ADDR, &labels),
            Err(Error::UndefinedLabel("Exit".to_string()))
        );
        // too far for a 16-bit offset
        assert!(matches!(
            encode_line("beq $t0, $t1, 0x00500000", BASE_ADDR, &labels),
            Err(Error::ImmediateOutOfRange(_))
        ));
        assert!(matches!(
            encode_line("beq $t0, $t1, 0x00400002", BASE_ADDR, &labels),
            Err(Error::MisalignedTarget(0x0040_0002))
        ));
    }

    #[test]
    fn jump_words() {
        let labels = table();
        assert_eq!(one("j Main", BASE_ADDR + 40, &labels), 0x0810_0000);
        assert_eq!(one("jal Main", BASE_ADDR + 40, &labels), 0x0C10_0000);
        // 26-bit field covers 2^28 bytes
        assert!(matches!(
            encode_line("j 0x10000000", BASE_ADDR, &labels),
            Err(Error::AddressOverflow(_))
        ));
    }

    #[test]
    fn la_expands_to_two_words() {
        let labels = table();
        let words = encode_line("la $t0, Main", BASE_ADDR, &labels).unwrap();
        assert_eq!(words, vec![0x3C08_0040, 0x3508_0000]);
    }

    #[test]
    fn unsigned_upper_words() {
        let labels = SymbolTable::new();
        assert_eq!(one("lui $t0, 0x40", BASE_ADDR, &labels), 0x3C08_0040);
        assert_eq!(one("ori $t0, $t0, 0xBEEF", BASE_ADDR, &labels), 0x3508_BEEF);
        assert_eq!(
            encode_line("lui $t0, 0x10000", BASE_ADDR, &labels),
            Err(Error::ImmediateOutOfRange(0x10000))
        );
    }

    #[test]
    fn operand_errors() {
        let labels = SymbolTable::new();
        assert_eq!(
            encode_line("frobnicate $t0", BASE_ADDR, &labels),
            Err(Error::UnknownMnemonic("frobnicate".to_string()))
        );
        assert_eq!(
            encode_line("add $t0, $t1", BASE_ADDR, &labels),
            Err(Error::BadOperandCount {
                op: OpKind::ADD,
                expect: 3,
                found: 2
            })
        );
        assert_eq!(
            encode_line("li $t0, 40000", BASE_ADDR, &labels),
            Err(Error::ImmediateOutOfRange(40000))
        );
        assert_eq!(
            encode_line("li $t0, nope", BASE_ADDR, &labels),
            Err(Error::BadImmediate("nope".to_string()))
        );
        assert_eq!(
            encode_line("add $x9, $t1, $t2", BASE_ADDR, &labels),
            Err(Error::InvalidRegister("$x9".to_string()))
        );
    }

    #[test]
    fn catalog_arity_drives_the_encoder() {
        use OpKind::*;
        let labels = SymbolTable::new();
        let kinds = [
            ADD, SLT, DIV, MFHI, JR, SYSCALL, ADDI, LW, SW, BEQ, BNE, LUI, ORI, J, JAL, LI, LA,
        ];
        for kind in kinds {
            // five operands never matches any catalog arity
            let line = format!("{kind} $t0, $t0, $t0, $t0, $t0");
            assert_eq!(
                encode_line(&line, BASE_ADDR, &labels),
                Err(Error::BadOperandCount {
                    op: kind,
                    expect: kind.arg_field().len(),
                    found: 5
                })
            );
        }
    }

    #[test]
    fn blank_and_label_lines_emit_nothing() {
        let labels = SymbolTable::new();
        assert_eq!(encode_line("", BASE_ADDR, &labels).unwrap(), vec![]);
        assert_eq!(encode_line("   # note", BASE_ADDR, &labels).unwrap(), vec![]);
        assert_eq!(encode_line("Main:", BASE_ADDR, &labels).unwrap(), vec![]);
    }

    #[test]
    fn word_formatting() {
        assert_eq!(format_word(0), "0".repeat(32));
        assert_eq!(
            format_word(0x2008_0005),
            "00100000000010000000000000000101"
        );
    }
}
