use crate::error::Error;
use crate::label::SymbolTable;
use crate::op::{Funct, OpKind, Opcode, FROM_FUNCT, FROM_OPCODE};
use crate::reg::Reg;

/// A fully resolved instruction: registers and field values only, no
/// labels left. One variant per encodable mnemonic, operands in source
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    ADD(Reg, Reg, Reg),
    SLT(Reg, Reg, Reg),
    DIV(Reg, Reg),
    MFHI(Reg),
    JR(Reg),
    SYSCALL,
    ADDI(Reg, Reg, i16),
    /// rt, offset, base
    LW(Reg, i16, Reg),
    SW(Reg, i16, Reg),
    /// rs, rt, word offset relative to pc+4
    BEQ(Reg, Reg, i16),
    BNE(Reg, Reg, i16),
    LUI(Reg, u16),
    ORI(Reg, Reg, u16),
    /// 26-bit word-address field
    J(u32),
    JAL(u32),
}

// ----------------------------------------------------------------------------

fn enc_r(rs: u8, rt: u8, rd: u8, funct: u8) -> u32 {
    ((rs as u32) << 21) | ((rt as u32) << 16) | ((rd as u32) << 11) | (funct as u32)
}

fn enc_i(opcode: u8, rs: u8, rt: u8, imm: u16) -> u32 {
    ((opcode as u32) << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | (imm as u32)
}

fn enc_j(opcode: u8, addr: u32) -> u32 {
    ((opcode as u32) << 26) | (addr & 0x03FF_FFFF)
}

fn dec_fields(word: u32) -> (u8, u8, u8, u8, u16) {
    let opcode = (word >> 26) as u8;
    let rs = ((word >> 21) & 0x1F) as u8;
    let rt = ((word >> 16) & 0x1F) as u8;
    let rd = ((word >> 11) & 0x1F) as u8;
    let imm = (word & 0xFFFF) as u16;
    (opcode, rs, rt, rd, imm)
}

// ----------------------------------------------------------------------------

impl Inst {
    pub fn kind(&self) -> OpKind {
        match self {
            Inst::ADD(..) => OpKind::ADD,
            Inst::SLT(..) => OpKind::SLT,
            Inst::DIV(..) => OpKind::DIV,
            Inst::MFHI(..) => OpKind::MFHI,
            Inst::JR(..) => OpKind::JR,
            Inst::SYSCALL => OpKind::SYSCALL,
            Inst::ADDI(..) => OpKind::ADDI,
            Inst::LW(..) => OpKind::LW,
            Inst::SW(..) => OpKind::SW,
            Inst::BEQ(..) => OpKind::BEQ,
            Inst::BNE(..) => OpKind::BNE,
            Inst::LUI(..) => OpKind::LUI,
            Inst::ORI(..) => OpKind::ORI,
            Inst::J(..) => OpKind::J,
            Inst::JAL(..) => OpKind::JAL,
        }
    }

    pub fn encode(&self) -> u32 {
        match *self {
            Inst::ADD(rd, rs, rt) => enc_r(rs.index(), rt.index(), rd.index(), Funct::ADD),
            Inst::SLT(rd, rs, rt) => enc_r(rs.index(), rt.index(), rd.index(), Funct::SLT),
            Inst::DIV(rt, rs) => enc_r(rs.index(), rt.index(), 0, Funct::DIV),
            Inst::MFHI(rd) => enc_r(0, 0, rd.index(), Funct::MFHI),
            Inst::JR(rs) => enc_r(rs.index(), 0, 0, Funct::JR),
            Inst::SYSCALL => enc_r(0, 0, 0, Funct::SYSCALL),
            Inst::ADDI(rt, rs, imm) => enc_i(Opcode::ADDI, rs.index(), rt.index(), imm as u16),
            Inst::LW(rt, off, base) => enc_i(Opcode::LW, base.index(), rt.index(), off as u16),
            Inst::SW(rt, off, base) => enc_i(Opcode::SW, base.index(), rt.index(), off as u16),
            Inst::BEQ(rs, rt, off) => enc_i(Opcode::BEQ, rs.index(), rt.index(), off as u16),
            Inst::BNE(rs, rt, off) => enc_i(Opcode::BNE, rs.index(), rt.index(), off as u16),
            Inst::LUI(rt, imm) => enc_i(Opcode::LUI, 0, rt.index(), imm),
            Inst::ORI(rt, rs, imm) => enc_i(Opcode::ORI, rs.index(), rt.index(), imm),
            Inst::J(addr) => enc_j(Opcode::J, addr),
            Inst::JAL(addr) => enc_j(Opcode::JAL, addr),
        }
    }

    pub fn decode(word: u32) -> Result<Inst, Error> {
        let unknown = || Error::UnknownInstruction(word);
        let (opcode, rs, rt, rd, imm) = dec_fields(word);
        // 5-bit fields, so the conversions cannot actually fail
        let rs = Reg::try_from(rs).map_err(|_| unknown())?;
        let rt = Reg::try_from(rt).map_err(|_| unknown())?;
        let rd = Reg::try_from(rd).map_err(|_| unknown())?;
        if opcode == Opcode::R {
            let funct = (word & 0x3F) as u8;
            return match FROM_FUNCT.get(&funct) {
                Some(OpKind::ADD) => Ok(Inst::ADD(rd, rs, rt)),
                Some(OpKind::SLT) => Ok(Inst::SLT(rd, rs, rt)),
                Some(OpKind::DIV) => Ok(Inst::DIV(rt, rs)),
                Some(OpKind::MFHI) => Ok(Inst::MFHI(rd)),
                Some(OpKind::JR) => Ok(Inst::JR(rs)),
                Some(OpKind::SYSCALL) => Ok(Inst::SYSCALL),
                _ => Err(unknown()),
            };
        }
        match FROM_OPCODE.get(&opcode) {
            Some(OpKind::ADDI) => Ok(Inst::ADDI(rt, rs, imm as i16)),
            Some(OpKind::LW) => Ok(Inst::LW(rt, imm as i16, rs)),
            Some(OpKind::SW) => Ok(Inst::SW(rt, imm as i16, rs)),
            Some(OpKind::BEQ) => Ok(Inst::BEQ(rs, rt, imm as i16)),
            Some(OpKind::BNE) => Ok(Inst::BNE(rs, rt, imm as i16)),
            Some(OpKind::LUI) => Ok(Inst::LUI(rt, imm)),
            Some(OpKind::ORI) => Ok(Inst::ORI(rt, rs, imm)),
            Some(OpKind::J) => Ok(Inst::J(word & 0x03FF_FFFF)),
            Some(OpKind::JAL) => Ok(Inst::JAL(word & 0x03FF_FFFF)),
            _ => Err(unknown()),
        }
    }

    /// Source-syntax rendering, re-assemblable as-is. Branch and jump
    /// targets come back as label names where the table knows the
    /// address, raw hex otherwise. `addi` with `rs == $zero` renders as
    /// its `li` shorthand.
    pub fn render(&self, pc: u32, labels: &SymbolTable) -> String {
        let target = |addr: u32| {
            labels
                .reverse_lookup(addr)
                .map(str::to_string)
                .unwrap_or_else(|| format!("0x{addr:08x}"))
        };
        match *self {
            Inst::ADD(rd, rs, rt) | Inst::SLT(rd, rs, rt) => {
                format!("{} ${rd}, ${rs}, ${rt}", self.kind())
            }
            Inst::DIV(rt, rs) => format!("div ${rt}, ${rs}"),
            Inst::MFHI(rd) => format!("mfhi ${rd}"),
            Inst::JR(rs) => format!("jr ${rs}"),
            Inst::SYSCALL => "syscall".to_string(),
            Inst::ADDI(rt, Reg::ZERO, imm) => format!("li ${rt}, {imm}"),
            Inst::ADDI(rt, rs, imm) => format!("addi ${rt}, ${rs}, {imm}"),
            Inst::LW(rt, off, base) | Inst::SW(rt, off, base) => {
                format!("{} ${rt}, {off}(${base})", self.kind())
            }
            Inst::BEQ(rs, rt, off) | Inst::BNE(rs, rt, off) => {
                let addr = pc.wrapping_add(4).wrapping_add(((off as i32) << 2) as u32);
                format!("{} ${rs}, ${rt}, {}", self.kind(), target(addr))
            }
            Inst::LUI(rt, imm) => format!("lui ${rt}, 0x{imm:x}"),
            Inst::ORI(rt, rs, imm) => format!("ori ${rt}, ${rs}, 0x{imm:x}"),
            Inst::J(addr) | Inst::JAL(addr) => {
                format!("{} {}", self.kind(), target(addr << 2))
            }
        }
    }
}

// ----------------------------------------------------------------------------
