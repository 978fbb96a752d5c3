use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};

use crate::error::Error;

// ----------------------------------------------------------------------------

pub struct Opcode;

impl Opcode {
    pub const R: u8 = 0x00;
    pub const J: u8 = 0x02;
    pub const JAL: u8 = 0x03;
    pub const BEQ: u8 = 0x04;
    pub const BNE: u8 = 0x05;
    pub const ADDI: u8 = 0x08;
    pub const ORI: u8 = 0x0D;
    pub const LUI: u8 = 0x0F;
    pub const LW: u8 = 0x23;
    pub const SW: u8 = 0x2B;
}

// ----------------------------------------------------------------------------

pub struct Funct;

impl Funct {
    pub const JR: u8 = 0x08;
    pub const SYSCALL: u8 = 0x0C;
    pub const MFHI: u8 = 0x10;
    pub const DIV: u8 = 0x1A;
    pub const ADD: u8 = 0x20;
    pub const SLT: u8 = 0x2A;
}

// ----------------------------------------------------------------------------

/// Every mnemonic the assembler accepts, pseudo-ops included.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OpKind {
    ADD,
    SLT,
    DIV,
    MFHI,
    JR,
    SYSCALL,
    ADDI,
    LW,
    SW,
    BEQ,
    BNE,
    LUI,
    ORI,
    J,
    JAL,
    LI,
    LA,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    R,
    I,
    J,
    Pseudo,
}

/// Operand roles, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    RD,
    RS,
    RT,
    /// Signed 16-bit immediate.
    IMM,
    /// Unsigned 16-bit immediate (lui/ori).
    UIMM,
    /// `offset($base)` memory operand.
    MEM,
    /// Branch/jump/la target: numeric address or label.
    TARGET,
}

impl OpKind {
    pub fn parse(s: &str) -> Result<Self, Error> {
        s.parse::<Self>()
            .map_err(|_| Error::UnknownMnemonic(s.to_string()))
    }

    pub fn format(&self) -> Format {
        use OpKind::*;
        match self {
            ADD | SLT | DIV | MFHI | JR | SYSCALL => Format::R,
            ADDI | LW | SW | BEQ | BNE | LUI | ORI => Format::I,
            J | JAL => Format::J,
            LI | LA => Format::Pseudo,
        }
    }

    pub fn arg_field(&self) -> Vec<Arg> {
        use OpKind::*;
        match self {
            ADD => vec![Arg::RD, Arg::RS, Arg::RT],
            SLT => vec![Arg::RD, Arg::RS, Arg::RT],
            DIV => vec![Arg::RT, Arg::RS],
            MFHI => vec![Arg::RD],
            JR => vec![Arg::RS],
            SYSCALL => vec![],
            ADDI => vec![Arg::RT, Arg::RS, Arg::IMM],
            LW => vec![Arg::RT, Arg::MEM],
            SW => vec![Arg::RT, Arg::MEM],
            BEQ => vec![Arg::RS, Arg::RT, Arg::TARGET],
            BNE => vec![Arg::RS, Arg::RT, Arg::TARGET],
            LUI => vec![Arg::RT, Arg::UIMM],
            ORI => vec![Arg::RT, Arg::RS, Arg::UIMM],
            J => vec![Arg::TARGET],
            JAL => vec![Arg::TARGET],
            LI => vec![Arg::RT, Arg::IMM],
            LA => vec![Arg::RT, Arg::TARGET],
        }
    }

    /// Words emitted: `la` expands to two, everything else is one.
    pub fn words(&self) -> u32 {
        match self {
            OpKind::LA => 2,
            _ => 1,
        }
    }
}

// ----------------------------------------------------------------------------

pub static FROM_OPCODE: Lazy<HashMap<u8, OpKind>> = Lazy::new(|| {
    HashMap::from([
        (Opcode::J, OpKind::J),
        (Opcode::JAL, OpKind::JAL),
        (Opcode::BEQ, OpKind::BEQ),
        (Opcode::BNE, OpKind::BNE),
        (Opcode::ADDI, OpKind::ADDI),
        (Opcode::ORI, OpKind::ORI),
        (Opcode::LUI, OpKind::LUI),
        (Opcode::LW, OpKind::LW),
        (Opcode::SW, OpKind::SW),
    ])
});

pub static FROM_FUNCT: Lazy<HashMap<u8, OpKind>> = Lazy::new(|| {
    HashMap::from([
        (Funct::JR, OpKind::JR),
        (Funct::SYSCALL, OpKind::SYSCALL),
        (Funct::MFHI, OpKind::MFHI),
        (Funct::DIV, OpKind::DIV),
        (Funct::ADD, OpKind::ADD),
        (Funct::SLT, OpKind::SLT),
    ])
});

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mnemonics() {
        assert_eq!(OpKind::parse("add").unwrap(), OpKind::ADD);
        assert_eq!(OpKind::parse("ADDI").unwrap(), OpKind::ADDI);
        assert_eq!(OpKind::parse("Syscall").unwrap(), OpKind::SYSCALL);
        assert_eq!(
            OpKind::parse("hoge"),
            Err(Error::UnknownMnemonic("hoge".to_string()))
        );
    }

    #[test]
    fn render_lowercase() {
        assert_eq!(OpKind::JAL.to_string(), "jal");
        assert_eq!(OpKind::LA.to_string(), "la");
    }

    #[test]
    fn arity() {
        assert_eq!(OpKind::ADD.arg_field().len(), 3);
        assert_eq!(OpKind::DIV.arg_field().len(), 2);
        assert_eq!(OpKind::SYSCALL.arg_field().len(), 0);
        assert_eq!(OpKind::LW.arg_field().len(), 2);
        assert_eq!(OpKind::J.arg_field().len(), 1);
    }

    #[test]
    fn format_classes() {
        assert_eq!(OpKind::ADD.format(), Format::R);
        assert_eq!(OpKind::SYSCALL.format(), Format::R);
        assert_eq!(OpKind::LW.format(), Format::I);
        assert_eq!(OpKind::LUI.format(), Format::I);
        assert_eq!(OpKind::JAL.format(), Format::J);
        assert_eq!(OpKind::LI.format(), Format::Pseudo);
        assert_eq!(OpKind::LA.format(), Format::Pseudo);
    }

    #[test]
    fn words() {
        assert_eq!(OpKind::LA.words(), 2);
        assert_eq!(OpKind::LI.words(), 1);
        assert_eq!(OpKind::BNE.words(), 1);
    }

    #[test]
    fn lookup_maps_fail_closed() {
        assert_eq!(FROM_OPCODE.get(&Opcode::LW), Some(&OpKind::LW));
        assert_eq!(FROM_OPCODE.get(&0x3F), None);
        assert_eq!(FROM_FUNCT.get(&Funct::ADD), Some(&OpKind::ADD));
        assert_eq!(FROM_FUNCT.get(&0x3F), None);
    }
}
