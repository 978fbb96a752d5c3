use crate::op::OpKind;

/// Everything that can go wrong translating a single line, plus the
/// structural failures (duplicate labels, malformed words).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid register: `{0}`")]
    InvalidRegister(String),

    #[error("unknown mnemonic: `{0}`")]
    UnknownMnemonic(String),

    #[error("`{op}` takes {expect} operand(s), found {found}")]
    BadOperandCount {
        op: OpKind,
        expect: usize,
        found: usize,
    },

    #[error("bad memory operand: `{0}`")]
    BadMemoryOperand(String),

    #[error("bad immediate: `{0}`")]
    BadImmediate(String),

    #[error("immediate out of range: {0}")]
    ImmediateOutOfRange(i64),

    #[error("target address out of range: 0x{0:08x}")]
    AddressOverflow(u32),

    #[error("target address is not word-aligned: 0x{0:08x}")]
    MisalignedTarget(u32),

    #[error("duplicate label: `{0}`")]
    DuplicateLabel(String),

    #[error("undefined label: `{0}`")]
    UndefinedLabel(String),

    #[error("unknown instruction: 0x{0:08x}")]
    UnknownInstruction(u32),

    #[error("malformed word: `{0}`")]
    MalformedWord(String),
}
