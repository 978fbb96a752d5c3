pub mod decode;
pub mod encode;
pub mod error;
pub mod inst;
pub mod label;
pub mod op;
pub mod reg;

pub use error::Error;
pub use inst::Inst;
pub use label::{LabelDef, SymbolTable};
pub use op::{Arg, Format, OpKind};
pub use reg::Reg;

/// Default start of the text segment (0x00400000).
pub const BASE_ADDR: u32 = 0x0040_0000;

/// Placeholder line emitted for anything that fails to translate.
/// Same width as a word line, so line-for-line alignment is preserved.
pub const SENTINEL: &str = "XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX";
