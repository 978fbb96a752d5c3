use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Error;

/// The 32 general purpose registers.
///
/// Index 30 has two names: `fp` is canonical, `s8` is accepted on parse.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    Display,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Reg {
    ZERO,
    AT,
    V0,
    V1,
    A0,
    A1,
    A2,
    A3,
    T0,
    T1,
    T2,
    T3,
    T4,
    T5,
    T6,
    T7,
    S0,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    T8,
    T9,
    K0,
    K1,
    GP,
    SP,
    #[strum(to_string = "fp", serialize = "s8")]
    FP,
    RA,
}

impl Reg {
    /// Parses a `$name` or `$number` register token.
    pub fn parse(token: &str) -> Result<Self, Error> {
        let err = || Error::InvalidRegister(token.to_string());
        let name = token.strip_prefix('$').ok_or_else(err)?;
        if name.is_empty() {
            return Err(err());
        }
        if name.bytes().all(|b| b.is_ascii_digit()) {
            let idx: u8 = name.parse().map_err(|_| err())?;
            return Reg::try_from(idx).map_err(|_| err());
        }
        name.parse::<Self>().map_err(|_| err())
    }

    /// 5-bit register index.
    pub fn index(self) -> u8 {
        self.into()
    }
}
