use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    Display,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Reg {
    #[default]
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl Reg {
    /// Only the exact lowercase spelling `r0`..`r7` names a register.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(reg) => Ok(reg),
            Err(_) => Err(format!("Unknown register name: `{s}`")),
        }
    }

    pub fn index(self) -> u8 {
        self.into()
    }
}

/// `r` followed by digits only, e.g. `r3` or `r12`.
pub fn looks_like_register(s: &str) -> bool {
    match s.strip_prefix('r') {
        Some(num) => !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}
