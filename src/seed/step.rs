//! Stable numeric step identifiers for the intermediates a caller can request.

use super::error::Error;

/// A named point inside a round at which a value can be captured for
/// external analysis. Numeric values are the stable IDs callers pass in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The subkey pair `(ks0, ks1)` valid for the requested round.
    RoundKey = 0,
    /// The pre-round right half `(a3, a4)`.
    Right = 1,
    /// `(x0, x2)`: the right half XORed with the subkey.
    AddRoundKey = 2,
    /// `x3 = G(x2)`.
    GDa = 3,
    /// `x5 = G(x4)`.
    GC = 4,
    /// `x7 = G(x6)`.
    GDb = 5,
    /// `(x8, x7)`: the full F-function output.
    F = 6,
    /// The fully updated block, serialized big-endian.
    Output = 7,
}

impl Step {
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Step {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Step::RoundKey),
            1 => Ok(Step::Right),
            2 => Ok(Step::AddRoundKey),
            3 => Ok(Step::GDa),
            4 => Ok(Step::GC),
            5 => Ok(Step::GDb),
            6 => Ok(Step::F),
            7 => Ok(Step::Output),
            other => Err(Error::UnknownStep(other)),
        }
    }
}
