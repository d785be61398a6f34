//! Error kinds surfaced by the stepwise driver.
//!
//! Every fatal error is reported with [`log::error!`] before it is returned,
//! and leaves the engine in the same state as a freshly constructed one of
//! the same direction (see [`Driver::reset`](super::driver::Driver::reset)).

use super::driver::Direction;

/// Errors that can occur while driving the SEED engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `vals` or `keys` length was not a multiple of 16 bytes.
    #[error("input length {len} is not a multiple of the 16-byte block size")]
    InvalidLength { len: usize },

    /// The key batch size was neither 1 nor equal to the block batch size.
    #[error("key batch size {n_k} is incompatible with block batch size {n_v} (must be 1 or {n_v})")]
    KeyBatchMismatch { n_k: usize, n_v: usize },

    /// `round_1based` fell outside `1..=MAX_ROUNDS`.
    #[error("round {round} is out of range 1..={max}")]
    RoundOutOfRange { round: usize, max: usize },

    /// The caller passed a step id not present in the external interface table.
    #[error("unknown step id {0}")]
    UnknownStep(u8),

    /// The engine was already bound to a direction and the caller requested
    /// the other one. A direction switch is a lifetime error of the engine,
    /// not a recoverable operation: the caller must construct a new engine.
    #[error("engine is bound to {bound:?}, cannot switch direction to {requested:?}")]
    DirectionSwitch {
        bound: Direction,
        requested: Direction,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
