//! Persistent block state and the Feistel round transformation.
//!
//! The round XORs `F(subkey, right_half)` into the left half and then swaps
//! halves. Rather than copying halves each round, the implementation
//! alternates which pair of columns plays the role of "left" and "right":
//! on even rounds `(v1, v2)` is the left alias and `(v3, v4)` is the right
//! alias; on odd rounds the roles swap. The swap is therefore free: no
//! values move, only the labels applied to them change.

use rayon::prelude::*;

use super::constants::g;
use super::loader::{load_columns, store_block, Columns};
use super::step::Step;

/// One intermediate value captured mid-round, before it is known whether
/// the caller asked for a 32-bit or 64-bit quantity.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Captured {
    None,
    Word32(u32),
    Word64(u64),
}

pub(crate) struct BlockState {
    orig: Columns,
    v1: Vec<u32>,
    v2: Vec<u32>,
    v3: Vec<u32>,
    v4: Vec<u32>,
    pub block_round: Option<usize>,
    n_v: usize,
}

impl BlockState {
    pub fn new(cols: Columns) -> Self {
        let n_v = cols.len();
        BlockState {
            v1: cols.w1.clone(),
            v2: cols.w2.clone(),
            v3: cols.w3.clone(),
            v4: cols.w4.clone(),
            orig: cols,
            block_round: None,
            n_v,
        }
    }

    pub fn len(&self) -> usize {
        self.n_v
    }

    pub fn reset(&mut self) {
        self.v1.copy_from_slice(&self.orig.w1);
        self.v2.copy_from_slice(&self.orig.w2);
        self.v3.copy_from_slice(&self.orig.w3);
        self.v4.copy_from_slice(&self.orig.w4);
        self.block_round = None;
    }

    fn aliases_mut(&mut self, r: usize) -> (&mut [u32], &mut [u32], &mut [u32], &mut [u32]) {
        if r % 2 == 0 {
            (&mut self.v1, &mut self.v2, &mut self.v3, &mut self.v4)
        } else {
            (&mut self.v3, &mut self.v4, &mut self.v1, &mut self.v2)
        }
    }

    /// The pre-round right half `(a3, a4)` for round `r`, packed as one
    /// 64-bit value per block: `(a3[i] << 32) | a4[i]`.
    pub fn right_half(&self, r: usize) -> Vec<u64> {
        let (a3, a4) = if r % 2 == 0 {
            (&self.v3, &self.v4)
        } else {
            (&self.v1, &self.v2)
        };
        a3.iter()
            .zip(a4.iter())
            .map(|(&hi, &lo)| ((hi as u64) << 32) | lo as u64)
            .collect()
    }

    /// The current block batch serialized big-endian, 16 bytes per block.
    ///
    /// There is no final un-swap after the last round, so the byte order
    /// follows whichever alias was live for the round that was last fully
    /// applied: `(v1, v2, v3, v4)` if that round was even, `(v3, v4, v1,
    /// v2)` if odd. `MAX_ROUNDS - 1` is always odd, so a fully completed
    /// encryption or decryption always serializes in the swapped order.
    pub fn output_bytes(&self) -> Vec<u8> {
        let (c1, c2, c3, c4) = match self.block_round {
            Some(r) if r % 2 == 1 => (&self.v3, &self.v4, &self.v1, &self.v2),
            _ => (&self.v1, &self.v2, &self.v3, &self.v4),
        };
        let mut out = vec![0u8; self.n_v * 16];
        for i in 0..self.n_v {
            store_block(c1[i], c2[i], c3[i], c4[i], &mut out[i * 16..(i + 1) * 16]);
        }
        out
    }

    /// Apply round `r` to every block, using subkeys `(ks0, ks1)` already
    /// valid for that round.
    ///
    /// If `capture` names one of `AddRoundKey`/`GDa`/`GC`/`GDb`, the round
    /// short-circuits: the matching value is computed and returned per
    /// block, but the round's XOR into the left alias is skipped, so
    /// `block_round` must not be advanced by the caller. For any other
    /// `capture` (including `None`, `F`, or `Output`) the round runs to
    /// completion.
    pub fn apply_round(
        &mut self,
        r: usize,
        ks0: &[u32],
        ks1: &[u32],
        broadcast: bool,
        capture: Option<Step>,
    ) -> Vec<Captured> {
        let (a1, a2, a3, a4) = self.aliases_mut(r);
        let short_circuits = matches!(
            capture,
            Some(Step::AddRoundKey) | Some(Step::GDa) | Some(Step::GC) | Some(Step::GDb)
        );

        a1.par_iter_mut()
            .zip(a2.par_iter_mut())
            .zip(a3.par_iter().zip(a4.par_iter()))
            .enumerate()
            .map(|(i, ((a1_i, a2_i), (a3_i, a4_i)))| {
                let ki = if broadcast { 0 } else { i };
                let x0 = *a3_i ^ ks0[ki];
                let x1 = *a4_i ^ ks1[ki];
                let x2 = x1 ^ x0;
                if let Some(Step::AddRoundKey) = capture {
                    return Captured::Word64(((x0 as u64) << 32) | x2 as u64);
                }

                let x3 = g(x2);
                if let Some(Step::GDa) = capture {
                    return Captured::Word32(x3);
                }

                let x4 = x3.wrapping_add(x0);
                let x5 = g(x4);
                if let Some(Step::GC) = capture {
                    return Captured::Word32(x5);
                }

                let x6 = x5.wrapping_add(x3);
                let x7 = g(x6);
                if let Some(Step::GDb) = capture {
                    return Captured::Word32(x7);
                }

                let x8 = x5.wrapping_add(x7);
                if !short_circuits {
                    *a1_i ^= x8;
                    *a2_i ^= x7;
                }

                if let Some(Step::F) = capture {
                    Captured::Word64(((x8 as u64) << 32) | x7 as u64)
                } else {
                    Captured::None
                }
            })
            .collect()
    }

    pub fn reload_from(bytes: &[u8]) -> super::error::Result<Self> {
        Ok(Self::new(load_columns(bytes)?))
    }
}
