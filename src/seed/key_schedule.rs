//! Persistent key-schedule engine.
//!
//! Holds the per-key state `(k1, k2, k3, k4)` that is rotated one round at a
//! time, and the subkey pair `(ks0, ks1)` derived from it. The schedule is a
//! cache of prefix computation: advancing to a round already reached is a
//! no-op, advancing forward replays only the missing rounds, and rewinding
//! (asking for a round behind the current one) replays from scratch.

use rayon::prelude::*;

use super::constants::{g, KC};
use super::loader::Columns;

pub(crate) struct KeySchedule {
    orig: Columns,
    k1: Vec<u32>,
    k2: Vec<u32>,
    k3: Vec<u32>,
    k4: Vec<u32>,
    pub ks0: Vec<u32>,
    pub ks1: Vec<u32>,
    pub key_round: Option<usize>,
    n_k: usize,
}

impl KeySchedule {
    pub fn new(cols: Columns) -> Self {
        let n_k = cols.len();
        KeySchedule {
            k1: cols.w1.clone(),
            k2: cols.w2.clone(),
            k3: cols.w3.clone(),
            k4: cols.w4.clone(),
            orig: cols,
            ks0: vec![0; n_k],
            ks1: vec![0; n_k],
            key_round: None,
            n_k,
        }
    }

    pub fn len(&self) -> usize {
        self.n_k
    }

    fn reload(&mut self) {
        self.k1.copy_from_slice(&self.orig.w1);
        self.k2.copy_from_slice(&self.orig.w2);
        self.k3.copy_from_slice(&self.orig.w3);
        self.k4.copy_from_slice(&self.orig.w4);
        self.key_round = None;
    }

    /// Advance (or rewind) persisted key state so that `ks0`/`ks1` hold the
    /// subkeys valid for key-schedule round `kr`.
    pub fn advance_to(&mut self, kr: usize) {
        if self.key_round == Some(kr) {
            return;
        }
        let start = match self.key_round {
            Some(cur) if kr > cur => cur + 1,
            _ => {
                self.reload();
                0
            }
        };
        for r in start..=kr {
            self.advance_one_round(r);
        }
        self.key_round = Some(kr);
    }

    /// Rotate `(k1, k2, k3, k4)` per round parity, then derive the subkey
    /// pair for round `r` from the rotated state and `KC[r]`.
    fn advance_one_round(&mut self, r: usize) {
        if r > 0 {
            if r % 2 == 1 {
                for (k1, k2) in self.k1.iter_mut().zip(self.k2.iter_mut()) {
                    let tmp = *k1;
                    *k1 = (*k1 >> 8) ^ (*k2 << 24);
                    *k2 = (*k2 >> 8) ^ (tmp << 24);
                }
            } else {
                for (k3, k4) in self.k3.iter_mut().zip(self.k4.iter_mut()) {
                    let tmp = *k3;
                    *k3 = (*k3 << 8) ^ (*k4 >> 24);
                    *k4 = (*k4 << 8) ^ (tmp >> 24);
                }
            }
        }

        let kc = KC[r];
        self.ks0
            .par_iter_mut()
            .zip(self.ks1.par_iter_mut())
            .zip(
                self.k1
                    .par_iter()
                    .zip(self.k2.par_iter())
                    .zip(self.k3.par_iter())
                    .zip(self.k4.par_iter()),
            )
            .for_each(|((ks0_i, ks1_i), (((k1_i, k2_i), k3_i), k4_i))| {
                let t0 = k1_i.wrapping_add(*k3_i).wrapping_sub(kc);
                let t1 = k2_i.wrapping_add(kc).wrapping_sub(*k4_i);
                *ks0_i = g(t0);
                *ks1_i = g(t1);
            });
    }
}
