//! The stepwise driver: binds a direction, owns the persisted key and block
//! engines, and answers "what is the value of step S at round R" without
//! recomputing anything already on the persisted prefix.

use super::constants::MAX_ROUNDS;
use super::error::{Error, Result};
use super::key_schedule::KeySchedule;
use super::loader::load_columns;
use super::round::{BlockState, Captured};
use super::step::Step;

/// Which way the engine is being driven. Bound on first use and immutable
/// until [`Driver::reset`] is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl Direction {
    fn df(self) -> usize {
        match self {
            Direction::Encrypt => 0,
            Direction::Decrypt => MAX_ROUNDS - 1,
        }
    }
}

/// The shape of a captured value, matching the external interface table:
/// round keys and the right half and the F output are 64-bit pairs packed
/// into one word; the three `G` calls inside a round are individually
/// 32-bit; the fully updated block is raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    Words32(Vec<u32>),
    Words64(Vec<u64>),
    Bytes(Vec<u8>),
}

fn words64(captured: Vec<Captured>) -> Vec<u64> {
    captured
        .into_iter()
        .map(|c| match c {
            Captured::Word64(v) => v,
            _ => unreachable!("step produces 64-bit captures only"),
        })
        .collect()
}

fn words32(captured: Vec<Captured>) -> Vec<u32> {
    captured
        .into_iter()
        .map(|c| match c {
            Captured::Word32(v) => v,
            _ => unreachable!("step produces 32-bit captures only"),
        })
        .collect()
}

/// The persisted engine. One `Driver` drives one direction for as long as
/// its owner keeps calling [`execute`](Driver::execute); calling it with the
/// other direction is an error until [`reset`](Driver::reset) is called.
#[derive(Default)]
pub struct Driver {
    direction: Option<Direction>,
    key_schedule: Option<KeySchedule>,
    block_state: Option<BlockState>,
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all persisted state and unbind the direction.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fetch the value of `step_id` at 1-based round `round` for `vals`
    /// under `keys`, running on a pool of `threads` rayon workers.
    ///
    /// `vals` and `keys` are each a flat, big-endian buffer of 16-byte
    /// items; `keys` may hold either one item (broadcast to every item in
    /// `vals`) or exactly as many items as `vals`.
    pub fn execute(
        &mut self,
        vals: &[u8],
        keys: &[u8],
        round: usize,
        step_id: u8,
        direction: Direction,
        threads: usize,
    ) -> Result<StepOutput> {
        let outcome = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| self.execute_inner(vals, keys, round, step_id, direction)),
            Err(err) => {
                log::warn!(
                    "could not build a {threads}-thread pool ({err}), running on the default pool"
                );
                self.execute_inner(vals, keys, round, step_id, direction)
            }
        };

        if let Err(ref e) = outcome {
            log::error!("seed engine step failed: {e}");
            self.key_schedule = None;
            self.block_state = None;
        }
        outcome
    }

    fn execute_inner(
        &mut self,
        vals: &[u8],
        keys: &[u8],
        round: usize,
        step_id: u8,
        direction: Direction,
    ) -> Result<StepOutput> {
        if round == 0 || round > MAX_ROUNDS {
            return Err(Error::RoundOutOfRange {
                round,
                max: MAX_ROUNDS,
            });
        }
        let step = Step::try_from(step_id)?;

        if vals.len() % 16 != 0 {
            return Err(Error::InvalidLength { len: vals.len() });
        }
        if keys.len() % 16 != 0 {
            return Err(Error::InvalidLength { len: keys.len() });
        }

        match self.direction {
            Some(bound) if bound != direction => {
                return Err(Error::DirectionSwitch {
                    bound,
                    requested: direction,
                });
            }
            _ => self.direction = Some(direction),
        }

        let n_v = vals.len() / 16;
        let n_k = keys.len() / 16;
        if n_k != 1 && n_k != n_v {
            return Err(Error::KeyBatchMismatch { n_k, n_v });
        }

        match &self.block_state {
            Some(bs) if bs.len() == n_v => {}
            _ => self.block_state = Some(BlockState::reload_from(vals)?),
        }
        match &self.key_schedule {
            Some(ks) if ks.len() == n_k => {}
            _ => self.key_schedule = Some(KeySchedule::new(load_columns(keys)?)),
        }

        let r0 = round - 1;
        let df = direction.df();
        let broadcast = n_k == 1;

        let prefix_target = if step == Step::Output {
            Some(r0)
        } else if r0 == 0 {
            None
        } else {
            Some(r0 - 1)
        };
        self.advance_block_prefix(prefix_target, df, broadcast);

        let kr0 = (df as isize - r0 as isize).unsigned_abs() as usize;

        match step {
            Step::RoundKey => {
                self.key_schedule.as_mut().unwrap().advance_to(kr0);
                let ks = self.key_schedule.as_ref().unwrap();
                let words = ks
                    .ks0
                    .iter()
                    .zip(ks.ks1.iter())
                    .map(|(&a, &b)| ((a as u64) << 32) | b as u64)
                    .collect();
                Ok(StepOutput::Words64(words))
            }
            Step::Right => {
                let bs = self.block_state.as_ref().unwrap();
                Ok(StepOutput::Words64(bs.right_half(r0)))
            }
            Step::AddRoundKey | Step::GDa | Step::GC | Step::GDb => {
                self.key_schedule.as_mut().unwrap().advance_to(kr0);
                let (ks0, ks1) = {
                    let ks = self.key_schedule.as_ref().unwrap();
                    (ks.ks0.clone(), ks.ks1.clone())
                };
                let captured = self
                    .block_state
                    .as_mut()
                    .unwrap()
                    .apply_round(r0, &ks0, &ks1, broadcast, Some(step));
                Ok(match step {
                    Step::AddRoundKey => StepOutput::Words64(words64(captured)),
                    _ => StepOutput::Words32(words32(captured)),
                })
            }
            Step::F => {
                self.key_schedule.as_mut().unwrap().advance_to(kr0);
                let (ks0, ks1) = {
                    let ks = self.key_schedule.as_ref().unwrap();
                    (ks.ks0.clone(), ks.ks1.clone())
                };
                let captured = self
                    .block_state
                    .as_mut()
                    .unwrap()
                    .apply_round(r0, &ks0, &ks1, broadcast, Some(Step::F));
                self.block_state.as_mut().unwrap().block_round = Some(r0);
                Ok(StepOutput::Words64(words64(captured)))
            }
            Step::Output => Ok(StepOutput::Bytes(
                self.block_state.as_ref().unwrap().output_bytes(),
            )),
        }
    }

    /// Bring the persisted block state to exactly `target` fully-completed
    /// rounds (`None` means no rounds applied), replaying only the missing
    /// suffix or, on rewind, resetting and replaying from scratch. Same
    /// prefix-cache discipline as [`KeySchedule::advance_to`].
    fn advance_block_prefix(&mut self, target: Option<usize>, df: usize, broadcast: bool) {
        let block = self.block_state.as_mut().unwrap();
        let key = self.key_schedule.as_mut().unwrap();

        let rewinding = match (block.block_round, target) {
            (Some(_), None) => true,
            (Some(cur), Some(t)) => t < cur,
            (None, _) => false,
        };
        if rewinding {
            block.reset();
        }

        let start = match block.block_round {
            Some(cur) => cur + 1,
            None => 0,
        };
        if let Some(t) = target {
            for r in start..=t {
                let kr = (df as isize - r as isize).unsigned_abs() as usize;
                key.advance_to(kr);
                block.apply_round(r, &key.ks0, &key.ks1, broadcast, None);
                block.block_round = Some(r);
            }
        }
    }
}
