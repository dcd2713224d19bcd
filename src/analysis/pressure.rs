//! Register pressure estimates derived from liveness.
//!
//! Walks each block backward from its live-out set, adding a value's
//! weight the first time it is seen live and subtracting it at its
//! definition. The estimate is the largest running total observed. φs
//! are not walked: their destinations are already part of the block's
//! live-in set.

use super::{Liveness, LivenessFunction};
use crate::entity::EntityRef;
use crate::ir::{Block, Value};

/// Largest weighted number of values simultaneously live in `block`.
///
/// `weight` should give the same answer every time it is asked about a
/// value. If it does not, the running total saturates at zero and
/// `u32::MAX` rather than wrapping.
pub fn block_pressure<F, W>(liveness: &Liveness, f: &F, block: Block, weight: W) -> u32
where
    F: LivenessFunction + ?Sized,
    W: Fn(Value) -> u32,
{
    let mut live = liveness.live_out(block).clone();
    let mut current = live
        .iter()
        .fold(0u32, |sum, bit| sum.saturating_add(weight(Value::new(bit as usize))));
    let mut max = current;

    for inst in (0..f.insts_len(block)).rev() {
        if f.is_phi(block, inst) {
            break;
        }
        for &dest in f.dests(block, inst) {
            if live.remove(dest.as_u32()) {
                current = current.saturating_sub(weight(dest));
            }
        }
        for src in 0..f.srcs_len(block, inst) {
            if let Some(value) = f.src_value(block, inst, src) {
                if live.insert(value.as_u32()) {
                    current = current.saturating_add(weight(value));
                }
            }
        }
        max = max.max(current);
    }

    max
}

/// Largest weighted number of values simultaneously live anywhere in
/// the function.
pub fn max_pressure<F, W>(liveness: &Liveness, f: &F, weight: W) -> u32
where
    F: LivenessFunction + ?Sized,
    W: Fn(Value) -> u32,
{
    (0..f.num_blocks())
        .map(|i| block_pressure(liveness, f, Block::new(i), &weight))
        .max()
        .unwrap_or(0)
}

/// Largest number of values simultaneously live in `block`.
pub fn block_max_live<F: LivenessFunction + ?Sized>(liveness: &Liveness, f: &F, block: Block) -> u32 {
    block_pressure(liveness, f, block, |_| 1)
}

/// Largest number of values simultaneously live anywhere in the
/// function.
pub fn max_live<F: LivenessFunction + ?Sized>(liveness: &Liveness, f: &F) -> u32 {
    max_pressure(liveness, f, |_| 1)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frontend::parse_function;

    #[test]
    fn counts_overlapping_values() {
        let mut body = parse_function(
            "block0 -> block1:
                 v0 = const #1
                 v1 = const #2
                 v2 = add v0, v1
                 v3 = const #3
             block1:
                 v4 = mul v2, v3
                 ret v4, v0",
        )
        .unwrap();
        let liveness = Liveness::compute(&mut body);

        // v0, v2 and v3 are live out of block0.
        assert_eq!(block_max_live(&liveness, &body, Block::new(1)), 3);
        // Peak is the live-out set; inside the block at most v0 and v1.
        assert_eq!(block_max_live(&liveness, &body, Block::new(0)), 3);
        assert_eq!(max_live(&liveness, &body), 3);

        let wide = |value: Value| if value.index() == 3 { 4 } else { 1 };
        assert_eq!(max_pressure(&liveness, &body, wide), 6);
    }

    #[test]
    fn unstable_weight_saturates() {
        let mut body = parse_function(
            "block0:
                 v0 = const #1
                 v1 = add v0, #1
                 ret v1",
        )
        .unwrap();
        let liveness = Liveness::compute(&mut body);

        // Light when a value becomes live, heavy when it dies: the
        // subtraction at each definition would go below zero.
        let calls = std::cell::Cell::new(0u32);
        let shifting = |_: Value| {
            calls.set(calls.get() + 1);
            if calls.get() % 2 == 1 {
                1
            } else {
                u32::MAX
            }
        };
        assert_eq!(block_pressure(&liveness, &body, Block::new(0), shifting), 1);
        assert_eq!(max_pressure(&liveness, &body, |_| u32::MAX), u32::MAX);
    }

    #[test]
    fn empty_function() {
        let mut body = parse_function("block0:").unwrap();
        let liveness = Liveness::compute(&mut body);
        assert_eq!(max_live(&liveness, &body), 0);
    }
}
