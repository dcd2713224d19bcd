//! Liveness analysis.
//!
//! Computes, for every block, the set of SSA values live on entry and
//! on exit, by backward iterative dataflow to a fixed point. As a side
//! effect every SSA source is marked as killing or not: a use kills its
//! value when no later use of the value follows it within the block and
//! the value is not live out of the block.
//!
//! φs are treated as living on the incoming edges: a φ's destination is
//! never live into a predecessor, and its source for edge `P -> B` is
//! live out of `P` only. φ sources are never marked as killing.

use crate::analysis::Worklist;
use crate::bitset::{BitSetOptions, SparseBitSet};
use crate::entity::{EntityRef, PerEntity};
use crate::ir::{Block, FunctionBody, Value};
use rayon::prelude::*;
use smallvec::SmallVec;

/// The view of a function that liveness needs.
///
/// Blocks are `Block::new(0)..Block::new(num_blocks())`. Instructions
/// are addressed by their index within a block, sources by their index
/// within an instruction. φs must be the leading instructions of their
/// block, and a φ's source `i` corresponds to the block's `i`-th
/// predecessor.
pub trait LivenessFunction {
    /// Upper bound (exclusive) on SSA value indices.
    fn num_values(&self) -> usize;
    fn num_blocks(&self) -> usize;
    /// Incoming edges of `block`, one entry per edge: a block reaching
    /// `block` along two edges appears twice. The position of an edge in
    /// this list is the index of the φ source it carries.
    fn preds(&self, block: Block) -> &[Block];
    fn insts_len(&self, block: Block) -> usize;
    fn is_phi(&self, block: Block, inst: usize) -> bool;
    fn dests(&self, block: Block, inst: usize) -> &[Value];
    fn srcs_len(&self, block: Block, inst: usize) -> usize;
    /// The SSA value read by a source, or `None` for immediates and other
    /// non-SSA operands.
    fn src_value(&self, block: Block, inst: usize, src: usize) -> Option<Value>;
    fn set_kill(&mut self, block: Block, inst: usize, src: usize, kill: bool);
}

impl LivenessFunction for FunctionBody {
    fn num_values(&self) -> usize {
        self.num_values
    }
    fn num_blocks(&self) -> usize {
        self.blocks.len()
    }
    fn preds(&self, block: Block) -> &[Block] {
        &self.blocks[block].preds[..]
    }
    fn insts_len(&self, block: Block) -> usize {
        self.blocks[block].insts.len()
    }
    fn is_phi(&self, block: Block, inst: usize) -> bool {
        self.blocks[block].insts[inst].is_phi()
    }
    fn dests(&self, block: Block, inst: usize) -> &[Value] {
        &self.blocks[block].insts[inst].dests[..]
    }
    fn srcs_len(&self, block: Block, inst: usize) -> usize {
        self.blocks[block].insts[inst].srcs.len()
    }
    fn src_value(&self, block: Block, inst: usize, src: usize) -> Option<Value> {
        self.blocks[block].insts[inst].srcs[src].as_value()
    }
    fn set_kill(&mut self, block: Block, inst: usize, src: usize, kill: bool) {
        self.blocks[block].insts[inst].srcs[src].kill = kill;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LivenessOptions {
    /// Representation of the per-block sets.
    pub bitset: BitSetOptions,
}

/// Per-block live-in and live-out sets.
#[derive(Clone, Debug, Default)]
pub struct Liveness {
    live_in: PerEntity<Block, SparseBitSet>,
    live_out: PerEntity<Block, SparseBitSet>,
    iterations: usize,
}

fn num_phis<F: LivenessFunction + ?Sized>(f: &F, block: Block) -> usize {
    (0..f.insts_len(block))
        .take_while(|&inst| f.is_phi(block, inst))
        .count()
}

/// Step `live` backward over one non-φ instruction: its destinations
/// become dead, its SSA sources become live. Each source is marked as
/// killing iff its value was dead just after the instruction.
pub fn update_inst<F: LivenessFunction + ?Sized>(
    live: &mut SparseBitSet,
    f: &mut F,
    block: Block,
    inst: usize,
) {
    for &dest in f.dests(block, inst) {
        live.remove(dest.as_u32());
    }
    for src in 0..f.srcs_len(block, inst) {
        if let Some(value) = f.src_value(block, inst, src) {
            let kill = live.insert(value.as_u32());
            f.set_kill(block, inst, src, kill);
        }
    }
}

impl Liveness {
    pub fn compute<F: LivenessFunction + ?Sized>(f: &mut F) -> Liveness {
        Self::compute_with_options(f, &LivenessOptions::default())
    }

    pub fn compute_with_options<F: LivenessFunction + ?Sized>(
        f: &mut F,
        options: &LivenessOptions,
    ) -> Liveness {
        let num_values = f.num_values();
        assert!(num_values <= u32::MAX as usize, "too many SSA values");
        let num_values = num_values as u32;
        let num_blocks = f.num_blocks();

        let mut liveness = Liveness::default();
        let mut worklist = Worklist::with_capacity(num_blocks);
        for block in (0..num_blocks).map(Block::new) {
            liveness.live_in[block] = SparseBitSet::with_options(num_values, &options.bitset);
            liveness.live_out[block] = SparseBitSet::with_options(num_values, &options.bitset);
            // The analysis runs backward, so start from the last block.
            worklist.push_head(block);
        }

        while let Some(block) = worklist.pop_head() {
            liveness.iterations += 1;
            log::trace!("liveness: visiting {}", block);

            let mut live = liveness.live_out[block].clone();
            for inst in (0..f.insts_len(block)).rev() {
                if !f.is_phi(block, inst) {
                    update_inst(&mut live, f, block, inst);
                }
            }

            let num_phis = num_phis(f, block);
            let preds: SmallVec<[Block; 4]> = f.preds(block).iter().copied().collect();
            for (src, pred) in preds.into_iter().enumerate() {
                let mut edge_live = live.clone();
                for phi in 0..num_phis {
                    for &dest in f.dests(block, phi) {
                        edge_live.remove(dest.as_u32());
                    }
                }
                for phi in 0..num_phis {
                    if let Some(value) = f.src_value(block, phi, src) {
                        edge_live.insert(value.as_u32());
                        f.set_kill(block, phi, src, false);
                    }
                }

                if liveness.live_out[pred].union_with(&edge_live) {
                    log::trace!(" -> live-out of {} grew; requeueing", pred);
                    worklist.push_tail(pred);
                }
            }

            liveness.live_in[block] = live;
        }

        log::debug!(
            "liveness: {} blocks, {} values, converged after {} block visits",
            num_blocks,
            num_values,
            liveness.iterations
        );
        liveness
    }

    /// Run independent analyses over several functions in parallel.
    pub fn compute_all<F: LivenessFunction + Send>(
        funcs: &mut [F],
        options: &LivenessOptions,
    ) -> Vec<Liveness> {
        funcs
            .par_iter_mut()
            .map(|f| Liveness::compute_with_options(f, options))
            .collect()
    }

    pub fn live_in(&self, block: Block) -> &SparseBitSet {
        &self.live_in[block]
    }

    pub fn live_out(&self, block: Block) -> &SparseBitSet {
        &self.live_out[block]
    }

    pub fn is_live_in(&self, block: Block, value: Value) -> bool {
        self.live_in[block].contains(value.as_u32())
    }

    pub fn is_live_out(&self, block: Block, value: Value) -> bool {
        self.live_out[block].contains(value.as_u32())
    }

    /// Number of blocks processed before reaching the fixed point.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}
