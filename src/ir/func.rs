use super::{Block, BlockDef, FunctionBodyDisplay, Inst, Value};
use crate::entity::{EntityRef, EntityVec};

#[derive(Clone, Debug)]
pub struct FunctionBody {
    /// Entry block.
    pub entry: Block,
    /// Block bodies.
    pub blocks: EntityVec<Block, BlockDef>,
    /// Number of SSA value indices in use; every value is below this.
    pub num_values: usize,
}

impl Default for FunctionBody {
    fn default() -> Self {
        FunctionBody::new()
    }
}

impl FunctionBody {
    /// A function with a single, empty entry block.
    pub fn new() -> FunctionBody {
        let mut blocks = EntityVec::default();
        let entry = blocks.push(BlockDef::default());
        FunctionBody {
            entry,
            blocks,
            num_values: 0,
        }
    }

    pub fn add_block(&mut self) -> Block {
        let id = self.blocks.push(BlockDef::default());
        log::trace!("add_block: block {}", id);
        id
    }

    /// Add a control-flow edge. `to` gets `from` as its next
    /// predecessor, so φs in `to` need one more source.
    pub fn add_edge(&mut self, from: Block, to: Block) {
        self.blocks[from].succs.push(to);
        self.blocks[to].preds.push(from);
        log::trace!("add_edge: from {} to {}", from, to);
    }

    /// Allocate a fresh value index.
    pub fn add_value(&mut self) -> Value {
        let value = Value::new(self.num_values);
        self.num_values += 1;
        log::trace!("add_value: {}", value);
        value
    }

    /// Append `inst` to `block`, returning its index in the block.
    ///
    /// φs must precede every other instruction of the block.
    pub fn append_inst(&mut self, block: Block, inst: Inst) -> usize {
        if inst.is_phi() {
            assert_eq!(inst.dests.len(), 1, "phi must define exactly one value");
            assert!(
                self.blocks[block].insts.iter().all(Inst::is_phi),
                "phi appended after a non-phi instruction in {}",
                block
            );
        }
        for value in inst.dests.iter().copied().chain(inst.src_values()) {
            self.num_values = self.num_values.max(value.index() + 1);
        }
        log::trace!("append_inst: {} in {}: {:?}", inst.name(), block, inst.dests);
        let insts = &mut self.blocks[block].insts;
        insts.push(inst);
        insts.len() - 1
    }

    /// Append a φ to `block` defining a fresh value from `srcs`, one per
    /// predecessor.
    pub fn add_phi<J>(&mut self, block: Block, srcs: J) -> Value
    where
        J: IntoIterator<Item = super::Operand>,
    {
        let dest = self.add_value();
        self.append_inst(block, Inst::phi(dest, srcs));
        dest
    }

    /// Append a non-φ instruction to `block` defining `n_dests` fresh
    /// values.
    pub fn add_op<J>(&mut self, block: Block, name: &str, n_dests: usize, srcs: J) -> Vec<Value>
    where
        J: IntoIterator<Item = super::Operand>,
    {
        let dests = (0..n_dests).map(|_| self.add_value()).collect::<Vec<_>>();
        self.append_inst(block, Inst::op(name, dests.iter().copied(), srcs));
        dests
    }

    pub fn display<'a>(&'a self, indent: &'a str) -> FunctionBodyDisplay<'a> {
        FunctionBodyDisplay {
            body: self,
            indent,
            liveness: None,
        }
    }
}
