//! A minimal SSA IR: blocks of instructions with SSA destinations and
//! sources, plus φ-instructions at block entry.

use crate::entity;
use smallvec::SmallVec;

entity!(Block, "block");
entity!(Value, "v");

mod display;
pub use display::*;
mod func;
pub use func::*;

/// What a source operand refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// A normal SSA value.
    Value(Value),
    /// An immediate constant.
    Imm(i64),
    /// An undefined input.
    Undef,
}

/// A source operand. `kill` is owned by liveness analysis: it is set
/// when this use is the last one of its value along the block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Operand {
    pub kind: OperandKind,
    pub kill: bool,
}

impl Operand {
    pub fn value(value: Value) -> Operand {
        Operand {
            kind: OperandKind::Value(value),
            kill: false,
        }
    }

    pub fn imm(imm: i64) -> Operand {
        Operand {
            kind: OperandKind::Imm(imm),
            kill: false,
        }
    }

    pub fn undef() -> Operand {
        Operand {
            kind: OperandKind::Undef,
            kill: false,
        }
    }

    pub fn as_value(&self) -> Option<Value> {
        match self.kind {
            OperandKind::Value(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstKind {
    /// Selects one source per incoming edge; source `i` comes from the
    /// block's `i`-th predecessor.
    Phi,
    /// Any other instruction, identified by an opcode name.
    Op(String),
}

#[derive(Clone, Debug)]
pub struct Inst {
    pub kind: InstKind,
    pub dests: SmallVec<[Value; 2]>,
    pub srcs: SmallVec<[Operand; 4]>,
}

impl Inst {
    pub fn op<I, J>(name: &str, dests: I, srcs: J) -> Inst
    where
        I: IntoIterator<Item = Value>,
        J: IntoIterator<Item = Operand>,
    {
        Inst {
            kind: InstKind::Op(name.to_owned()),
            dests: dests.into_iter().collect(),
            srcs: srcs.into_iter().collect(),
        }
    }

    pub fn phi<J: IntoIterator<Item = Operand>>(dest: Value, srcs: J) -> Inst {
        Inst {
            kind: InstKind::Phi,
            dests: std::iter::once(dest).collect(),
            srcs: srcs.into_iter().collect(),
        }
    }

    pub fn is_phi(&self) -> bool {
        self.kind == InstKind::Phi
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            InstKind::Phi => "phi",
            InstKind::Op(name) => name,
        }
    }

    /// SSA values read by this instruction, in operand order.
    pub fn src_values(&self) -> impl Iterator<Item = Value> + '_ {
        self.srcs.iter().filter_map(Operand::as_value)
    }
}

#[derive(Clone, Debug, Default)]
pub struct BlockDef {
    /// Predecessors, in edge-insertion order. This order defines which
    /// φ source belongs to which incoming edge.
    pub preds: SmallVec<[Block; 4]>,
    pub succs: SmallVec<[Block; 4]>,
    /// Instructions in program order; φs come first.
    pub insts: Vec<Inst>,
}

impl BlockDef {
    pub fn num_phis(&self) -> usize {
        self.insts.iter().take_while(|inst| inst.is_phi()).count()
    }

    pub fn phis(&self) -> impl Iterator<Item = &Inst> {
        self.insts.iter().take_while(|inst| inst.is_phi())
    }
}
