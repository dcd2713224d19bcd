//! Displaying IR, in the same textual form the frontend parses.

use super::{FunctionBody, Inst, Operand, OperandKind, Value};
use crate::analysis::Liveness;
use crate::bitset::SparseBitSet;
use crate::entity::EntityRef;

use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self.kind {
            OperandKind::Value(value) => write!(f, "{}", value),
            OperandKind::Imm(imm) => write!(f, "#{}", imm),
            OperandKind::Undef => write!(f, "_"),
        }
    }
}

/// Prints a function body. With liveness attached, also prints each
/// block's live-in and live-out sets and marks killing uses with `*`.
pub struct FunctionBodyDisplay<'a> {
    pub(crate) body: &'a FunctionBody,
    pub(crate) indent: &'a str,
    pub(crate) liveness: Option<&'a Liveness>,
}

impl<'a> FunctionBodyDisplay<'a> {
    pub fn with_liveness(mut self, liveness: &'a Liveness) -> Self {
        self.liveness = Some(liveness);
        self
    }

    fn fmt_inst(&self, f: &mut Formatter, inst: &Inst) -> FmtResult {
        write!(f, "{}    ", self.indent)?;
        if !inst.dests.is_empty() {
            let dests = inst
                .dests
                .iter()
                .map(|dest| format!("{}", dest))
                .collect::<Vec<_>>();
            write!(f, "{} = ", dests.join(", "))?;
        }
        let srcs = inst
            .srcs
            .iter()
            .map(|src| {
                if self.liveness.is_some() && src.kill {
                    format!("*{}", src)
                } else {
                    format!("{}", src)
                }
            })
            .collect::<Vec<_>>();
        if srcs.is_empty() {
            writeln!(f, "{}", inst.name())
        } else {
            writeln!(f, "{} {}", inst.name(), srcs.join(", "))
        }
    }
}

fn value_list(set: &SparseBitSet) -> String {
    set.iter()
        .map(|bit| format!("{}", Value::new(bit as usize)))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<'a> Display for FunctionBodyDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        for (block_id, block) in self.body.blocks.entries() {
            if block.succs.is_empty() {
                writeln!(f, "{}{}:", self.indent, block_id)?;
            } else {
                let succs = block
                    .succs
                    .iter()
                    .map(|succ| format!("{}", succ))
                    .collect::<Vec<_>>();
                writeln!(f, "{}{} -> {}:", self.indent, block_id, succs.join(", "))?;
            }
            if !block.preds.is_empty() {
                let preds = block
                    .preds
                    .iter()
                    .map(|pred| format!("{}", pred))
                    .collect::<Vec<_>>();
                writeln!(f, "{}    ; preds: {}", self.indent, preds.join(", "))?;
            }
            if let Some(liveness) = self.liveness {
                writeln!(
                    f,
                    "{}    ; live-in: {{{}}}",
                    self.indent,
                    value_list(liveness.live_in(block_id))
                )?;
            }
            for inst in &block.insts {
                self.fmt_inst(f, inst)?;
            }
            if let Some(liveness) = self.liveness {
                writeln!(
                    f,
                    "{}    ; live-out: {{{}}}",
                    self.indent,
                    value_list(liveness.live_out(block_id))
                )?;
            }
        }
        Ok(())
    }
}
