//! Frontend: parse textual IR into a `FunctionBody`.
//!
//! The format is line-oriented:
//!
//! ```text
//! block0 -> block1, block2:
//!     v0 = const #1
//!     v1 = add v0, v0
//! block1 -> block3:
//! block2 -> block3:
//! block3:
//!     v2 = phi v0, v1   ; one source per predecessor, in edge order
//!     ret v2
//! ```
//!
//! Block headers must appear in index order. Edges are added in the
//! order they are written, which fixes each block's predecessor order.
//! Operands are `vN` (SSA value), `#N` (immediate) or `_` (undef).
//! Everything after `;` is a comment.

use crate::entity::EntityRef;
use crate::errors::{ParseError, ParseErrorKind};
use crate::ir::*;
use anyhow::Result;
use fxhash::FxHashMap;
use log::{debug, trace};

/// Parse a single function from its textual form.
pub fn parse_function(text: &str) -> Result<FunctionBody> {
    let body = FunctionParser::default().parse(text)?;
    Ok(body)
}

#[derive(Default)]
struct FunctionParser {
    body: FunctionBody,
    current: Option<Block>,
    /// Number of block headers seen so far.
    declared: usize,
    /// Edges as `(from, to index, line)`; targets may be forward
    /// references, so they are resolved at the end.
    edges: Vec<(Block, usize, usize)>,
    /// Line of each value's definition.
    defs: FxHashMap<Value, usize>,
    /// Every φ as `(block, inst index, line)`.
    phis: Vec<(Block, usize, usize)>,
}

fn err<T>(line: usize, kind: ParseErrorKind) -> std::result::Result<T, ParseError> {
    Err(ParseError { line, kind })
}

fn parse_index(token: &str, prefix: &str) -> Option<usize> {
    let digits = token.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse::<u32>().ok()?;
    if index == u32::MAX {
        return None;
    }
    Some(index as usize)
}

fn parse_block(token: &str, line: usize) -> std::result::Result<usize, ParseError> {
    match parse_index(token, "block") {
        Some(index) => Ok(index),
        None => err(line, ParseErrorKind::BadBlock(token.to_owned())),
    }
}

fn parse_value(token: &str, line: usize) -> std::result::Result<Value, ParseError> {
    match parse_index(token, "v") {
        Some(index) => Ok(Value::new(index)),
        None => err(line, ParseErrorKind::BadValue(token.to_owned())),
    }
}

fn parse_operand(token: &str, line: usize) -> std::result::Result<Operand, ParseError> {
    if token == "_" {
        Ok(Operand::undef())
    } else if let Some(imm) = token.strip_prefix('#') {
        match imm.parse::<i64>() {
            Ok(imm) => Ok(Operand::imm(imm)),
            Err(_) => err(line, ParseErrorKind::UnexpectedToken(token.to_owned())),
        }
    } else if token.starts_with('v') {
        parse_value(token, line).map(Operand::value)
    } else {
        err(line, ParseErrorKind::UnexpectedToken(token.to_owned()))
    }
}

fn is_opcode(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

impl FunctionParser {
    fn parse(mut self, text: &str) -> std::result::Result<FunctionBody, ParseError> {
        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let content = raw.split(';').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            if let Some(header) = content.strip_suffix(':') {
                self.header(header, line)?;
            } else {
                self.inst(content, line)?;
            }
        }
        self.finish()
    }

    fn header(&mut self, header: &str, line: usize) -> std::result::Result<(), ParseError> {
        let mut parts = header.splitn(2, "->");
        let name = parts.next().unwrap_or("").trim();
        let found = parse_block(name, line)?;
        if found != self.declared {
            return err(
                line,
                ParseErrorKind::OutOfOrderBlock {
                    expected: self.declared,
                    found,
                },
            );
        }
        let block = if self.declared == 0 {
            self.body.entry
        } else {
            self.body.add_block()
        };
        self.declared += 1;
        self.current = Some(block);
        trace!("header: {} at line {}", block, line);

        if let Some(succs) = parts.next() {
            for succ in succs.split(',').map(str::trim) {
                if succ.is_empty() {
                    return err(line, ParseErrorKind::UnexpectedToken(header.to_owned()));
                }
                let to = parse_block(succ, line)?;
                self.edges.push((block, to, line));
            }
        }
        Ok(())
    }

    fn inst(&mut self, content: &str, line: usize) -> std::result::Result<(), ParseError> {
        let block = match self.current {
            Some(block) => block,
            None => return err(line, ParseErrorKind::NoBlock),
        };

        let (dests_text, rest) = match content.find('=') {
            Some(pos) => (Some(&content[..pos]), content[pos + 1..].trim()),
            None => (None, content),
        };

        let mut dests = vec![];
        if let Some(dests_text) = dests_text {
            for token in dests_text.split(',').map(str::trim) {
                dests.push(parse_value(token, line)?);
            }
        }

        let (name, operands) = match rest.find(char::is_whitespace) {
            Some(pos) => (&rest[..pos], rest[pos..].trim()),
            None => (rest, ""),
        };
        if !is_opcode(name) {
            return err(line, ParseErrorKind::UnexpectedToken(name.to_owned()));
        }

        let mut srcs = vec![];
        if !operands.is_empty() {
            for token in operands.split(',').map(str::trim) {
                if token.is_empty() {
                    return err(line, ParseErrorKind::UnexpectedToken(",".to_owned()));
                }
                srcs.push(parse_operand(token, line)?);
            }
        }

        for &dest in &dests {
            if self.defs.insert(dest, line).is_some() {
                return err(line, ParseErrorKind::DuplicateDef(dest));
            }
        }

        let inst = if name == "phi" {
            if dests.len() != 1 {
                return err(line, ParseErrorKind::PhiDests(dests.len()));
            }
            if !self.body.blocks[block].insts.iter().all(Inst::is_phi) {
                return err(line, ParseErrorKind::PhiAfterOp);
            }
            Inst::phi(dests[0], srcs)
        } else {
            Inst::op(name, dests, srcs)
        };
        let is_phi = inst.is_phi();
        let index = self.body.append_inst(block, inst);
        if is_phi {
            self.phis.push((block, index, line));
        }
        Ok(())
    }

    fn finish(mut self) -> std::result::Result<FunctionBody, ParseError> {
        for &(from, to, line) in &self.edges {
            if to >= self.declared {
                return err(line, ParseErrorKind::BadBlock(format!("block{}", to)));
            }
            self.body.add_edge(from, Block::new(to));
        }

        for &(block, index, line) in &self.phis {
            let expected = self.body.blocks[block].preds.len();
            let found = self.body.blocks[block].insts[index].srcs.len();
            if expected != found {
                return err(line, ParseErrorKind::PhiArity { expected, found });
            }
        }

        debug!(
            "parsed function: {} blocks, {} values",
            self.body.blocks.len(),
            self.body.num_values
        );
        Ok(self.body)
    }
}
