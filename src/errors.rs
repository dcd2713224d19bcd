//! Error types.

use crate::ir::Value;

/// What went wrong while parsing textual IR.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token that does not fit the grammar at this position.
    UnexpectedToken(String),
    /// An instruction appeared before the first block header.
    NoBlock,
    /// A block header or branch target that is not `blockN`, or names a
    /// block that is never declared.
    BadBlock(String),
    /// Block headers must appear in index order.
    OutOfOrderBlock { expected: usize, found: usize },
    /// A value reference that is not `vN` or is out of range.
    BadValue(String),
    /// A value defined more than once.
    DuplicateDef(Value),
    /// A φ must define exactly one value.
    PhiDests(usize),
    /// A φ must have one source per predecessor.
    PhiArity { expected: usize, found: usize },
    /// A φ following a non-φ instruction in the same block.
    PhiAfterOp,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ParseErrorKind::UnexpectedToken(tok) => write!(f, "unexpected token `{}`", tok),
            ParseErrorKind::NoBlock => write!(f, "instruction outside of any block"),
            ParseErrorKind::BadBlock(name) => write!(f, "invalid block `{}`", name),
            ParseErrorKind::OutOfOrderBlock { expected, found } => write!(
                f,
                "expected header for block{}, found block{}",
                expected, found
            ),
            ParseErrorKind::BadValue(name) => write!(f, "invalid value `{}`", name),
            ParseErrorKind::DuplicateDef(value) => write!(f, "{} is defined more than once", value),
            ParseErrorKind::PhiDests(n) => {
                write!(f, "phi must define exactly one value, found {}", n)
            }
            ParseErrorKind::PhiArity { expected, found } => write!(
                f,
                "phi has {} sources but its block has {} predecessors",
                found, expected
            ),
            ParseErrorKind::PhiAfterOp => write!(f, "phi after a non-phi instruction"),
        }
    }
}

/// An error that occurs when parsing textual IR.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// One-based line number.
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for ParseError {}
