//! Ascending iteration over the members of a `SparseBitSet`.

use super::words::WordBits;
use super::{node_bit, Node};
use std::collections::btree_map;

/// Iterator over the set bits of a `SparseBitSet`, in ascending order.
///
/// Visits each word of each bucket at most once, so a full walk costs
/// the number of buckets plus the number of words they hold.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    inner: IterInner<'a>,
}

#[derive(Clone, Debug)]
enum IterInner<'a> {
    Dense(WordBits<'a>),
    Sparse {
        nodes: btree_map::Range<'a, u32, Node>,
        current: Option<(u32, WordBits<'a>)>,
    },
}

impl<'a> Iter<'a> {
    pub(super) fn dense(words: &'a [u64], from: u32) -> Self {
        Iter {
            inner: IterInner::Dense(WordBits::starting_at(words, from)),
        }
    }

    /// `nodes` must start at the bucket containing `from`, or later.
    pub(super) fn sparse(mut nodes: btree_map::Range<'a, u32, Node>, from: u32) -> Self {
        let current = nodes.next().map(|(&offset, node)| {
            let start = if offset <= from { node_bit(from) } else { 0 };
            (offset, WordBits::starting_at(&node.words, start))
        });
        Iter {
            inner: IterInner::Sparse { nodes, current },
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match &mut self.inner {
            IterInner::Dense(bits) => bits.next(),
            IterInner::Sparse { nodes, current } => loop {
                let (offset, bits) = current.as_mut()?;
                if let Some(bit) = bits.next() {
                    return Some(*offset + bit);
                }
                *current = nodes
                    .next()
                    .map(|(&offset, node)| (offset, WordBits::starting_at(&node.words, 0)));
            },
        }
    }
}
