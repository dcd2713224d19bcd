//! Sparse bitsets over a large, mostly-empty index space.
//!
//! A `SparseBitSet` stores fixed-size buckets ("nodes") of
//! `BITS_PER_NODE` bits in an ordered map keyed by the first bit each
//! bucket covers. Buckets are only materialized once a bit inside them
//! is set, so a set over millions of SSA values that only ever holds a
//! few scattered clusters stays small.
//!
//! Sets whose capacity is below a configurable threshold use a single
//! flat bit array instead. The two representations behave identically
//! for every operation; the threshold defaults to zero, so the flat
//! path is opt-in.
//!
//! Clearing a bit never removes its bucket, even when the bucket
//! becomes empty. Empty buckets contribute nothing to `count()` or
//! iteration; they are dropped when the set is cloned or when
//! `compact()` is called.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};

mod iter;
mod words;

pub use iter::Iter;

pub const LOG2_BITS_PER_NODE: u32 = 10;
pub const BITS_PER_NODE: u32 = 1 << LOG2_BITS_PER_NODE;
pub const BIT_INDEX_MASK: u32 = BITS_PER_NODE - 1;
pub const OFFSET_MASK: u32 = !BIT_INDEX_MASK;

/// Sets with a capacity under this many bits use the flat
/// representation. Zero disables it.
pub const DEFAULT_SMALL_SET_THRESHOLD: u32 = 0;

const WORDS_PER_NODE: usize = (BITS_PER_NODE / words::WORD_BITS) as usize;

/// Construction options for `SparseBitSet`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitSetOptions {
    /// Capacities strictly below this use a flat bit array.
    pub small_set_threshold: u32,
}

impl Default for BitSetOptions {
    fn default() -> Self {
        BitSetOptions {
            small_set_threshold: DEFAULT_SMALL_SET_THRESHOLD,
        }
    }
}

impl BitSetOptions {
    /// Options that force the flat representation for any nonzero
    /// capacity.
    pub fn always_dense() -> Self {
        BitSetOptions {
            small_set_threshold: u32::MAX,
        }
    }

    fn use_dense(&self, capacity: u32) -> bool {
        capacity != 0 && capacity < self.small_set_threshold
    }
}

/// One bucket of the sparse representation.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Node {
    words: [u64; WORDS_PER_NODE],
}

impl Node {
    fn new() -> Node {
        Node {
            words: [0; WORDS_PER_NODE],
        }
    }

    fn is_empty(&self) -> bool {
        words::is_empty(&self.words)
    }
}

#[derive(Clone)]
enum Repr {
    Dense(Vec<u64>),
    Sparse(BTreeMap<u32, Node>),
}

/// A set of `u32` indices in `[0, capacity)`.
pub struct SparseBitSet {
    repr: Repr,
    capacity: u32,
}

#[inline]
fn node_offset(bit: u32) -> u32 {
    bit & OFFSET_MASK
}

#[inline]
fn node_bit(bit: u32) -> u32 {
    bit & BIT_INDEX_MASK
}

impl SparseBitSet {
    /// Create an empty set with the default options.
    pub fn new(capacity: u32) -> SparseBitSet {
        Self::with_options(capacity, &BitSetOptions::default())
    }

    pub fn with_options(capacity: u32, options: &BitSetOptions) -> SparseBitSet {
        let repr = if options.use_dense(capacity) {
            Repr::Dense(vec![0; words::words_for(capacity)])
        } else {
            Repr::Sparse(BTreeMap::new())
        };
        SparseBitSet { repr, capacity }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Does this set use the flat representation?
    pub fn is_small(&self) -> bool {
        matches!(self.repr, Repr::Dense(_))
    }

    /// Number of materialized buckets, including empty ones. Always zero
    /// for the flat representation.
    pub fn node_count(&self) -> usize {
        match &self.repr {
            Repr::Dense(_) => 0,
            Repr::Sparse(nodes) => nodes.len(),
        }
    }

    /// Add `bit` to the set. Returns `true` if it was not already present.
    pub fn insert(&mut self, bit: u32) -> bool {
        match &mut self.repr {
            Repr::Dense(vals) => {
                assert!(bit < self.capacity, "bit {} out of range", bit);
                words::set(vals, bit)
            }
            Repr::Sparse(nodes) => {
                let node = nodes.entry(node_offset(bit)).or_insert_with(Node::new);
                words::set(&mut node.words, node_bit(bit))
            }
        }
    }

    /// Remove `bit` from the set. Returns `true` if it was present.
    pub fn remove(&mut self, bit: u32) -> bool {
        match &mut self.repr {
            Repr::Dense(vals) => {
                assert!(bit < self.capacity, "bit {} out of range", bit);
                words::clear(vals, bit)
            }
            Repr::Sparse(nodes) => match nodes.get_mut(&node_offset(bit)) {
                Some(node) => words::clear(&mut node.words, node_bit(bit)),
                None => false,
            },
        }
    }

    pub fn contains(&self, bit: u32) -> bool {
        match &self.repr {
            Repr::Dense(vals) => {
                assert!(bit < self.capacity, "bit {} out of range", bit);
                words::test(vals, bit)
            }
            Repr::Sparse(nodes) => nodes
                .get(&node_offset(bit))
                .map_or(false, |node| words::test(&node.words, node_bit(bit))),
        }
    }

    /// `self |= other`. Returns `true` if `self` changed.
    pub fn union_with(&mut self, other: &SparseBitSet) -> bool {
        assert_eq!(
            self.capacity, other.capacity,
            "merging sets of different capacity"
        );
        if self.is_small() != other.is_small() {
            let mut changed = false;
            for bit in other.iter() {
                changed |= self.insert(bit);
            }
            return changed;
        }
        match (&mut self.repr, &other.repr) {
            (Repr::Dense(dst), Repr::Dense(src)) => words::merge(dst, src),
            (Repr::Sparse(dst), Repr::Sparse(src)) => {
                let mut changed = false;
                for (&offset, node) in src {
                    if node.is_empty() {
                        continue;
                    }
                    let dst_node = dst.entry(offset).or_insert_with(Node::new);
                    changed |= words::merge(&mut dst_node.words, &node.words);
                }
                changed
            }
            _ => unreachable!(),
        }
    }

    /// Number of bits in the set.
    pub fn count(&self) -> u32 {
        match &self.repr {
            Repr::Dense(vals) => words::count(vals),
            Repr::Sparse(nodes) => nodes.values().map(|node| words::count(&node.words)).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.repr {
            Repr::Dense(vals) => words::is_empty(vals),
            Repr::Sparse(nodes) => nodes.values().all(Node::is_empty),
        }
    }

    /// Remove every bit, releasing all buckets.
    pub fn clear(&mut self) {
        match &mut self.repr {
            Repr::Dense(vals) => vals.iter_mut().for_each(|w| *w = 0),
            Repr::Sparse(nodes) => nodes.clear(),
        }
    }

    /// Drop buckets that no longer hold any set bit.
    pub fn compact(&mut self) {
        if let Repr::Sparse(nodes) = &mut self.repr {
            nodes.retain(|_, node| !node.is_empty());
        }
    }

    /// The smallest bit in the set, if any.
    pub fn first_set(&self) -> Option<u32> {
        self.next_set(0)
    }

    /// The smallest bit in the set that is `>= from`, if any.
    pub fn next_set(&self, from: u32) -> Option<u32> {
        match &self.repr {
            Repr::Dense(vals) => words::next_set(vals, from).filter(|&bit| bit < self.capacity),
            Repr::Sparse(nodes) => {
                let start = node_offset(from);
                for (&offset, node) in nodes.range(start..) {
                    let node_from = if offset == start { node_bit(from) } else { 0 };
                    if let Some(bit) = words::next_set(&node.words, node_from) {
                        let ret = offset + bit;
                        debug_assert!(ret >= from);
                        return Some(ret);
                    }
                }
                None
            }
        }
    }

    /// Iterate over the set bits in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        self.iter_from(0)
    }

    /// Iterate over the set bits `>= from` in ascending order.
    pub fn iter_from(&self, from: u32) -> Iter<'_> {
        match &self.repr {
            Repr::Dense(vals) => Iter::dense(vals, from),
            Repr::Sparse(nodes) => Iter::sparse(nodes.range(node_offset(from)..), from),
        }
    }

    /// Deterministic total order over sets of equal capacity. Sets with
    /// the same members compare equal regardless of representation or
    /// of empty buckets. Otherwise, buckets are compared in ascending
    /// order, by offset first and then by contents.
    pub fn compare(&self, other: &SparseBitSet) -> Ordering {
        assert_eq!(
            self.capacity, other.capacity,
            "comparing sets of different capacity"
        );
        if let (Repr::Dense(a), Repr::Dense(b)) = (&self.repr, &other.repr) {
            return words::compare(a, b);
        }
        let mut a = self.buckets();
        let mut b = other.buckets();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return Ordering::Equal,
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some((offset_a, words_a)), Some((offset_b, words_b))) => {
                    // A bucket that starts earlier holds a lower bit, which
                    // makes that set the greater one.
                    match offset_b.cmp(&offset_a) {
                        Ordering::Equal => {}
                        ord => return ord,
                    }
                    match words::compare(words_a, words_b) {
                        Ordering::Equal => {}
                        ord => return ord,
                    }
                }
            }
        }
    }

    /// Non-empty buckets as `(offset, words)` in ascending order. The
    /// flat representation is chunked into node-sized pieces.
    fn buckets(&self) -> Box<dyn Iterator<Item = (u32, &[u64])> + '_> {
        match &self.repr {
            Repr::Dense(vals) => Box::new(
                vals.chunks(WORDS_PER_NODE)
                    .enumerate()
                    .filter(|(_, chunk)| !words::is_empty(chunk))
                    .map(|(i, chunk)| (i as u32 * BITS_PER_NODE, chunk)),
            ),
            Repr::Sparse(nodes) => Box::new(
                nodes
                    .iter()
                    .filter(|(_, node)| !node.is_empty())
                    .map(|(&offset, node)| (offset, &node.words[..])),
            ),
        }
    }
}

impl Default for SparseBitSet {
    fn default() -> Self {
        SparseBitSet::new(0)
    }
}

impl Clone for SparseBitSet {
    /// Deep copy. Empty buckets of the sparse representation are not
    /// carried over.
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            Repr::Dense(vals) => Repr::Dense(vals.clone()),
            Repr::Sparse(nodes) => Repr::Sparse(
                nodes
                    .iter()
                    .filter(|(_, node)| !node.is_empty())
                    .map(|(&offset, node)| (offset, node.clone()))
                    .collect(),
            ),
        };
        SparseBitSet {
            repr,
            capacity: self.capacity,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if let (Repr::Dense(dst), Repr::Dense(src)) = (&mut self.repr, &source.repr) {
            dst.clone_from(src);
            self.capacity = source.capacity;
            return;
        }
        *self = source.clone();
    }
}

impl PartialEq for SparseBitSet {
    fn eq(&self, other: &Self) -> bool {
        self.capacity == other.capacity && self.compare(other) == Ordering::Equal
    }
}

impl Eq for SparseBitSet {}

impl PartialOrd for SparseBitSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SparseBitSet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.capacity
            .cmp(&other.capacity)
            .then_with(|| self.compare(other))
    }
}

impl Debug for SparseBitSet {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Extend<u32> for SparseBitSet {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for bit in iter {
            self.insert(bit);
        }
    }
}

impl<'a> IntoIterator for &'a SparseBitSet {
    type Item = u32;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
