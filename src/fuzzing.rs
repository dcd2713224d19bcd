//! Fuzzing-specific utilities.
//!
//! Public/exported only for access by fuzzers.

use crate::bitset::{BitSetOptions, SparseBitSet};
use libfuzzer_sys::arbitrary;

/// Largest capacity a fuzz case will use; keeps every dense set small
/// enough to compare bit-by-bit.
const MAX_CAPACITY: u32 = 1 << 16;

/// One step applied to the sets under test.
#[derive(Clone, Copy, Debug)]
pub enum BitSetOp {
    Insert(u32),
    Remove(u32),
    /// Insert into the secondary set.
    InsertOther(u32),
    /// Merge the secondary set into the primary set.
    Union,
    /// Replace the secondary set with a copy of the primary set.
    Copy,
    Compact,
}

/// A capacity plus a sequence of operations.
#[derive(Clone, Debug)]
pub struct BitSetCase {
    pub capacity: u32,
    pub ops: Vec<BitSetOp>,
}

impl<'a> arbitrary::Arbitrary<'a> for BitSetCase {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let capacity = u.int_in_range(1..=MAX_CAPACITY)?;
        let mut ops = vec![];
        while !u.is_empty() {
            let bit = u.int_in_range(0..=capacity - 1)?;
            let op = match u.int_in_range(0..=5u8)? {
                0 => BitSetOp::Insert(bit),
                1 => BitSetOp::Remove(bit),
                2 => BitSetOp::InsertOther(bit),
                3 => BitSetOp::Union,
                4 => BitSetOp::Copy,
                _ => BitSetOp::Compact,
            };
            ops.push(op);
        }
        Ok(BitSetCase { capacity, ops })
    }
}

/// Apply `case` to a sparse and a dense set side by side, panicking on
/// the first observable difference.
pub fn check_dense_sparse_equivalence(case: &BitSetCase) {
    let dense_options = BitSetOptions::always_dense();
    let mut sparse = SparseBitSet::new(case.capacity);
    let mut dense = SparseBitSet::with_options(case.capacity, &dense_options);
    let mut sparse_other = SparseBitSet::new(case.capacity);
    let mut dense_other = SparseBitSet::with_options(case.capacity, &dense_options);

    for op in &case.ops {
        log::trace!("op: {:?}", op);
        match *op {
            BitSetOp::Insert(bit) => assert_eq!(sparse.insert(bit), dense.insert(bit)),
            BitSetOp::Remove(bit) => assert_eq!(sparse.remove(bit), dense.remove(bit)),
            BitSetOp::InsertOther(bit) => {
                assert_eq!(sparse_other.insert(bit), dense_other.insert(bit))
            }
            BitSetOp::Union => assert_eq!(
                sparse.union_with(&sparse_other),
                dense.union_with(&dense_other)
            ),
            BitSetOp::Copy => {
                sparse_other.clone_from(&sparse);
                dense_other.clone_from(&dense);
            }
            BitSetOp::Compact => {
                sparse.compact();
                dense.compact();
            }
        }
        assert_eq!(sparse.count(), dense.count());
        assert_eq!(sparse, dense);
    }

    assert!(sparse.iter().eq(dense.iter()));
    for bit in 0..case.capacity {
        assert_eq!(sparse.contains(bit), dense.contains(bit));
    }
}
