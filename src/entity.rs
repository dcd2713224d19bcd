//! Typed indices for blocks and values, and tables keyed by them.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A dense index newtype.
pub trait EntityRef: Copy + Eq + Ord + Hash {
    fn new(index: usize) -> Self;
    fn index(self) -> usize;
}

/// Declare a `u32` index type that prints as `<prefix><index>`, e.g.
/// `entity!(Block, "block")` prints `block3`.
#[macro_export]
macro_rules! entity {
    ($name:tt, $prefix:tt) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $crate::entity::EntityRef for $name {
            fn new(index: usize) -> Self {
                assert!(index < u32::MAX as usize, "{} index out of range", $prefix);
                $name(index as u32)
            }
            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl $name {
            /// The raw index, as used for bitset membership.
            pub fn as_u32(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                std::fmt::Display::fmt(self, f)
            }
        }
    };
}

/// Owning storage where `push` hands out the next index.
#[derive(Clone, Debug)]
pub struct EntityVec<Idx: EntityRef, T: Clone + Debug> {
    items: Vec<T>,
    _idx: PhantomData<Idx>,
}

impl<Idx: EntityRef, T: Clone + Debug> Default for EntityVec<Idx, T> {
    fn default() -> Self {
        EntityVec {
            items: vec![],
            _idx: PhantomData,
        }
    }
}

impl<Idx: EntityRef, T: Clone + Debug> EntityVec<Idx, T> {
    pub fn push(&mut self, item: T) -> Idx {
        self.items.push(item);
        Idx::new(self.items.len() - 1)
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Every allocated index, in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Idx> {
        (0..self.items.len()).map(Idx::new)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn entries(&self) -> impl Iterator<Item = (Idx, &T)> {
        self.iter().zip(self.items.iter())
    }
}

impl<Idx: EntityRef, T: Clone + Debug> Index<Idx> for EntityVec<Idx, T> {
    type Output = T;
    fn index(&self, idx: Idx) -> &T {
        &self.items[idx.index()]
    }
}

impl<Idx: EntityRef, T: Clone + Debug> IndexMut<Idx> for EntityVec<Idx, T> {
    fn index_mut(&mut self, idx: Idx) -> &mut T {
        &mut self.items[idx.index()]
    }
}

/// Per-entity side table. Entries never written read as `T::default()`;
/// writing past the end grows the table.
#[derive(Clone, Debug)]
pub struct PerEntity<Idx: EntityRef, T: Clone + Debug + Default> {
    items: Vec<T>,
    fallback: T,
    _idx: PhantomData<Idx>,
}

impl<Idx: EntityRef, T: Clone + Debug + Default> Default for PerEntity<Idx, T> {
    fn default() -> Self {
        PerEntity {
            items: vec![],
            fallback: T::default(),
            _idx: PhantomData,
        }
    }
}

impl<Idx: EntityRef, T: Clone + Debug + Default> Index<Idx> for PerEntity<Idx, T> {
    type Output = T;
    fn index(&self, idx: Idx) -> &T {
        self.items.get(idx.index()).unwrap_or(&self.fallback)
    }
}

impl<Idx: EntityRef, T: Clone + Debug + Default> IndexMut<Idx> for PerEntity<Idx, T> {
    fn index_mut(&mut self, idx: Idx) -> &mut T {
        if idx.index() >= self.items.len() {
            self.items.resize(idx.index() + 1, T::default());
        }
        &mut self.items[idx.index()]
    }
}
