//! Operations on flat arrays of bitset words, shared by the dense
//! representation and by the per-bucket storage of the sparse one.

pub(crate) const WORD_BITS: u32 = 64;

/// Number of words needed to hold `bits` bits.
pub(crate) fn words_for(bits: u32) -> usize {
    ((bits as usize) + (WORD_BITS as usize) - 1) / (WORD_BITS as usize)
}

#[inline]
fn split(bit: u32) -> (usize, u64) {
    ((bit / WORD_BITS) as usize, 1u64 << (bit % WORD_BITS))
}

#[inline]
pub(crate) fn test(words: &[u64], bit: u32) -> bool {
    let (word, mask) = split(bit);
    words[word] & mask != 0
}

/// Set `bit`; returns `true` if it was previously clear.
#[inline]
pub(crate) fn set(words: &mut [u64], bit: u32) -> bool {
    let (word, mask) = split(bit);
    let was_clear = words[word] & mask == 0;
    words[word] |= mask;
    was_clear
}

/// Clear `bit`; returns `true` if it was previously set.
#[inline]
pub(crate) fn clear(words: &mut [u64], bit: u32) -> bool {
    let (word, mask) = split(bit);
    let was_set = words[word] & mask != 0;
    words[word] &= !mask;
    was_set
}

/// `dst |= src`, returning whether any bit of `dst` changed.
pub(crate) fn merge(dst: &mut [u64], src: &[u64]) -> bool {
    debug_assert_eq!(dst.len(), src.len());
    let mut changed = 0;
    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        changed |= s & !*d;
        *d |= s;
    }
    changed != 0
}

pub(crate) fn count(words: &[u64]) -> u32 {
    words.iter().map(|w| w.count_ones()).sum()
}

pub(crate) fn is_empty(words: &[u64]) -> bool {
    words.iter().all(|&w| w == 0)
}

/// First set bit at or after `from`, scanning `words` forward.
pub(crate) fn next_set(words: &[u64], from: u32) -> Option<u32> {
    let mut index = (from / WORD_BITS) as usize;
    if index >= words.len() {
        return None;
    }
    let mut word = words[index] & (!0u64 << (from % WORD_BITS));
    loop {
        if word != 0 {
            return Some(index as u32 * WORD_BITS + word.trailing_zeros());
        }
        index += 1;
        if index == words.len() {
            return None;
        }
        word = words[index];
    }
}

/// Compare two word arrays as little-endian bit strings of equal
/// length, treating missing trailing words as zero.
pub(crate) fn compare(a: &[u64], b: &[u64]) -> std::cmp::Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        if x != y {
            return x.cmp(&y);
        }
    }
    std::cmp::Ordering::Equal
}

/// Ascending positions of the set bits within a word slice.
#[derive(Clone, Debug)]
pub(crate) struct WordBits<'a> {
    words: &'a [u64],
    index: usize,
    word: u64,
}

impl<'a> WordBits<'a> {
    pub(crate) fn starting_at(words: &'a [u64], from: u32) -> Self {
        let index = (from / WORD_BITS) as usize;
        let word = match words.get(index) {
            Some(&w) => w & (!0u64 << (from % WORD_BITS)),
            None => 0,
        };
        WordBits { words, index, word }
    }
}

impl<'a> Iterator for WordBits<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        loop {
            if self.word != 0 {
                let bit = self.word.trailing_zeros();
                self.word &= self.word - 1;
                return Some(self.index as u32 * WORD_BITS + bit);
            }
            self.index += 1;
            if self.index >= self.words.len() {
                return None;
            }
            self.word = self.words[self.index];
        }
    }
}
