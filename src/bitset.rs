//! Dense bit set keyed by node index.
//!
//! Backs the per-node scratch marks that graph traversals paint and unpaint.

/// A growable bit set backed by `u64` words.
#[derive(Debug, Clone, Default)]
pub struct BitSet {
    words: Vec<u64>,
    /// Number of set bits.
    count: usize,
}

impl BitSet {
    const BITS_PER_WORD: usize = 64;

    /// Creates an empty bit set able to hold `capacity` bits without growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(Self::BITS_PER_WORD)],
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn locate(index: usize) -> (usize, u64) {
        (
            index / Self::BITS_PER_WORD,
            1u64 << (index % Self::BITS_PER_WORD),
        )
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        let (word, mask) = Self::locate(index);
        self.words.get(word).is_some_and(|w| w & mask != 0)
    }

    /// Sets the bit. Returns true if it was previously clear.
    pub fn insert(&mut self, index: usize) -> bool {
        let (word, mask) = Self::locate(index);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let was_clear = self.words[word] & mask == 0;
        if was_clear {
            self.words[word] |= mask;
            self.count += 1;
        }
        was_clear
    }

    /// Clears the bit. Returns true if it was previously set.
    pub fn remove(&mut self, index: usize) -> bool {
        let (word, mask) = Self::locate(index);
        let Some(w) = self.words.get_mut(word) else {
            return false;
        };
        let was_set = *w & mask != 0;
        if was_set {
            *w &= !mask;
            self.count -= 1;
        }
        was_set
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
        self.count = 0;
    }

    /// Iterates over set bit indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(i * Self::BITS_PER_WORD + bit)
            })
        })
    }
}
