//! Hash-consed node storage (the unique table).
//!
//! Values live in a flat vector addressed by index; index 0 is a sentry and is
//! never handed out. Hashed values are chained per bucket through `next`, so
//! `put` returns the index of an equal value if one is already stored.

use std::cmp::min;
use std::ops::Index;

use crate::utils::MyHash;

#[derive(Clone)]
struct Entry<T> {
    value: T,
    next: usize,
    occupied: bool,
    /// Whether the entry is linked into a bucket chain.
    hashed: bool,
}

impl<T> Default for Entry<T>
where
    T: Default,
{
    fn default() -> Self {
        Self {
            value: T::default(),
            next: 0,
            occupied: false,
            hashed: false,
        }
    }
}

pub struct Table<T> {
    data: Vec<Entry<T>>,

    buckets: Vec<usize>,
    bitmask: u64,

    /// Index of the first *possibly* free (non-occupied) cell.
    min_free: usize,
    /// Index of the last occupied cell.
    last_index: usize,
    /// Number of occupied cells.
    real_size: usize,
}

impl<T> Table<T>
where
    T: Default,
{
    /// Create a new table of size `2^bits`.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Storage bits should be in the range 0..=31");

        let capacity = 1 << bits;
        let mut data: Vec<Entry<T>> = Vec::with_capacity(capacity);
        data.resize_with(capacity, Entry::default);
        data[0].occupied = true; // sentry

        let buckets_size = 1 << min(bits, 16);

        Self {
            data,
            buckets: vec![0; buckets_size],
            bitmask: (buckets_size - 1) as u64,
            min_free: 1,
            last_index: 0,
            real_size: 0,
        }
    }
}

impl<T> Table<T> {
    pub fn capacity(&self) -> usize {
        self.data.len()
    }
    /// Get the index of the last occupied cell.
    pub fn size(&self) -> usize {
        self.last_index
    }
    /// Get the number of occupied cells.
    pub fn real_size(&self) -> usize {
        self.real_size
    }

    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        &self.data[index].value
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].occupied
    }

    /// Allocate a cell outside of any bucket chain and return its index.
    pub(crate) fn alloc(&mut self) -> usize {
        let index = (self.min_free..=self.last_index)
            .find(|&i| !self.data[i].occupied)
            .unwrap_or_else(|| {
                self.last_index += 1;
                self.last_index
            });

        if index >= self.capacity() {
            panic!("Storage is full");
        }

        self.data[index].occupied = true;
        self.data[index].hashed = false;
        self.data[index].next = 0;
        self.min_free = index + 1;
        self.real_size += 1;

        index
    }
}

impl<T> Table<T>
where
    T: MyHash + Eq,
{
    fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    fn link(&mut self, index: usize) {
        let bucket = self.bucket_index(&self.data[index].value);
        self.data[index].next = self.buckets[bucket];
        self.data[index].hashed = true;
        self.buckets[bucket] = index;
    }

    /// Put a value into the table and return its index, reusing an equal stored value.
    pub fn put(&mut self, value: T) -> usize {
        let mut index = self.buckets[self.bucket_index(&value)];
        while index != 0 {
            if self.data[index].value == value {
                return index;
            }
            index = self.data[index].next;
        }

        let index = self.alloc();
        self.data[index].value = value;
        self.link(index);
        index
    }

    /// Drop every hashed value for which `keep` returns `false`.
    ///
    /// Bucket chains are rebuilt from the survivors. Returns the number of dropped cells.
    pub fn retain(&mut self, mut keep: impl FnMut(usize, &T) -> bool) -> usize {
        let mut dropped = 0;
        self.buckets.fill(0);
        for index in 1..=self.last_index {
            let entry = &self.data[index];
            if !entry.occupied || !entry.hashed {
                continue;
            }
            if keep(index, &entry.value) {
                self.link(index);
            } else {
                let entry = &mut self.data[index];
                entry.occupied = false;
                entry.hashed = false;
                entry.next = 0;
                self.min_free = min(self.min_free, index);
                self.real_size -= 1;
                dropped += 1;
            }
        }
        dropped
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}
