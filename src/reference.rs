use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// An edge in the shared BDD graph: a node id combined with a complement bit.
///
/// The least significant bit holds the polarity, the remaining bits hold the node id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Ref(u32);

impl Ref {
    pub const fn new(id: u32, negated: bool) -> Self {
        assert!(id < 0x8000_0000, "Node id does not fit into 31 bits");
        Self((id << 1) | (negated as u32))
    }

    pub const fn positive(id: u32) -> Self {
        Self::new(id, false)
    }

    pub const fn negative(id: u32) -> Self {
        Self::new(id, true)
    }

    /// Return the id of the node this edge points to.
    #[inline]
    pub const fn id(self) -> u32 {
        self.0 >> 1
    }

    /// Return the id of the node as an index into the storage.
    #[inline]
    pub const fn index(self) -> usize {
        (self.0 >> 1) as usize
    }

    #[inline]
    pub const fn is_negated(self) -> bool {
        (self.0 & 1) != 0
    }

    /// Drop the complement bit.
    #[inline]
    pub const fn regular(self) -> Self {
        Self(self.0 & !1)
    }

    /// Return the internal representation of the reference.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0 ^ 1)
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}",
            if self.is_negated() { "~" } else { "" },
            self.id()
        )
    }
}
