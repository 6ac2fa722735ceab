use crate::reference::Ref;
use crate::types::Var;
use crate::utils::{pairing3, MyHash};

/// A decision node as stored in the unique table.
///
/// The high edge is never negated; complements live on the incoming edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Node {
    pub variable: Var,
    pub low: Ref,
    pub high: Ref,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            variable: Var::TERMINAL,
            low: Ref::positive(0),
            high: Ref::positive(0),
        }
    }
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        pairing3(
            self.variable.id() as u64,
            self.low.raw() as u64,
            self.high.raw() as u64,
        )
    }
}
