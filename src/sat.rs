use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::reference::Ref;

impl Bdd {
    /// Number of satisfying assignments of `node` over `num_vars` variables.
    ///
    /// `num_vars` must cover every variable `node` depends on.
    pub fn sat_count(&self, node: Ref, num_vars: usize) -> BigUint {
        let max = BigUint::from(1u32) << num_vars;
        let mut cache = HashMap::new();
        self.sat_count_(node, &max, &mut cache)
    }

    // Each node halves the share of assignments coming from either child,
    // so skipped levels need no correction.
    fn sat_count_(&self, node: Ref, max: &BigUint, cache: &mut HashMap<u32, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::ZERO;
        } else if self.is_one(node) {
            return max.clone();
        }

        let count = match cache.get(&node.id()) {
            Some(count) => count.clone(),
            None => {
                let low = self.sat_count_(self.low(node.id()), max, cache);
                let high = self.sat_count_(self.high(node.id()), max, cache);
                let count: BigUint = (low + high) >> 1;
                cache.insert(node.id(), count.clone());
                count
            }
        };

        if node.is_negated() {
            max - count
        } else {
            count
        }
    }
}
