use std::{hash::Hash, sync::Arc};

use hashbrown::HashSet;

/// Hash-conses values so structurally equal values share one allocation
#[derive(Debug)]
pub struct Memoize<T>(HashSet<Arc<T>>);

impl<T> Default for Memoize<T> {
    fn default() -> Self { Self(HashSet::new()) }
}

impl<T: Eq + Hash> Memoize<T> {
    pub fn memoize(&mut self, val: T) -> Arc<T> {
        if let Some(arc) = self.0.get(&val) {
            return Arc::clone(arc);
        }

        let arc = Arc::new(val);
        self.0.insert(Arc::clone(&arc));
        arc
    }

    #[inline]
    pub fn len(&self) -> usize { self.0.len() }
}

#[cfg(test)]
mod test {
    use std::{collections::BTreeSet, sync::Arc};

    use super::Memoize;

    #[test]
    fn shares_equal_values() {
        let mut memo = Memoize::default();
        let a = memo.memoize(BTreeSet::from([1_u32, 2, 3]));
        let b = memo.memoize(BTreeSet::from([3, 2, 1]));
        let c = memo.memoize(BTreeSet::from([4]));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(memo.len(), 2);
    }
}
