use std::{
    borrow::BorrowMut,
    collections::{BTreeSet, VecDeque},
};

/// Worklist solver for reachability closures.
///
/// Elements are expanded at most once: an element is only expanded when it is
/// newly inserted into the output set, so cyclic successor relations
/// terminate without recursion.
#[derive(Debug)]
pub struct ClosureBuilder<T>(VecDeque<T>);

impl<T> Default for ClosureBuilder<T> {
    #[inline]
    fn default() -> Self { Self(VecDeque::new()) }
}

impl<T> ClosureBuilder<T> {
    #[inline]
    pub fn init<I: IntoIterator<Item = T>>(&mut self, it: I) {
        assert!(self.0.is_empty());
        self.0.extend(it);
    }
}

impl<T: Clone + Ord> ClosureBuilder<T> {
    pub fn solve<S: BorrowMut<BTreeSet<T>>, I: IntoIterator<Item = T>>(
        &mut self,
        mut set: S,
        f: impl Fn(&T) -> I,
    ) -> S {
        {
            let set = set.borrow_mut();

            while let Some(el) = self.0.pop_front() {
                if !set.contains(&el) {
                    self.0.extend(f(&el));
                    set.insert(el);
                }
            }
        }

        set
    }
}
