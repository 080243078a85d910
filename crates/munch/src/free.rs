use std::mem;

pub trait Succ {
    #[must_use]
    fn succ(self) -> Self;
}

macro_rules! succ {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Succ for $ty {
                #[inline]
                fn succ(self) -> Self { self + 1 }
            }
        )*
    };
}

succ!(u32, usize);

/// Allocator for fresh, never-repeated labels
#[derive(Debug, Default)]
#[repr(transparent)]
pub struct Free<T>(T);

impl<T> From<T> for Free<T> {
    fn from(val: T) -> Self { Self(val) }
}

impl<T: Copy + Succ> Free<T> {
    #[must_use]
    pub fn fresh(&mut self) -> T {
        let succ = self.0.succ();
        mem::replace(&mut self.0, succ)
    }
}
