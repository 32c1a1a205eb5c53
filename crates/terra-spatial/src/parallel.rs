//! Row/ray fan-out shim.
//!
//! With the `threading` feature this re-exports rayon's prelude. Without it,
//! `into_par_iter()` falls back to `into_iter()` so operator code reads the
//! same either way and the rest of the chain resolves to `Iterator` methods.
#[cfg(feature = "threading")]
pub use rayon::prelude::*;

#[cfg(not(feature = "threading"))]
mod sequential {
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "threading"))]
pub use sequential::*;
