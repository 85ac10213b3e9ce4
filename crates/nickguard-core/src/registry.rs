//! Read-only view of the host's live handle registry
//!
//! The guard never stores or mutates the registry; it only iterates the
//! handles present at call time.

use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;

/// Source of currently assigned handles
///
/// Each active handle is yielded once; order is irrelevant.
pub trait HandleRegistry {
    /// Iterate handles assigned right now
    fn handles(&self) -> impl Iterator<Item = &str> + '_;
}

impl<S: AsRef<str>> HandleRegistry for [S] {
    fn handles(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|h| h.as_ref())
    }
}

impl<S: AsRef<str>> HandleRegistry for Vec<S> {
    fn handles(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|h| h.as_ref())
    }
}

impl<S: AsRef<str>, H: BuildHasher> HandleRegistry for HashSet<S, H> {
    fn handles(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|h| h.as_ref())
    }
}

impl<S: AsRef<str>> HandleRegistry for BTreeSet<S> {
    fn handles(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|h| h.as_ref())
    }
}

impl<R: HandleRegistry + ?Sized> HandleRegistry for &R {
    fn handles(&self) -> impl Iterator<Item = &str> + '_ {
        (**self).handles()
    }
}
