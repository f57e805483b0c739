#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

#[cfg(feature = "std")]
pub(crate) type RowMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type RowMap<K, V> = BTreeMap<K, V>;

#[cfg(feature = "std")]
pub(crate) type RowSet<K> = HashSet<K>;
#[cfg(not(feature = "std"))]
pub(crate) type RowSet<K> = BTreeSet<K>;

#[cfg(feature = "std")]
#[doc(hidden)]
pub trait ReconcilerKey: core::hash::Hash + Eq + Clone {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq + Clone> ReconcilerKey for K {}

#[cfg(not(feature = "std"))]
#[doc(hidden)]
pub trait ReconcilerKey: Ord + Clone {}
#[cfg(not(feature = "std"))]
impl<K: Ord + Clone> ReconcilerKey for K {}
