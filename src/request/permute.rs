use std::cmp::Ordering;

use crate::error::{Error, Result};

/// A reordering computed once from a key sequence and applied to every
/// sequence co-indexed with it, so parallel arrays can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    order: Vec<usize>,
}

impl Permutation {
    /// Stable-sorts the indices of `keys` with `compare`.
    pub fn sorting_by<T, F>(keys: &[T], mut compare: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| compare(&keys[a], &keys[b]));
        Self { order }
    }

    /// Stable-sorts the indices of `keys` in ascending order.
    pub fn sorting<T: Ord>(keys: &[T]) -> Self {
        Self::sorting_by(keys, Ord::cmp)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.order.iter().enumerate().all(|(i, &j)| i == j)
    }

    /// Source index that lands at each output position.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Moves `items` into permuted order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `items` is not co-indexed with the
    /// keys this permutation was computed from.
    pub fn apply<T>(&self, items: Vec<T>) -> Result<Vec<T>> {
        if items.len() != self.order.len() {
            return Err(Error::validation(format!(
                "cannot permute {} items with a permutation of {}",
                items.len(),
                self.order.len()
            )));
        }
        if self.is_identity() {
            return Ok(items);
        }
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        Ok(self
            .order
            .iter()
            .filter_map(|&source| slots[source].take())
            .collect())
    }

    /// Applies the permutation to every sequence in `lists`.
    ///
    /// # Errors
    ///
    /// Fails on the first list that is not co-indexed with the keys.
    pub fn apply_each<T>(&self, lists: Vec<Vec<T>>) -> Result<Vec<Vec<T>>> {
        lists.into_iter().map(|list| self.apply(list)).collect()
    }
}
