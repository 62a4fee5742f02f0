//! Interning of multi-dimensional transition labels.
//!
//! Walnut transitions are labeled by tuples of small integers, one coordinate
//! per numeration-system variable. Working with tuples directly is wasteful,
//! so every tuple is interned into a dense [`LabelId`] and the automata only
//! ever see ids. A [`LabelMapper`] owns the bijection for one alphabet; ids
//! from different mappers are not interchangeable.

use crate::math::Map;
use std::fmt::Display;
use std::ops::{Deref, Index};

/// One coordinate of a label tuple.
pub type Coord = i32;

/// Dense code identifying an interned label tuple within one [`LabelMapper`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct LabelId(usize);

impl Display for LabelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for LabelId {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<usize> for LabelId {
    fn from(i: usize) -> Self {
        Self(i)
    }
}

impl From<LabelId> for usize {
    fn from(i: LabelId) -> Self {
        i.0
    }
}

/// Bijection between label tuples and dense [`LabelId`]s.
///
/// Ids are handed out in first-seen order; [`LabelMapper::sorted_ids`] gives
/// the canonical enumeration by lexicographic tuple order, which is what every
/// algorithm needing a reproducible alphabet order iterates over.
#[derive(Clone, Debug, Default)]
pub struct LabelMapper {
    to_id: Map<Vec<Coord>, LabelId>,
    to_tuple: Vec<Vec<Coord>>,
}

impl LabelMapper {
    /// Creates an empty mapper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `tuple`, interning it first if it was never seen.
    pub fn get(&mut self, tuple: Vec<Coord>) -> LabelId {
        if let Some(&id) = self.to_id.get(&tuple) {
            return id;
        }
        let id = LabelId(self.to_tuple.len());
        self.to_id.insert(tuple.clone(), id);
        self.to_tuple.push(tuple);
        id
    }

    /// Looks up the id of `tuple` without interning it.
    pub fn id_of(&self, tuple: &[Coord]) -> Option<LabelId> {
        self.to_id.get(tuple).copied()
    }

    /// Returns the tuple behind `id`, or `None` if the id was never assigned
    /// by this mapper.
    pub fn tuple(&self, id: LabelId) -> Option<&[Coord]> {
        self.to_tuple.get(id.0).map(|t| t.as_slice())
    }

    /// The number of interned tuples.
    pub fn len(&self) -> usize {
        self.to_tuple.len()
    }

    /// Whether no tuple has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.to_tuple.is_empty()
    }

    /// The arity of the interned tuples. Tuples of one alphabet all share the
    /// same length, so the first one is as good as any.
    pub fn arity(&self) -> Option<usize> {
        self.to_tuple.first().map(|t| t.len())
    }

    /// All ids in first-seen (insertion) order.
    pub fn ids(&self) -> impl Iterator<Item = LabelId> + '_ {
        (0..self.to_tuple.len()).map(LabelId)
    }

    /// All interned tuples together with their ids, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (LabelId, &[Coord])> + '_ {
        self.to_tuple
            .iter()
            .enumerate()
            .map(|(i, t)| (LabelId(i), t.as_slice()))
    }

    /// All ids, ordered by lexicographic order of the underlying tuples.
    pub fn sorted_ids(&self) -> Vec<LabelId> {
        let mut ids: Vec<LabelId> = self.ids().collect();
        ids.sort_by(|a, b| self.to_tuple[a.0].cmp(&self.to_tuple[b.0]));
        ids
    }
}

impl Index<LabelId> for LabelMapper {
    type Output = [Coord];

    fn index(&self, id: LabelId) -> &Self::Output {
        &self.to_tuple[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_a_bijection() {
        let mut m = LabelMapper::new();
        let a = m.get(vec![0, 1]);
        let b = m.get(vec![1, 0]);
        let a2 = m.get(vec![0, 1]);
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(m.tuple(a), Some(&[0, 1][..]));
        assert_eq!(m.tuple(b), Some(&[1, 0][..]));
        assert_eq!(m.len(), 2);
        for id in m.ids() {
            assert_eq!(m.id_of(&m[id].to_vec()), Some(id));
        }
    }

    #[test]
    fn ids_follow_first_seen_order() {
        let mut m = LabelMapper::new();
        assert_eq!(*m.get(vec![5, 5]), 0);
        assert_eq!(*m.get(vec![0, 0]), 1);
        assert_eq!(*m.get(vec![5, 5]), 0);
        assert_eq!(*m.get(vec![2, 2]), 2);
    }

    #[test]
    fn sorted_ids_use_lexicographic_tuple_order() {
        let mut m = LabelMapper::new();
        let c = m.get(vec![1, 1]);
        let a = m.get(vec![0, 1]);
        let b = m.get(vec![0, 0]);
        assert_eq!(m.sorted_ids(), vec![b, a, c]);
    }

    #[test]
    fn unknown_id_yields_none() {
        let m = LabelMapper::new();
        assert_eq!(m.tuple(LabelId::from(3)), None);
        assert!(m.is_empty());
        assert_eq!(m.arity(), None);
    }
}
