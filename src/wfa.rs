//! Weighted finite automata over interned label alphabets.
//!
//! A [`Wfa`] is a directed multigraph of states. Every transition carries a
//! [`LabelId`] and an exact-rational weight; every state may carry an initial
//! and/or a final weight, with absence meaning zero. Nothing forces
//! determinism: several transitions may leave a state under the same label,
//! including parallel duplicates, and the weighted language is the usual
//! sum-over-paths evaluation.

use crate::mapper::LabelId;
use crate::math::Map;
use crate::weight::{self, Weight};
use num_traits::Zero;
use std::collections::BTreeSet;

pub mod algebra;
pub mod reduce;

/// Index of a state within a [`Wfa`].
pub type StateId = usize;

/// A single state: its optional initial/final weights and its outgoing edges.
#[derive(Clone, Debug, Default, PartialEq)]
struct WfaState {
    initial: Option<Weight>,
    terminal: Option<Weight>,
    edges: Vec<(LabelId, Weight, StateId)>,
}

/// A weighted automaton over a fixed finite alphabet of label codes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Wfa {
    alphabet: BTreeSet<LabelId>,
    states: Vec<WfaState>,
}

impl Wfa {
    /// Creates an empty automaton over the given alphabet.
    pub fn new(alphabet: impl IntoIterator<Item = LabelId>) -> Self {
        Self {
            alphabet: alphabet.into_iter().collect(),
            states: Vec::new(),
        }
    }

    /// The alphabet this automaton is defined over.
    pub fn alphabet(&self) -> &BTreeSet<LabelId> {
        &self.alphabet
    }

    /// Adds a fresh state without weights and returns its index.
    pub fn add_state(&mut self) -> StateId {
        self.states.push(WfaState::default());
        self.states.len() - 1
    }

    /// Adds `n` fresh states, returning the index of the first one.
    pub fn add_states(&mut self, n: usize) -> StateId {
        let first = self.states.len();
        self.states
            .extend(std::iter::repeat_with(WfaState::default).take(n));
        first
    }

    /// The number of states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// The total number of transitions.
    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.edges.len()).sum()
    }

    /// Iterates over all state indices.
    pub fn states(&self) -> impl Iterator<Item = StateId> {
        0..self.states.len()
    }

    /// Sets the initial weight of `q`. A zero weight clears the assignment.
    pub fn set_initial(&mut self, q: StateId, w: Weight) {
        self.states[q].initial = if w.is_zero() { None } else { Some(w) };
    }

    /// Sets the final weight of `q`. A zero weight clears the assignment.
    pub fn set_final(&mut self, q: StateId, w: Weight) {
        self.states[q].terminal = if w.is_zero() { None } else { Some(w) };
    }

    /// The initial weight of `q`, zero if absent.
    pub fn initial_weight(&self, q: StateId) -> Weight {
        self.states[q].initial.clone().unwrap_or_else(weight::zero)
    }

    /// The final weight of `q`, zero if absent.
    pub fn final_weight(&self, q: StateId) -> Weight {
        self.states[q].terminal.clone().unwrap_or_else(weight::zero)
    }

    /// Iterates over the states carrying a nonzero initial weight.
    pub fn initial_weights(&self) -> impl Iterator<Item = (StateId, &Weight)> {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(q, s)| s.initial.as_ref().map(|w| (q, w)))
    }

    /// Iterates over the states carrying a nonzero final weight.
    pub fn final_weights(&self) -> impl Iterator<Item = (StateId, &Weight)> {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(q, s)| s.terminal.as_ref().map(|w| (q, w)))
    }

    /// Adds a transition from `q` to `target` under `label` with the given
    /// weight. Parallel duplicates are kept; evaluation sums over them.
    pub fn add_transition(&mut self, q: StateId, label: LabelId, w: Weight, target: StateId) {
        assert!(
            q < self.states.len() && target < self.states.len(),
            "source {q} or target {target} state does not exist"
        );
        self.states[q].edges.push((label, w, target));
    }

    /// The outgoing edges of `q` as `(label, weight, target)` triples.
    pub fn edges_from(&self, q: StateId) -> &[(LabelId, Weight, StateId)] {
        &self.states[q].edges
    }

    pub(crate) fn edges_from_mut(&mut self, q: StateId) -> &mut Vec<(LabelId, Weight, StateId)> {
        &mut self.states[q].edges
    }

    /// Iterates over all transitions as `(source, label, weight, target)`.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, LabelId, &Weight, StateId)> {
        self.states.iter().enumerate().flat_map(|(q, s)| {
            s.edges
                .iter()
                .map(move |(label, w, target)| (q, *label, w, *target))
        })
    }

    /// Evaluates the weighted language on `word`: the sum over all paths from
    /// an initial to a final state reading `word`, of the product of the
    /// initial weight, the transition weights and the final weight.
    pub fn eval(&self, word: &[LabelId]) -> Weight {
        let mut cur: Map<StateId, Weight> = self
            .initial_weights()
            .map(|(q, w)| (q, w.clone()))
            .collect();

        for &letter in word {
            let mut nxt: Map<StateId, Weight> = Map::default();
            for (q, w) in cur {
                for (label, wt, target) in self.edges_from(q) {
                    if *label == letter {
                        *nxt.entry(*target).or_insert_with(weight::zero) += &w * wt;
                    }
                }
            }
            cur = nxt;
        }

        cur.into_iter()
            .map(|(q, w)| w * self.final_weight(q))
            .fold(weight::zero(), |acc, w| acc + w)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mapper::LabelMapper;
    use crate::weight::from_int;

    /// The two-state automaton counting binary representations: weight 1 for
    /// every word of the form 0*11 0*. Reused by several test modules.
    pub(crate) fn diagonal_pair() -> (Wfa, LabelMapper) {
        let mut mapper = LabelMapper::new();
        let z = mapper.get(vec![0, 0]);
        let o = mapper.get(vec![1, 1]);

        let mut a = Wfa::new([z, o]);
        let q0 = a.add_state();
        let q1 = a.add_state();
        a.set_initial(q0, from_int(1));
        a.set_final(q1, from_int(1));
        a.add_transition(q0, z, from_int(1), q0);
        a.add_transition(q0, o, from_int(1), q1);
        a.add_transition(q1, z, from_int(1), q1);
        (a, mapper)
    }

    #[test]
    fn zero_weight_clears_assignments() {
        let (mut a, _) = diagonal_pair();
        assert_eq!(a.initial_weights().count(), 1);
        a.set_initial(0, from_int(0));
        assert_eq!(a.initial_weights().count(), 0);
        assert_eq!(a.initial_weight(0), from_int(0));
    }

    #[test]
    fn eval_sums_over_paths() {
        let (a, mapper) = diagonal_pair();
        let z = mapper.id_of(&[0, 0]).unwrap();
        let o = mapper.id_of(&[1, 1]).unwrap();

        assert_eq!(a.eval(&[]), from_int(0));
        assert_eq!(a.eval(&[o]), from_int(1));
        assert_eq!(a.eval(&[z, o, z]), from_int(1));
        assert_eq!(a.eval(&[o, o]), from_int(0));
    }

    #[test]
    fn parallel_duplicate_transitions_sum() {
        let mut mapper = LabelMapper::new();
        let l = mapper.get(vec![1]);
        let mut a = Wfa::new([l]);
        let q0 = a.add_state();
        let q1 = a.add_state();
        a.set_initial(q0, from_int(1));
        a.set_final(q1, from_int(1));
        a.add_transition(q0, l, from_int(2), q1);
        a.add_transition(q0, l, from_int(3), q1);
        assert_eq!(a.transition_count(), 2);
        assert_eq!(a.eval(&[l]), from_int(5));
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn transition_to_missing_state_panics() {
        let mut a = Wfa::new([]);
        let q = a.add_state();
        a.add_transition(q, LabelId::from(0), from_int(1), q + 1);
    }
}
