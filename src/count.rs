//! The counting/projection constructor turning a parsed DFA into a weighted
//! automaton, and label remapping.
//!
//! Projection restricts every label tuple to a chosen coordinate subset and
//! re-interns the result into a fresh, smaller alphabet. The initial weights
//! of the counting automaton come from a forward fixed point along the
//! all-zero padding label: numeration systems pad numbers with leading
//! zeroes, so the steady-state distribution reachable under infinite padding
//! is what a "count of accepting numbers with this prefix" semantics needs.

use crate::mapper::{Coord, LabelMapper};
use crate::walnut::RawDfa;
use crate::weight::{self, Weight};
use crate::wfa::{StateId, Wfa};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors of the counting constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountError {
    /// The padding fixed point did not stabilize. This only happens on inputs
    /// whose projected zero-label subgraph feeds mass into a growing cycle,
    /// which no Walnut-emitted DFA does.
    #[error("zero-label fixed point did not stabilize within {0} rounds")]
    NoFixedPoint(usize),
}

/// Builds the counting automaton of `dfa` projected onto the label
/// coordinates in `vars`, with the identity relabeling. See
/// [`dfa_count_with`].
pub fn dfa_count(
    dfa: &RawDfa,
    mapper: &LabelMapper,
    vars: &[usize],
) -> Result<(Wfa, LabelMapper), CountError> {
    dfa_count_with(dfa, mapper, vars, |t| t.to_vec())
}

/// Builds the counting automaton of `dfa` projected onto the label
/// coordinates in `vars`, passing every projected tuple through `remap`
/// before interning it into the fresh projection mapper.
///
/// The automaton has one state per DFA state. Strictly positive DFA outputs
/// become final weights, every projected transition carries weight one, and
/// the initial weights are the fixed point of propagating a unit mass from
/// state 0 along all-zero-labeled edges.
pub fn dfa_count_with(
    dfa: &RawDfa,
    mapper: &LabelMapper,
    vars: &[usize],
    remap: impl Fn(&[Coord]) -> Vec<Coord>,
) -> Result<(Wfa, LabelMapper), CountError> {
    let mut proj_map = LabelMapper::new();
    for (_, tuple) in mapper.entries() {
        let projected: Vec<Coord> = vars.iter().map(|&i| tuple[i]).collect();
        proj_map.get(remap(&projected));
    }

    let mut a = Wfa::new(proj_map.ids());
    if dfa.state_count() == 0 {
        return Ok((a, proj_map));
    }
    a.add_states(dfa.state_count());

    for (q, &o) in dfa.output.iter().enumerate() {
        if o > 0 {
            a.set_final(q, weight::from_int(o as i64));
        }
    }

    for (q, trans) in dfa.transitions.iter().enumerate() {
        for (tuple, &target) in trans {
            let projected: Vec<Coord> = vars.iter().map(|&i| tuple[i]).collect();
            let label = proj_map.get(remap(&projected));
            a.add_transition(q, label, weight::one(), target);
        }
    }

    let zero_label = proj_map.get(vec![0; vars.len()]);

    // forward fixed point of the unit mass under the padding label; a state
    // without a padding successor keeps its mass, so an automaton without any
    // all-zero edge converges in zero rounds to {state 0: 1}
    let bound = 2 * dfa.state_count() + 2;
    let mut cur: BTreeMap<StateId, Weight> = BTreeMap::from([(0, weight::one())]);
    let mut rounds = 0;
    loop {
        let mut nxt: BTreeMap<StateId, Weight> = BTreeMap::new();
        for (&q, w) in &cur {
            let mut moved = false;
            for (label, wt, target) in a.edges_from(q) {
                if *label == zero_label {
                    *nxt.entry(*target).or_insert_with(weight::zero) += w * wt;
                    moved = true;
                }
            }
            if !moved {
                *nxt.entry(q).or_insert_with(weight::zero) += w;
            }
        }
        nxt.retain(|_, w| !num_traits::Zero::is_zero(w));
        if nxt == cur {
            break;
        }
        cur = nxt;
        rounds += 1;
        if rounds > bound {
            warn!("padding fixed point still moving after {rounds} rounds, giving up");
            return Err(CountError::NoFixedPoint(rounds));
        }
    }

    for (q, w) in cur {
        a.set_initial(q, w);
    }

    debug!(
        "counting automaton: {} states, {} transitions, {} projected labels, fixed point after {} rounds",
        a.state_count(),
        a.transition_count(),
        proj_map.len(),
        rounds
    );
    Ok((a, proj_map))
}

/// Rebuilds `a` with every transition label's tuple passed through `reorder`
/// and re-interned into `mapper`. Topology, weights and initial/final
/// assignments are untouched; new reordered tuples may extend the mapper as a
/// side effect.
pub fn remap_labels(
    a: &Wfa,
    mapper: &mut LabelMapper,
    reorder: impl Fn(&[Coord]) -> Vec<Coord>,
) -> Wfa {
    let remapped: Vec<(StateId, crate::mapper::LabelId, Weight, StateId)> = a
        .transitions()
        .map(|(q, label, w, target)| {
            let reordered = reorder(&mapper[label]);
            (q, mapper.get(reordered), w.clone(), target)
        })
        .collect();

    let mut b = Wfa::new(
        a.alphabet()
            .iter()
            .copied()
            .chain(remapped.iter().map(|&(_, l, _, _)| l)),
    );
    b.add_states(a.state_count());
    for (q, w) in a.initial_weights() {
        b.set_initial(q, w.clone());
    }
    for (q, w) in a.final_weights() {
        b.set_final(q, w.clone());
    }
    for (q, label, w, target) in remapped {
        b.add_transition(q, label, w, target);
    }
    b
}
