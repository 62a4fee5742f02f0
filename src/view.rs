//! Recipes deriving comparison and difference automata.
//!
//! All functions here are pure: they clone their input and return a new
//! automaton, so no caller-visible value is ever mutated. The central device
//! is [`modify_transitions`], which makes every non-`z` label behave, weight
//! wise, exactly like the distinguished `z` label. Summing the sign-flipped
//! result with the original yields the difference between actual behavior and
//! `z`-biased behavior, which is how first-difference sequences of counting
//! functions are extracted.

use crate::mapper::LabelId;
use crate::math::Map;
use crate::weight::{self, Weight};
use crate::wfa::algebra::{product, sum};
use crate::wfa::reduce::reduce;
use crate::wfa::{StateId, Wfa};
use std::collections::BTreeSet;
use tracing::debug;

/// Returns `a` with every initial weight negated. Realizes automaton
/// subtraction as `sum(a, opposite(b))`.
pub fn opposite(a: &Wfa) -> Wfa {
    let mut res = a.clone();
    let negated: Vec<(StateId, Weight)> =
        res.initial_weights().map(|(q, w)| (q, -w.clone())).collect();
    for (q, w) in negated {
        res.set_initial(q, w);
    }
    res
}

/// Returns `a` with its initial distribution advanced along `word`: starting
/// from the original initial weights, each letter redistributes the mass over
/// all matching transitions, multiplying weights along the way. If some
/// letter matches no transition from any weighted state, the distribution
/// collapses to all-zero and stays so.
pub fn prefix_absorb(a: &Wfa, word: &[LabelId]) -> Wfa {
    let mut res = a.clone();

    let mut cur: Map<StateId, Weight> = res
        .initial_weights()
        .map(|(q, w)| (q, w.clone()))
        .collect();
    for &letter in word {
        let mut nxt: Map<StateId, Weight> = Map::default();
        for (q, w) in cur {
            for (label, wt, target) in res.edges_from(q) {
                if *label == letter {
                    *nxt.entry(*target).or_insert_with(weight::zero) += &w * wt;
                }
            }
        }
        cur = nxt;
    }

    for q in 0..res.state_count() {
        res.set_initial(q, weight::zero());
    }
    for (q, w) in cur {
        res.set_initial(q, w);
    }
    res
}

/// Returns `a` where, at every state, the non-`z` labels are stripped of
/// their weight and instead re-carry every `z`-successor pair. The `z`
/// successors are also re-added under `z` itself, so a state that already had
/// a `z` edge ends up with duplicate parallel transitions whose weights sum.
pub fn modify_transitions(a: &Wfa, z: LabelId) -> Wfa {
    let mut res = a.clone();
    for q in 0..res.state_count() {
        let mut ztrans: Vec<(StateId, Weight)> = Vec::new();
        let mut labels: BTreeSet<LabelId> = BTreeSet::new();

        for (label, w, target) in res.edges_from_mut(q).iter_mut() {
            if *label == z {
                ztrans.push((*target, w.clone()));
            } else {
                labels.insert(*label);
                *w = weight::zero();
            }
        }

        labels.insert(z);
        for label in labels {
            for (target, w) in &ztrans {
                res.add_transition(q, label, w.clone(), *target);
            }
        }
    }
    res
}

/// The "view" of `a` at `z`: the difference between `a` and its `z`-biased
/// modification, i.e. `sum(a, reduce(opposite(modify_transitions(a, z))))`.
pub fn gview(a: &Wfa, z: LabelId) -> Wfa {
    let biased = reduce(&opposite(&modify_transitions(a, z)));
    sum(a, &biased)
}

/// Conditions `a` on the prefix `word`, takes its view at `zero` and reduces.
/// With a companion automaton, the companion is conditioned on the same
/// prefix and both are combined by synchronized product before reducing, so
/// two sequences can be co-tracked from the same point.
pub fn fromthere(a: &Wfa, zero: LabelId, word: &[LabelId], companion: Option<&Wfa>) -> Wfa {
    let su = prefix_absorb(a, word);
    let cur = gview(&su, zero);
    let res = match companion {
        None => reduce(&cur),
        Some(sup) => {
            let curs = prefix_absorb(sup, word);
            reduce(&product(&cur, &curs))
        }
    };
    debug!(
        "fromthere over a word of length {} yields {} states",
        word.len(),
        res.state_count()
    );
    res
}
