//! The automaton algebra the pipeline composes with: weighted sum and
//! synchronized product.

use super::{StateId, Wfa};
use crate::math::Map;
use tracing::debug;

/// Disjoint union of two automata. Initial and final weight assignments are
/// carried over unchanged, so the weighted language is the pointwise sum of
/// the two operands' languages.
pub fn sum(a: &Wfa, b: &Wfa) -> Wfa {
    let mut res = Wfa::new(a.alphabet().iter().chain(b.alphabet()).copied());

    res.add_states(a.state_count());
    let offset = res.add_states(b.state_count());

    for (q, w) in a.initial_weights() {
        res.set_initial(q, w.clone());
    }
    for (q, w) in a.final_weights() {
        res.set_final(q, w.clone());
    }
    for (q, label, w, target) in a.transitions() {
        res.add_transition(q, label, w.clone(), target);
    }

    for (q, w) in b.initial_weights() {
        res.set_initial(offset + q, w.clone());
    }
    for (q, w) in b.final_weights() {
        res.set_final(offset + q, w.clone());
    }
    for (q, label, w, target) in b.transitions() {
        res.add_transition(offset + q, label, w.clone(), offset + target);
    }

    debug!(
        "sum of {}+{} states yields {} states",
        a.state_count(),
        b.state_count(),
        res.state_count()
    );
    res
}

/// Synchronized product of two automata: both advance simultaneously on
/// matching labels, and all weights multiply. Only state pairs reachable from
/// a pair of initially weighted states are materialized.
pub fn product(a: &Wfa, b: &Wfa) -> Wfa {
    let mut res = Wfa::new(a.alphabet().intersection(b.alphabet()).copied());

    let mut index: Map<(StateId, StateId), StateId> = Map::default();
    let mut stack: Vec<(StateId, StateId)> = Vec::new();

    for (qa, wa) in a.initial_weights() {
        for (qb, wb) in b.initial_weights() {
            let q = res.add_state();
            index.insert((qa, qb), q);
            res.set_initial(q, wa * wb);
            stack.push((qa, qb));
        }
    }

    while let Some((qa, qb)) = stack.pop() {
        let q = index[&(qa, qb)];
        res.set_final(q, a.final_weight(qa) * b.final_weight(qb));

        let mut new_edges = Vec::new();
        for (la, wa, ta) in a.edges_from(qa) {
            for (lb, wb, tb) in b.edges_from(qb) {
                if la != lb {
                    continue;
                }
                let pair = (*ta, *tb);
                let target = match index.get(&pair) {
                    Some(&t) => t,
                    None => {
                        let t = res.add_state();
                        index.insert(pair, t);
                        stack.push(pair);
                        t
                    }
                };
                new_edges.push((*la, wa * wb, target));
            }
        }
        for (label, w, target) in new_edges {
            res.add_transition(q, label, w, target);
        }
    }

    debug!(
        "product of {}x{} states yields {} reachable pairs",
        a.state_count(),
        b.state_count(),
        res.state_count()
    );
    res
}
