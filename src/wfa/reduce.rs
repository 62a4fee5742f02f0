//! Weighted-language-preserving reduction of automata over ℚ.
//!
//! This implements the standard two-sided basis reduction for weighted
//! automata over a field: first close the row space spanned by
//! `{λ·μ_w : w ∈ Σ*}` under all letter matrices and rewrite the
//! representation in a basis of that space, then do the same on the
//! transposed representation. The result recognizes the same weighted
//! language with at most as many states, and an automaton whose language is
//! identically zero reduces to zero states.

use crate::matrix::LinearRep;
use crate::weight::{self, Weight};
use crate::wfa::Wfa;
use num_traits::Zero;
use std::collections::BTreeMap;
use tracing::debug;

/// Reduces `a` to a weighted-language-equivalent automaton, typically with
/// fewer states.
pub fn reduce(a: &Wfa) -> Wfa {
    let rep = LinearRep::from_wfa(a);
    let rep = transpose(&left_reduce(&transpose(&left_reduce(&rep))));
    debug!(
        "reduced automaton from {} to {} states",
        a.state_count(),
        rep.dim()
    );
    rep.to_wfa(a.alphabet().iter().copied())
}

fn transpose(rep: &LinearRep) -> LinearRep {
    let n = rep.dim();
    let mu = rep
        .mu()
        .iter()
        .map(|(label, m)| {
            let mut t = vec![vec![weight::zero(); n]; n];
            for (i, row) in m.iter().enumerate() {
                for (j, v) in row.iter().enumerate() {
                    t[j][i] = v.clone();
                }
            }
            (*label, t)
        })
        .collect();
    LinearRep {
        lambda: rep.rho().to_vec(),
        mu,
        rho: rep.lambda().to_vec(),
    }
}

fn row_times(v: &[Weight], m: &[Vec<Weight>]) -> Vec<Weight> {
    let n = v.len();
    let mut res = vec![weight::zero(); n];
    for (i, vi) in v.iter().enumerate() {
        if vi.is_zero() {
            continue;
        }
        for (j, mij) in m[i].iter().enumerate() {
            if !mij.is_zero() {
                res[j] += vi * mij;
            }
        }
    }
    res
}

fn dot(a: &[Weight], b: &[Weight]) -> Weight {
    a.iter()
        .zip(b)
        .map(|(x, y)| x * y)
        .fold(weight::zero(), |acc, w| acc + w)
}

/// A growing basis of a row space, kept alongside an echelonized copy so that
/// membership tests and coordinate extraction stay a single elimination pass.
#[derive(Default)]
struct Basis {
    /// Chosen generator vectors; these become the states of the reduced
    /// representation.
    gens: Vec<Vec<Weight>>,
    /// Echelon forms spanning the same space, `ech[i]` has its pivot at
    /// `pivots[i]` and equals `ech_coords[i] · gens`.
    ech: Vec<Vec<Weight>>,
    pivots: Vec<usize>,
    ech_coords: Vec<Vec<Weight>>,
}

impl Basis {
    fn len(&self) -> usize {
        self.gens.len()
    }

    /// Eliminates `v` against the echelon vectors. Returns the residual and
    /// the combination of generators that was subtracted from `v`.
    fn eliminate(&self, v: &[Weight]) -> (Vec<Weight>, Vec<Weight>) {
        let mut residual = v.to_vec();
        let mut comb = vec![weight::zero(); self.len()];
        for ((e, &p), c) in self.ech.iter().zip(&self.pivots).zip(&self.ech_coords) {
            if residual[p].is_zero() {
                continue;
            }
            let f = &residual[p] / &e[p];
            for (r, ev) in residual.iter_mut().zip(e) {
                *r -= &f * ev;
            }
            for (cv, coeff) in comb.iter_mut().zip(c) {
                *cv += &f * coeff;
            }
        }
        (residual, comb)
    }

    /// Inserts `v` if it is independent of the current generators. Returns
    /// `true` when a new generator was added.
    fn insert(&mut self, v: Vec<Weight>) -> bool {
        let (residual, comb) = self.eliminate(&v);
        let Some(pivot) = residual.iter().position(|x| !x.is_zero()) else {
            return false;
        };
        // residual = v - comb·gens, with v the new generator
        let mut coords: Vec<Weight> = comb.into_iter().map(|c| -c).collect();
        coords.push(weight::one());
        self.gens.push(v);
        self.ech.push(residual);
        self.pivots.push(pivot);
        self.ech_coords.push(coords);
        true
    }

    /// Expresses `v` in generator coordinates; `None` if `v` lies outside the
    /// spanned space.
    fn coords(&self, v: &[Weight]) -> Option<Vec<Weight>> {
        let (residual, comb) = self.eliminate(v);
        residual.iter().all(Zero::is_zero).then_some(comb)
    }
}

fn left_reduce(rep: &LinearRep) -> LinearRep {
    let empty = LinearRep {
        lambda: Vec::new(),
        mu: BTreeMap::new(),
        rho: Vec::new(),
    };
    if rep.dim() == 0 || rep.lambda().iter().all(Zero::is_zero) {
        return empty;
    }

    let mut basis = Basis::default();
    basis.insert(rep.lambda().to_vec());
    let mut stack = vec![0usize];

    while let Some(g) = stack.pop() {
        for m in rep.mu().values() {
            let image = row_times(&basis.gens[g], m);
            if basis.insert(image) {
                stack.push(basis.len() - 1);
            }
        }
    }

    let k = basis.len();
    let mut lambda = vec![weight::zero(); k];
    lambda[0] = weight::one();
    let rho = basis.gens.iter().map(|g| dot(g, rep.rho())).collect();
    let mu = rep
        .mu()
        .iter()
        .map(|(label, m)| {
            let rows = basis
                .gens
                .iter()
                .map(|g| {
                    // the closure above guarantees images stay in the span
                    let mut row = basis
                        .coords(&row_times(g, m))
                        .expect("letter image must lie in the closed row space");
                    row.resize(k, weight::zero());
                    row
                })
                .collect();
            (*label, rows)
        })
        .collect();

    LinearRep { lambda, mu, rho }
}
