//! Linear representations (λ, {μ_a}, ρ) of weighted automata and their
//! textual export format.
//!
//! The representation fixes the state-to-index bijection to be the automaton's
//! own state numbering. The value of a word `w = w_1...w_k` is
//! `λ · μ_{w_1} ··· μ_{w_k} · ρ`.

use crate::mapper::{Coord, LabelId, LabelMapper};
use crate::weight::{self, Weight};
use crate::wfa::Wfa;
use itertools::Itertools;
use num_traits::Zero;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use thiserror::Error;
use tracing::debug;

/// Errors raised while re-importing an exported representation.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// The input could not be read.
    #[error("cannot read matrix file")]
    Io(#[from] std::io::Error),
    /// A line did not fit the export layout.
    #[error("malformed matrix syntax in line {line}: {text:?}")]
    Malformed {
        /// One-based line number in the input.
        line: usize,
        /// The offending line.
        text: String,
    },
}

/// Smallest and largest weight observed while exporting, zero fills included.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportStats {
    /// The minimum observed weight (at most zero).
    pub min: Weight,
    /// The maximum observed weight (at least zero).
    pub max: Weight,
}

impl Default for ExportStats {
    fn default() -> Self {
        Self {
            min: weight::zero(),
            max: weight::zero(),
        }
    }
}

impl ExportStats {
    fn observe(&mut self, v: &Weight) {
        if *v < self.min {
            self.min = v.clone();
        }
        if *v > self.max {
            self.max = v.clone();
        }
    }
}

/// A linear representation: initial vector, one dense square matrix per
/// letter, final vector. Letters without any nonzero-weight transition carry
/// no matrix at all.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearRep {
    pub(crate) lambda: Vec<Weight>,
    pub(crate) mu: BTreeMap<LabelId, Vec<Vec<Weight>>>,
    pub(crate) rho: Vec<Weight>,
}

fn zero_matrix(n: usize) -> Vec<Vec<Weight>> {
    vec![vec![weight::zero(); n]; n]
}

impl LinearRep {
    /// The dimension, i.e. the number of states of the underlying automaton.
    pub fn dim(&self) -> usize {
        self.lambda.len()
    }

    /// The initial vector λ.
    pub fn lambda(&self) -> &[Weight] {
        &self.lambda
    }

    /// The final vector ρ.
    pub fn rho(&self) -> &[Weight] {
        &self.rho
    }

    /// The matrices μ, keyed by letter in ascending label-code order.
    pub fn mu(&self) -> &BTreeMap<LabelId, Vec<Vec<Weight>>> {
        &self.mu
    }

    /// Extracts the representation of an automaton. Parallel duplicate
    /// transitions sum into the same matrix entry.
    pub fn from_wfa(a: &Wfa) -> Self {
        let n = a.state_count();
        let mut lambda = vec![weight::zero(); n];
        let mut rho = vec![weight::zero(); n];
        let mut mu: BTreeMap<LabelId, Vec<Vec<Weight>>> = BTreeMap::new();

        for (q, w) in a.initial_weights() {
            lambda[q] = w.clone();
        }
        for (q, w) in a.final_weights() {
            rho[q] = w.clone();
        }
        for (q, label, w, target) in a.transitions() {
            if w.is_zero() {
                continue;
            }
            let m = mu.entry(label).or_insert_with(|| zero_matrix(n));
            m[q][target] += w;
        }

        Self { lambda, mu, rho }
    }

    /// Rebuilds an automaton from the representation, over the union of the
    /// given alphabet and the letters carrying a matrix.
    pub fn to_wfa(&self, alphabet: impl IntoIterator<Item = LabelId>) -> Wfa {
        let mut a = Wfa::new(alphabet.into_iter().chain(self.mu.keys().copied()));
        a.add_states(self.dim());
        for (q, w) in self.lambda.iter().enumerate() {
            a.set_initial(q, w.clone());
        }
        for (q, w) in self.rho.iter().enumerate() {
            a.set_final(q, w.clone());
        }
        for (label, m) in &self.mu {
            for (q, row) in m.iter().enumerate() {
                for (target, w) in row.iter().enumerate() {
                    if !w.is_zero() {
                        a.add_transition(q, *label, w.clone(), target);
                    }
                }
            }
        }
        a
    }

    /// Evaluates the represented sequence on `word`. Letters without a matrix
    /// annihilate the value.
    pub fn eval(&self, word: &[LabelId]) -> Weight {
        let mut v = self.lambda.clone();
        for letter in word {
            let Some(m) = self.mu.get(letter) else {
                return weight::zero();
            };
            let mut next = vec![weight::zero(); self.dim()];
            for (i, vi) in v.iter().enumerate() {
                if vi.is_zero() {
                    continue;
                }
                for (j, mij) in m[i].iter().enumerate() {
                    next[j] += vi * mij;
                }
            }
            v = next;
        }
        v.iter()
            .zip(&self.rho)
            .map(|(a, b)| a * b)
            .fold(weight::zero(), |acc, w| acc + w)
    }

    /// Writes the representation in the export layout. With `check_int` set,
    /// every emitted weight must have denominator one; a violation is a usage
    /// error and aborts. A zero-dimensional representation writes nothing.
    pub fn write<W: Write>(
        &self,
        mapper: &LabelMapper,
        out: &mut W,
        check_int: bool,
    ) -> std::io::Result<ExportStats> {
        let mut stats = ExportStats::default();
        if self.dim() == 0 {
            return Ok(stats);
        }

        let emit = |v: &Weight, stats: &mut ExportStats| {
            stats.observe(v);
            if check_int {
                assert!(
                    weight::is_integral(v),
                    "integer-only export requested but weight {v} is not integral"
                );
            }
            v.to_string()
        };

        writeln!(
            out,
            "lambda = [{}]",
            self.lambda.iter().map(|v| emit(v, &mut stats)).join(", ")
        )?;

        for (label, m) in &self.mu {
            writeln!(out, "\nmu[{}] = [", mapper[*label].iter().join(" "))?;
            for (i, row) in m.iter().enumerate() {
                writeln!(
                    out,
                    "[{}]{}",
                    row.iter().map(|v| emit(v, &mut stats)).join(", "),
                    if i + 1 < m.len() { "," } else { "" }
                )?;
            }
            writeln!(out, "]")?;
        }

        writeln!(
            out,
            "\nrho = [{}]",
            self.rho.iter().map(|v| emit(v, &mut stats)).join(", ")
        )?;

        debug!("exported representation of dimension {}", self.dim());
        Ok(stats)
    }

    /// Reads a representation back from the export layout, interning the μ
    /// block labels into `mapper`.
    pub fn parse<R: Read>(reader: R, mapper: &mut LabelMapper) -> Result<Self, MatrixError> {
        let mut lambda: Vec<Weight> = Vec::new();
        let mut rho: Vec<Weight> = Vec::new();
        let mut mu: BTreeMap<LabelId, Vec<Vec<Weight>>> = BTreeMap::new();
        let mut current: Option<(LabelId, Vec<Vec<Weight>>)> = None;

        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            let malformed = || MatrixError::Malformed {
                line: idx + 1,
                text: text.to_string(),
            };

            if let Some(rest) = text.strip_prefix("lambda = [") {
                lambda = parse_row(rest.strip_suffix(']').ok_or_else(malformed)?)
                    .ok_or_else(malformed)?;
            } else if let Some(rest) = text.strip_prefix("rho = [") {
                rho = parse_row(rest.strip_suffix(']').ok_or_else(malformed)?)
                    .ok_or_else(malformed)?;
            } else if let Some(rest) = text.strip_prefix("mu[") {
                let (tuple, tail) = rest.split_once(']').ok_or_else(malformed)?;
                if tail.trim() != "= [" {
                    return Err(malformed());
                }
                let tuple: Vec<Coord> = tuple
                    .split_whitespace()
                    .map(|t| t.parse::<Coord>())
                    .collect::<Result<_, _>>()
                    .map_err(|_| malformed())?;
                current = Some((mapper.get(tuple), Vec::new()));
            } else if text == "]" {
                let (label, m) = current.take().ok_or_else(malformed)?;
                mu.insert(label, m);
            } else if let Some(rest) = text.strip_prefix('[') {
                let rest = rest
                    .strip_suffix("],")
                    .or_else(|| rest.strip_suffix(']'))
                    .ok_or_else(malformed)?;
                let row = parse_row(rest).ok_or_else(malformed)?;
                current.as_mut().ok_or_else(malformed)?.1.push(row);
            } else {
                return Err(malformed());
            }
        }

        Ok(Self { lambda, mu, rho })
    }
}

fn parse_row(text: &str) -> Option<Vec<Weight>> {
    let text = text.trim();
    if text.is_empty() {
        return Some(Vec::new());
    }
    text.split(',')
        .map(|t| t.trim().parse::<Weight>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weight::from_int;
    use crate::wfa::tests::diagonal_pair;

    #[test]
    fn export_matches_the_fixed_layout() {
        let (a, mapper) = diagonal_pair();
        let rep = LinearRep::from_wfa(&a);

        let mut buf = Vec::new();
        let stats = rep.write(&mapper, &mut buf, true).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text,
            "lambda = [1, 0]\n\
             \n\
             mu[0 0] = [\n\
             [1, 0],\n\
             [0, 1]\n\
             ]\n\
             \n\
             mu[1 1] = [\n\
             [0, 1],\n\
             [0, 0]\n\
             ]\n\
             \n\
             rho = [0, 1]\n"
        );
        assert_eq!(stats.min, from_int(0));
        assert_eq!(stats.max, from_int(1));
    }

    #[test]
    fn min_max_track_across_all_blocks() {
        let (mut a, mapper) = diagonal_pair();
        let o = mapper.id_of(&[1, 1]).unwrap();
        a.set_initial(1, from_int(-3));
        a.add_transition(1, o, from_int(5), 0);

        let rep = LinearRep::from_wfa(&a);
        let mut buf = Vec::new();
        let stats = rep.write(&mapper, &mut buf, true).unwrap();
        assert_eq!(stats.min, from_int(-3));
        assert_eq!(stats.max, from_int(5));
    }

    #[test]
    fn zero_dimension_writes_nothing() {
        let rep = LinearRep::from_wfa(&Wfa::new([]));
        let mut buf = Vec::new();
        rep.write(&LabelMapper::new(), &mut buf, true).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    #[should_panic(expected = "not integral")]
    fn integer_check_is_fatal_on_fractions() {
        let (mut a, mapper) = diagonal_pair();
        a.set_initial(0, Weight::new(1.into(), 2.into()));
        let rep = LinearRep::from_wfa(&a);
        let mut buf = Vec::new();
        let _ = rep.write(&mapper, &mut buf, true);
    }

    #[test]
    fn round_trips_and_evaluates_identically() {
        let (a, mapper) = diagonal_pair();
        let z = mapper.id_of(&[0, 0]).unwrap();
        let o = mapper.id_of(&[1, 1]).unwrap();

        let rep = LinearRep::from_wfa(&a);
        let mut buf = Vec::new();
        rep.write(&mapper, &mut buf, true).unwrap();

        let mut remapper = LabelMapper::new();
        let back = LinearRep::parse(buf.as_slice(), &mut remapper).unwrap();
        let zz = remapper.id_of(&[0, 0]).unwrap();
        let oo = remapper.id_of(&[1, 1]).unwrap();

        let words: [(&[LabelId], &[LabelId]); 4] = [
            (&[], &[]),
            (&[o], &[oo]),
            (&[z, o, z], &[zz, oo, zz]),
            (&[o, o], &[oo, oo]),
        ];
        for (w, ww) in words {
            assert_eq!(a.eval(w), back.eval(ww));
        }
    }

    #[test]
    fn duplicate_transitions_sum_into_one_entry() {
        let mut mapper = LabelMapper::new();
        let l = mapper.get(vec![1]);
        let mut a = Wfa::new([l]);
        let q0 = a.add_state();
        let q1 = a.add_state();
        a.set_initial(q0, from_int(1));
        a.set_final(q1, from_int(1));
        a.add_transition(q0, l, from_int(2), q1);
        a.add_transition(q0, l, from_int(3), q1);

        let rep = LinearRep::from_wfa(&a);
        assert_eq!(rep.mu[&l][0][1], from_int(5));
    }
}
