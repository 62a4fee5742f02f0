//! Reading and writing the Walnut Automata Library text format.
//!
//! The format is line based. The first line names the numeration system and is
//! ignored on input. Each following block declares a state with a line
//! `<state_id> <output>` and lists its transitions as
//! `<c_1> <c_2> ... -> <destination>`, one per line. A line is a state
//! declaration iff it contains no `->`.

use crate::mapper::{Coord, LabelMapper};
use crate::math::Map;
use crate::wfa::{StateId, Wfa};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading a Walnut automaton description.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be opened or read.
    #[error("cannot read automaton file")]
    Io(#[from] std::io::Error),
    /// A line did not parse as a state declaration or transition.
    #[error("malformed token in line {line}: {text:?}")]
    Malformed {
        /// One-based line number in the input.
        line: usize,
        /// The offending line.
        text: String,
    },
}

/// A parsed DFA as Walnut emits it: one transition map per state, keyed by the
/// raw label tuple, and one output value per state. State `0` is the start
/// state.
#[derive(Clone, Debug, Default)]
pub struct RawDfa {
    /// `transitions[q]` maps each label tuple to the destination state.
    pub transitions: Vec<BTreeMap<Vec<Coord>, StateId>>,
    /// `output[q]` is the DFA output in state `q`.
    pub output: Vec<u32>,
}

impl RawDfa {
    /// The number of states.
    pub fn state_count(&self) -> usize {
        self.output.len()
    }

    fn ensure_state(&mut self, q: StateId) {
        if q >= self.output.len() {
            self.output.resize(q + 1, 0);
            self.transitions.resize(q + 1, BTreeMap::new());
        }
    }
}

/// Reads a Walnut automaton from `path`, interning every label tuple
/// encountered into `mapper`.
pub fn read_file(path: impl AsRef<Path>, mapper: &mut LabelMapper) -> Result<RawDfa, ParseError> {
    read(File::open(path)?, mapper)
}

/// Reads a Walnut automaton from an arbitrary reader. See [`read_file`].
pub fn read<R: Read>(reader: R, mapper: &mut LabelMapper) -> Result<RawDfa, ParseError> {
    let mut dfa = RawDfa::default();
    let mut current_state: Option<StateId> = None;
    let mut lines = BufReader::new(reader).lines();

    // header line naming the numeration system
    if let Some(header) = lines.next() {
        header?;
    }

    for (idx, line) in lines.enumerate() {
        let line = line?;
        let lineno = idx + 2;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let malformed = || ParseError::Malformed {
            line: lineno,
            text: text.to_string(),
        };

        match text.split_once("->") {
            None => {
                let mut it = text.split_whitespace();
                let q: StateId = it
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or_else(malformed)?;
                let o: u32 = it
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or_else(malformed)?;
                dfa.ensure_state(q);
                dfa.output[q] = o;
                dfa.transitions[q].clear();
                current_state = Some(q);
            }
            Some((left, right)) => {
                let state = current_state.ok_or_else(malformed)?;
                let label: Vec<Coord> = left
                    .split_whitespace()
                    .map(|t| t.parse::<Coord>())
                    .collect::<Result<_, _>>()
                    .map_err(|_| malformed())?;
                let target: StateId = right.trim().parse().map_err(|_| malformed())?;
                dfa.ensure_state(target);
                mapper.get(label.clone());
                dfa.transitions[state].insert(label, target);
            }
        }
    }

    debug!(
        "parsed walnut automaton with {} states and {} labels",
        dfa.state_count(),
        mapper.len()
    );
    Ok(dfa)
}

/// Writes a weighted automaton back out in the Walnut format, using the final
/// weights as state outputs. The state carrying an initial weight comes first,
/// since Walnut designates the first declared state as the start state.
pub fn write<W: Write>(
    a: &Wfa,
    mapper: &LabelMapper,
    out: &mut W,
    ns: &str,
) -> std::io::Result<()> {
    let Some(first) = a.initial_weights().map(|(q, _)| q).min() else {
        return Ok(());
    };

    let mut ordered: Vec<StateId> = vec![first];
    ordered.extend(a.states().filter(|&q| q != first));
    let index: Map<StateId, usize> = ordered.iter().enumerate().map(|(i, &q)| (q, i)).collect();

    let arity = mapper.arity().unwrap_or(1);
    writeln!(out, "{}", std::iter::repeat(ns).take(arity).join(" "))?;

    for (i, &q) in ordered.iter().enumerate() {
        writeln!(out, "\n{} {}", i, a.final_weight(q))?;
        let mut edges: Vec<(&[Coord], StateId)> = a
            .edges_from(q)
            .iter()
            .map(|(label, _, target)| (&mapper[*label], *target))
            .collect();
        edges.sort();
        for (tuple, target) in edges {
            writeln!(out, "{} -> {}", tuple.iter().join(" "), index[&target])?;
        }
    }
    Ok(())
}

/// Convenience wrapper writing to a file path.
pub fn write_file(
    a: &Wfa,
    mapper: &LabelMapper,
    path: impl AsRef<Path>,
    ns: &str,
) -> std::io::Result<()> {
    let mut f = File::create(path)?;
    write(a, mapper, &mut f, ns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weight;

    const SAMPLE: &str = "msd_2 msd_2\n\
        0 0\n\
        0 0 -> 0\n\
        1 1 -> 1\n\
        \n\
        1 1\n\
        0 0 -> 1\n";

    #[test]
    fn parses_states_outputs_and_transitions() {
        let mut mapper = LabelMapper::new();
        let dfa = read(SAMPLE.as_bytes(), &mut mapper).unwrap();

        assert_eq!(dfa.state_count(), 2);
        assert_eq!(dfa.output, vec![0, 1]);
        assert_eq!(mapper.len(), 2);
        assert_eq!(dfa.transitions[0].get(&vec![0, 0]), Some(&0));
        assert_eq!(dfa.transitions[0].get(&vec![1, 1]), Some(&1));
        assert_eq!(dfa.transitions[1].get(&vec![0, 0]), Some(&1));
    }

    #[test]
    fn forward_references_resize_the_tables() {
        let input = "msd_2\n0 0\n1 -> 3\n";
        let mut mapper = LabelMapper::new();
        let dfa = read(input.as_bytes(), &mut mapper).unwrap();
        assert_eq!(dfa.state_count(), 4);
        assert_eq!(dfa.output[3], 0);
    }

    #[test]
    fn malformed_tokens_are_reported_with_line_numbers() {
        let input = "header\n0 zero\n";
        let mut mapper = LabelMapper::new();
        match read(input.as_bytes(), &mut mapper) {
            Err(ParseError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn transition_before_any_state_is_malformed() {
        let input = "header\n0 0 -> 1\n";
        let mut mapper = LabelMapper::new();
        assert!(read(input.as_bytes(), &mut mapper).is_err());
    }

    #[test]
    fn round_trips_through_the_writer() {
        let mut mapper = LabelMapper::new();
        let a = mapper.get(vec![0, 0]);
        let b = mapper.get(vec![1, 1]);

        let mut wfa = Wfa::new([a, b]);
        let q0 = wfa.add_state();
        let q1 = wfa.add_state();
        wfa.set_initial(q0, weight::one());
        wfa.set_final(q1, weight::one());
        wfa.add_transition(q0, a, weight::one(), q0);
        wfa.add_transition(q0, b, weight::one(), q1);
        wfa.add_transition(q1, a, weight::one(), q1);

        let mut buf = Vec::new();
        write(&wfa, &mapper, &mut buf, "msd_2").unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut reread = LabelMapper::new();
        let dfa = read(text.as_bytes(), &mut reread).unwrap();
        assert_eq!(dfa.state_count(), 2);
        assert_eq!(dfa.output, vec![0, 1]);
        assert_eq!(dfa.transitions[0].get(&vec![1, 1]), Some(&1));
    }
}
