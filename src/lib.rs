//! Turn numeration-system DFAs into linear representations of integer
//! sequences.
//!
//! The Walnut theorem prover decides predicates over numeration systems and
//! emits them as DFAs over tuples of digits. This crate parses those DFAs,
//! counts accepted digit-tuples by projecting the labels onto a chosen
//! variable subset, and produces exact-rational weighted automata whose
//! weighted language is the sequence of interest (a counting function, a
//! first difference, a comparison of two sequences). The automata can be
//! combined by an algebra of recipes (sign flip, prefix conditioning, view
//! differences, synchronized product), reduced to few states, and exported as
//! explicit (λ, {μ_a}, ρ) vector/matrix triples for downstream analysis.
//!
//! The pipeline is strictly forward: [`walnut`] parsing →
//! [`count::dfa_count`] → recipe combinations from [`view`] and
//! [`wfa::algebra`] → [`wfa::reduce::reduce`] → [`matrix`] export. Every
//! stage is a pure, deterministic function of its inputs.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude re-exports everything needed to run the pipeline, i.e.
/// `use linrep::prelude::*;` should be enough to use the crate.
pub mod prelude {
    pub use super::{
        count::{dfa_count, dfa_count_with, remap_labels, CountError},
        mapper::{Coord, LabelId, LabelMapper},
        matrix::{ExportStats, LinearRep, MatrixError},
        view::{fromthere, gview, modify_transitions, opposite, prefix_absorb},
        walnut::{self, ParseError, RawDfa},
        weight::{self, Weight, WeightError, WeightFormat},
        wfa::{
            algebra::{product, sum},
            reduce::reduce,
            StateId, Wfa,
        },
    };
}

/// Small collection aliases shared across the crate.
pub mod math;

/// The exact-rational weight semiring.
pub mod weight;

/// Interning of label tuples into dense codes.
pub mod mapper;

/// Reading and writing the Walnut text format.
pub mod walnut;

/// Weighted automata and their algebra.
pub mod wfa;

/// The counting/projection constructor and label remapping.
pub mod count;

/// Sign flip, prefix conditioning and view/difference recipes.
pub mod view;

/// Linear representations and their textual export.
pub mod matrix;
