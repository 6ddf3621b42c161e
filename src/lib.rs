#![warn(missing_docs)]
/*!

`quotient` is an e-graph library: a compact representation of many
equivalent program terms, built for congruence closure and equality
saturation.

Terms over a user-defined operator alphabet (see [`NodeData`]) are
hash-consed bottom-up with [`EGraph::node`], so structurally equal terms
share one node. [`EGraph::merge`] asserts that two terms are equal and
propagates the consequences through every parent term ("equal operators
applied to equal children are equal") before it returns. Classes can be
inspected with [`EGraph::class`] and matched by operator with
[`EClass::match_kind`], and [`EGraph::extract`] picks one minimum-cost
representative per class under a caller-supplied [`CostFunction`].

Rewrite engines, operator alphabets and their semantics live outside this
crate: drive saturation by matching over classes, interning right-hand
sides, and feeding the resulting equalities to
[`merge_queue`](EGraph::merge_queue) until it reports no change.

## Logging

Many parts of `quotient` dump useful logging info using the
[`log`](https://docs.rs/log/) crate. The easiest way to see this info is
to use the [`env_logger`](https://docs.rs/env_logger/) crate in your
binary or test, and set the environment variable `RUST_LOG=quotient=debug`
(or `trace` for more).

*/

mod arena;
mod dot;
mod eclass;
mod egraph;
mod extract;
mod hashcons;
mod language;
mod unionfind;
mod util;

/// A handle to a term node within an [`EGraph`].
///
/// Handles are plain indices: cheap to copy, valid for the lifetime of
/// the graph that issued them, and meaningless in any other graph. The
/// node a handle names never moves, but the *class* it belongs to can
/// change identity across a [`merge`](EGraph::merge); canonicalise with
/// [`find`](EGraph::find) before using a stored handle as a semantic key.
#[derive(Clone, Copy, Default, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Id(u32);

impl From<usize> for Id {
    fn from(n: usize) -> Id {
        Id(n as u32)
    }
}

impl From<Id> for usize {
    fn from(id: Id) -> usize {
        id.0 as usize
    }
}

impl std::fmt::Debug for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub use {
    dot::{Dot, ExtractedDot},
    eclass::{ClassIter, EClass},
    egraph::{ChildIndexError, EGraph, Node},
    extract::{AstSize, Cost, CostFunction, DataCost, Extractor},
    language::{NodeData, SimpleNodeData},
    util::Symbol,
};

#[cfg(test)]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
