use std::fmt::{self, Debug};

use crate::egraph::LinkId;
use crate::{EGraph, Id, NodeData};

/// A view of one equivalence class: the set of nodes threaded on the class
/// ring of a root.
///
/// The view is a cheap `Copy` borrow and reads the ring lazily; it is
/// invalidated by any subsequent [`node`](EGraph::node) or
/// [`merge`](EGraph::merge) call (re-acquire it through
/// [`EGraph::class`]). Iteration yields canonical members only: nodes that
/// were evicted from the hash-cons when a congruent sibling subsumed them
/// stay on the ring for internal bookkeeping but are skipped here.
pub struct EClass<'a, D: NodeData> {
    egraph: &'a EGraph<D>,
    root: Id,
}

impl<D: NodeData> Clone for EClass<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: NodeData> Copy for EClass<'_, D> {}

impl<'a, D: NodeData> EClass<'a, D> {
    pub(crate) fn new(egraph: &'a EGraph<D>, root: Id) -> Self {
        debug_assert!(egraph[root].is_root());
        EClass { egraph, root }
    }

    /// The node representing this class.
    pub fn root(&self) -> Id {
        self.root
    }

    /// Iterates over the members of this class.
    pub fn iter(&self) -> ClassIter<'a, D> {
        let start = self.egraph[self.root].ring.unwrap();
        ClassIter {
            egraph: self.egraph,
            start,
            cursor: Some(start),
        }
    }

    /// Number of members. Walks the ring.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the class has no members. Classes reachable through the
    /// public surface always have at least one.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Iterates over the childless members of this class.
    pub fn leaves(&self) -> impl Iterator<Item = Id> + 'a {
        let egraph = self.egraph;
        self.iter().filter(move |&id| egraph[id].is_leaf())
    }

    /// Iterates over the members whose operator kind equals `kind`.
    pub fn match_kind(&self, kind: D::Kind) -> impl Iterator<Item = Id> + 'a {
        let egraph = self.egraph;
        self.iter().filter(move |&id| egraph[id].kind() == kind)
    }

    /// Iterates over the members whose whole payload equals `data`.
    pub fn match_data(&self, data: D) -> impl Iterator<Item = Id> + 'a {
        let egraph = self.egraph;
        self.iter().filter(move |&id| *egraph[id].data() == data)
    }
}

impl<'a, D: NodeData> IntoIterator for EClass<'a, D> {
    type Item = Id;
    type IntoIter = ClassIter<'a, D>;

    fn into_iter(self) -> ClassIter<'a, D> {
        self.iter()
    }
}

impl<'a, D: NodeData> IntoIterator for &EClass<'a, D> {
    type Item = Id;
    type IntoIter = ClassIter<'a, D>;

    fn into_iter(self) -> ClassIter<'a, D> {
        self.iter()
    }
}

impl<D: NodeData> Debug for EClass<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EClass")
            .field("root", &self.root)
            .field("nodes", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Iterator over the members of an [`EClass`].
///
/// Walks the class ring once, skipping nodes that are out of the
/// hash-cons. A plain reader: the ring is not rewritten as a side effect,
/// so any number of iterations may overlap.
pub struct ClassIter<'a, D: NodeData> {
    egraph: &'a EGraph<D>,
    start: LinkId,
    cursor: Option<LinkId>,
}

impl<D: NodeData> Iterator for ClassIter<'_, D> {
    type Item = Id;

    fn next(&mut self) -> Option<Id> {
        while let Some(cursor) = self.cursor {
            let link = self.egraph.links[cursor];
            self.cursor = if link.next == self.start {
                None
            } else {
                Some(link.next)
            };
            if self.egraph[link.node].is_in_hashcons() {
                return Some(link.node);
            }
        }
        None
    }
}
