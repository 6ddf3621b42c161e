use std::collections::VecDeque;
use std::ops::Index;

use log::{debug, trace};
use smallvec::SmallVec;
use thiserror::Error;

use crate::arena::{arena_idx, Arena};
use crate::eclass::EClass;
use crate::hashcons::Hashcons;
use crate::unionfind;
use crate::util::IndexSet;
use crate::{Id, NodeData};

arena_idx! {
    /// Index of a class-ring record.
    LinkId
}

arena_idx! {
    /// Index of a use record.
    UseId
}

/// One record of the circular list threading every node of a class
/// together. A root's `ring` field anchors the list.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClassLink {
    pub node: Id,
    pub next: LinkId,
}

/// One `(parent, child-slot)` edge of the term DAG, threaded into the
/// circular use list of the class containing the referenced child.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Use {
    pub parent: Id,
    pub slot: u32,
    pub next: UseId,
}

/// The error returned by [`Node::at`] for an out-of-range child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("child index {index} out of range for a node with {arity} children")]
pub struct ChildIndexError {
    index: usize,
    arity: usize,
}

/// One applied operator.
///
/// A node owns its payload and an immutable-length vector of children,
/// which always name class roots (the congruence repair rewrites them when
/// a root is merged away). The remaining fields thread the node into the
/// union-find, its class ring, and the hash-cons.
#[derive(Debug)]
pub struct Node<D> {
    data: D,
    children: SmallVec<[Id; 4]>,
    pub(crate) rank: u32,
    pub(crate) up: Option<Id>,
    /// Anchor of the class ring; `Some` iff this node is a root.
    pub(crate) ring: Option<LinkId>,
    /// Head of the class's use list; meaningful only on roots.
    pub(crate) uses: Option<UseId>,
    pub(crate) in_hashcons: bool,
}

impl<D: NodeData> Node<D> {
    /// The payload this node applies.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// The operator kind of the payload.
    pub fn kind(&self) -> D::Kind {
        self.data.kind()
    }

    /// The children, as class roots current at the last repair.
    pub fn children(&self) -> &[Id] {
        &self.children
    }

    /// The child in slot `index`.
    pub fn at(&self, index: usize) -> Result<Id, ChildIndexError> {
        self.children
            .get(index)
            .copied()
            .ok_or(ChildIndexError {
                index,
                arity: self.children.len(),
            })
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the node has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the node is a leaf, i.e. has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the node currently represents its class.
    pub fn is_root(&self) -> bool {
        self.up.is_none()
    }

    pub(crate) fn is_in_hashcons(&self) -> bool {
        self.in_hashcons
    }

    #[cfg(test)]
    pub(crate) fn bare(data: D) -> Self {
        Node {
            data,
            children: SmallVec::new(),
            rank: 0,
            up: None,
            ring: None,
            uses: None,
            in_hashcons: true,
        }
    }
}

/// An e-graph over payloads of type `D`.
///
/// Terms are interned bottom-up with [`node`](EGraph::node); equalities
/// are asserted with [`merge`](EGraph::merge), which drives congruence
/// closure to a fixpoint before returning. All storage lives in arenas
/// owned by the graph and is freed when it drops; [`Id`]s are plain
/// indices and must not be used across graphs.
#[derive(Debug)]
pub struct EGraph<D: NodeData> {
    pub(crate) nodes: Arena<Id, Node<D>>,
    pub(crate) links: Arena<LinkId, ClassLink>,
    pub(crate) uses: Arena<UseId, Use>,
    hashcons: Hashcons,
    roots: IndexSet<Id>,
}

impl<D: NodeData> Default for EGraph<D> {
    fn default() -> Self {
        EGraph::new()
    }
}

impl<D: NodeData> EGraph<D> {
    /// Constructs an empty e-graph.
    pub fn new() -> Self {
        EGraph {
            nodes: Arena::new(),
            links: Arena::new(),
            uses: Arena::new(),
            hashcons: Hashcons::new(),
            roots: IndexSet::default(),
        }
    }

    /// Number of canonical (hash-consed) nodes.
    pub fn len(&self) -> usize {
        self.hashcons.len()
    }

    /// Whether the graph contains no nodes.
    pub fn is_empty(&self) -> bool {
        self.hashcons.len() == 0
    }

    /// Iterates over the current class roots.
    pub fn roots(&self) -> impl ExactSizeIterator<Item = Id> + '_ {
        self.roots.iter().copied()
    }

    /// Iterates over the current classes.
    pub fn classes(&self) -> impl ExactSizeIterator<Item = EClass<'_, D>> + '_ {
        self.roots.iter().map(move |&root| EClass::new(self, root))
    }

    /// The class `id` belongs to.
    pub fn class(&self, id: Id) -> EClass<'_, D> {
        EClass::new(self, self.find(id))
    }

    /// Returns the representative of the class `id` belongs to.
    pub fn find(&self, id: Id) -> Id {
        unionfind::find(&self.nodes, id)
    }

    /// Like [`find`](EGraph::find), but compresses the walked path.
    pub fn find_mut(&mut self, id: Id) -> Id {
        unionfind::find_mut(&mut self.nodes, id)
    }

    /// Whether `a` and `b` are currently in the same class.
    pub fn equiv(&self, a: Id, b: Id) -> bool {
        self.find(a) == self.find(b)
    }

    /// Interns a leaf term.
    pub fn leaf(&mut self, data: D) -> Id {
        self.node(data, &[])
    }

    /// Interns the term `data(children…)` and returns the root of the
    /// class representing it.
    ///
    /// Every child must be a class root (canonicalise stale handles with
    /// [`find`](EGraph::find) first); this is checked in debug builds. If
    /// an equal term was interned before, no allocation happens and the
    /// existing class is returned, even if that class has since been
    /// merged into another.
    pub fn node(&mut self, data: D, children: &[Id]) -> Id {
        debug_assert!(
            children.iter().all(|&child| self.nodes[child].is_root()),
            "children passed to `node` must be class roots"
        );

        if let Some(existing) = self.hashcons.get(&self.nodes, &data, children) {
            return self.find_mut(existing);
        }

        let id = self.nodes.next_index();
        let link = self.links.next_index();
        self.links.push(ClassLink { node: id, next: link });
        self.nodes.push(Node {
            data,
            children: SmallVec::from_slice(children),
            rank: 0,
            up: None,
            ring: Some(link),
            uses: None,
            in_hashcons: false,
        });

        for (slot, &child) in children.iter().enumerate() {
            let use_id = self.uses.next_index();
            self.uses.push(Use {
                parent: id,
                slot: slot as u32,
                next: use_id,
            });
            self.add_use(child, use_id);
        }

        self.hashcons.insert(&mut self.nodes, id);
        self.roots.insert(id);
        trace!("interned {:?} as node {:?}", self.nodes[id].data, id);
        id
    }

    /// Asserts `a ≡ b` and runs congruence closure to a fixpoint.
    /// Returns whether any classes were actually merged.
    pub fn merge(&mut self, a: Id, b: Id) -> bool {
        let mut queue = VecDeque::new();
        queue.push_back((a, b));
        self.merge_queue(&mut queue)
    }

    /// Batch variant of [`merge`](EGraph::merge): drains a queue of
    /// equality assertions, chasing every equality the merges induce on
    /// parent terms, until nothing is left to do. Returns whether any
    /// classes were merged; saturation drivers loop until this is false.
    pub fn merge_queue(&mut self, queue: &mut VecDeque<(Id, Id)>) -> bool {
        let mut unions = 0usize;
        let mut repairs = 0usize;

        while let Some((a, b)) = queue.pop_front() {
            let a = self.find_mut(a);
            let b = self.find_mut(b);
            if a == b {
                continue;
            }

            let (loser, winner) = if self.nodes[a].rank <= self.nodes[b].rank {
                (a, b)
            } else {
                (b, a)
            };
            trace!("union {:?} into {:?}", loser, winner);
            let uses = self.union_class(loser, winner);
            self.roots.swap_remove(&loser);
            unions += 1;

            // Walk the use list the loser just gave up. Each parent still
            // in the hash-cons holds a stale child slot; rewriting it can
            // collide with an existing node, which is a fresh equality to
            // propagate. Parents already out of the hash-cons were subsumed
            // on an earlier pass and are skipped.
            let Some((first, last)) = uses else { continue };
            let mut cursor = first;
            loop {
                let Use { parent, slot, next } = self.uses[cursor];
                if self.nodes[parent].is_in_hashcons() {
                    self.hashcons.erase(&mut self.nodes, parent);
                    self.nodes[parent].children[slot as usize] = winner;
                    match self.hashcons.get_node(&self.nodes, parent) {
                        None => self.hashcons.insert(&mut self.nodes, parent),
                        Some(occupant) => queue.push_back((parent, occupant)),
                    }
                    repairs += 1;
                }
                if cursor == last {
                    break;
                }
                cursor = next;
            }
        }

        if unions > 0 {
            debug!("merged {} classes, repaired {} parent slots", unions, repairs);
        }
        unions > 0
    }

    /// Unions two classes: union-find link, O(1) ring splice, O(1) use-list
    /// concatenation. Returns the extent `(first, last)` of the loser's
    /// former use list inside the combined ring, so the caller can repair
    /// exactly those records.
    fn union_class(&mut self, loser: Id, winner: Id) -> Option<(UseId, UseId)> {
        unionfind::union(&mut self.nodes, loser, winner);

        let loser_ring = self.nodes[loser].ring.take().unwrap();
        let winner_ring = self.nodes[winner].ring.unwrap();
        let tmp = self.links[winner_ring].next;
        self.links[winner_ring].next = self.links[loser_ring].next;
        self.links[loser_ring].next = tmp;

        // The use lists must be concatenated before the repair walk, so
        // chained rewrites triggered by further merges see a complete
        // parent set on the winner.
        let loser_uses = self.nodes[loser].uses.take()?;
        let range = (self.uses[loser_uses].next, loser_uses);
        match self.nodes[winner].uses {
            None => self.nodes[winner].uses = Some(loser_uses),
            Some(winner_uses) => self.splice_use_rings(winner_uses, loser_uses),
        }
        Some(range)
    }

    /// Threads `use_id` (a fresh singleton ring) into `root`'s use list.
    fn add_use(&mut self, root: Id, use_id: UseId) {
        match self.nodes[root].uses {
            None => self.nodes[root].uses = Some(use_id),
            Some(head) => self.splice_use_rings(head, use_id),
        }
    }

    /// Joins two disjoint circular use lists by swapping successors.
    fn splice_use_rings(&mut self, a: UseId, b: UseId) {
        let tmp = self.uses[a].next;
        self.uses[a].next = self.uses[b].next;
        self.uses[b].next = tmp;
    }

    /// Iterates the `(parent, slot)` use records of the class rooted at
    /// `root`.
    pub(crate) fn uses_of(&self, root: Id) -> UseIter<'_, D> {
        debug_assert!(self.nodes[root].is_root());
        UseIter {
            egraph: self,
            start: self.nodes[root].uses,
            cursor: self.nodes[root].uses,
        }
    }
}

impl<D: NodeData> Index<Id> for EGraph<D> {
    type Output = Node<D>;

    fn index(&self, id: Id) -> &Node<D> {
        &self.nodes[id]
    }
}

pub(crate) struct UseIter<'a, D: NodeData> {
    egraph: &'a EGraph<D>,
    start: Option<UseId>,
    cursor: Option<UseId>,
}

impl<D: NodeData> Iterator for UseIter<'_, D> {
    type Item = (Id, u32);

    fn next(&mut self) -> Option<(Id, u32)> {
        let cursor = self.cursor?;
        let record = self.egraph.uses[cursor];
        self.cursor = if Some(record.next) == self.start {
            None
        } else {
            Some(record.next)
        };
        Some((record.parent, record.slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimpleNodeData;

    type Graph = EGraph<SimpleNodeData<&'static str>>;

    fn data(kind: &'static str) -> SimpleNodeData<&'static str> {
        SimpleNodeData::new(kind)
    }

    #[test]
    fn leaves_intern() {
        crate::init_logger();
        let mut egraph = Graph::new();
        let x1 = egraph.leaf(data("x"));
        let x2 = egraph.leaf(data("x"));
        let y = egraph.leaf(data("y"));

        assert_eq!(x1, x2);
        assert_ne!(x1, y);
        assert_eq!(egraph.len(), 2);
        assert_eq!(egraph.roots().len(), 2);
    }

    #[test]
    fn use_records_cover_every_edge() {
        let mut egraph = Graph::new();
        let x = egraph.leaf(data("x"));
        let y = egraph.leaf(data("y"));
        let _f = egraph.node(data("f"), &[x, y]);
        let _g = egraph.node(data("g"), &[x]);

        let mut x_uses: Vec<_> = egraph.uses_of(x).collect();
        x_uses.sort_by_key(|&(parent, _)| usize::from(parent));
        assert_eq!(x_uses.len(), 2);
        assert_eq!(x_uses[0].1, 0);
        assert_eq!(x_uses[1].1, 0);
        assert_eq!(egraph.uses_of(y).count(), 1);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut egraph = Graph::new();
        let x = egraph.leaf(data("x"));
        let y = egraph.leaf(data("y"));

        assert!(egraph.merge(x, y));
        assert!(!egraph.merge(x, y));
        assert!(!egraph.merge(x, x));
        assert!(egraph.equiv(x, y));
    }

    #[test]
    fn child_index_error() {
        let mut egraph = Graph::new();
        let x = egraph.leaf(data("x"));
        let f = egraph.node(data("f"), &[x]);

        assert_eq!(egraph[f].at(0), Ok(x));
        let err = egraph[f].at(1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "child index 1 out of range for a node with 1 children"
        );
    }
}
