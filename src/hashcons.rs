//! The canonical-node table.
//!
//! Maps `(data, child-vector)` to the node that canonically represents
//! that applied term. Keys are never stored: the table holds bare [`Id`]s
//! and hashes/compares them through the node arena, so erasing and
//! re-inserting a node during congruence repair is O(1) given its handle.
//! Membership is mirrored in the node's `in_hashcons` flag, which the
//! repair walk and class iteration test constantly.

use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};

use hashbrown::HashTable;

use crate::arena::Arena;
use crate::egraph::Node;
use crate::{Id, NodeData};

fn hash_parts<D: Hash>(data: &D, children: &[Id]) -> u64 {
    let mut hasher = fxhash::FxHasher::default();
    data.hash(&mut hasher);
    children.hash(&mut hasher);
    hasher.finish()
}

pub(crate) struct Hashcons {
    table: HashTable<Id>,
}

impl Hashcons {
    pub fn new() -> Self {
        Hashcons {
            table: HashTable::new(),
        }
    }

    /// Number of canonical nodes.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Looks up the canonical node for `(data, children)`.
    pub fn get<D: NodeData>(
        &self,
        nodes: &Arena<Id, Node<D>>,
        data: &D,
        children: &[Id],
    ) -> Option<Id> {
        let hash = hash_parts(data, children);
        self.table
            .find(hash, |&id| {
                let node = &nodes[id];
                node.children() == children && node.data() == data
            })
            .copied()
    }

    /// Looks up a canonical node carrying the same key as `id`. Used after
    /// a child-slot rewrite, when `id` itself is out of the table; any hit
    /// is therefore a distinct, congruent node.
    pub fn get_node<D: NodeData>(&self, nodes: &Arena<Id, Node<D>>, id: Id) -> Option<Id> {
        let node = &nodes[id];
        self.get(nodes, node.data(), node.children())
    }

    /// Inserts `id`. The node must be absent and its key unoccupied.
    pub fn insert<D: NodeData>(&mut self, nodes: &mut Arena<Id, Node<D>>, id: Id) {
        debug_assert!(!nodes[id].in_hashcons);
        debug_assert!(self.get_node(nodes, id).is_none());

        let hash = {
            let node = &nodes[id];
            hash_parts(node.data(), node.children())
        };
        self.table.insert_unique(hash, id, |&other| {
            let node = &nodes[other];
            hash_parts(node.data(), node.children())
        });
        nodes[id].in_hashcons = true;
    }

    /// Removes `id`. The node must currently be in the table.
    pub fn erase<D: NodeData>(&mut self, nodes: &mut Arena<Id, Node<D>>, id: Id) {
        debug_assert!(nodes[id].in_hashcons);

        let hash = {
            let node = &nodes[id];
            hash_parts(node.data(), node.children())
        };
        match self.table.find_entry(hash, |&candidate| candidate == id) {
            Ok(entry) => {
                entry.remove();
            }
            Err(_) => debug_assert!(false, "node {id:?} missing from hashcons"),
        }
        nodes[id].in_hashcons = false;
    }
}

impl Debug for Hashcons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hashcons")
            .field("len", &self.table.len())
            .finish()
    }
}
