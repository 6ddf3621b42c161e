//! Union-find over term nodes.
//!
//! Unlike a free-standing disjoint-set structure, the parent and rank
//! fields live inline in each [`Node`], so the operations here are free
//! functions over the node arena. The representative of a class is the
//! root node itself; merging classes is a pointer swing plus the rank
//! rule, and the caller splices the class rings afterwards.

use crate::arena::Arena;
use crate::egraph::Node;
use crate::{Id, NodeData};

/// Returns the representative of the class `current` belongs to.
pub(crate) fn find<D: NodeData>(nodes: &Arena<Id, Node<D>>, mut current: Id) -> Id {
    while let Some(up) = nodes[current].up {
        current = up;
    }
    current
}

/// Equivalent to [`find`] but relinks every node on the walked chain
/// directly to the root, so later walks are O(1).
pub(crate) fn find_mut<D: NodeData>(nodes: &mut Arena<Id, Node<D>>, current: Id) -> Id {
    let root = find(nodes, current);
    let mut cursor = current;
    while let Some(up) = nodes[cursor].up {
        nodes[cursor].up = Some(root);
        cursor = up;
    }
    root
}

/// Makes `loser` a child of `winner`.
///
/// Both must be distinct roots and `loser` must not out-rank `winner`; on
/// equal ranks the winner's rank increases by one. Class rings and use
/// lists are the caller's problem.
pub(crate) fn union<D: NodeData>(nodes: &mut Arena<Id, Node<D>>, loser: Id, winner: Id) {
    debug_assert_ne!(loser, winner);
    debug_assert!(nodes[loser].up.is_none());
    debug_assert!(nodes[winner].up.is_none());
    debug_assert!(nodes[loser].rank <= nodes[winner].rank);

    if nodes[loser].rank == nodes[winner].rank {
        nodes[winner].rank += 1;
    }
    nodes[loser].up = Some(winner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimpleNodeData;

    fn singleton(arena: &mut Arena<Id, Node<SimpleNodeData<u32>>>, kind: u32) -> Id {
        arena.push(Node::bare(SimpleNodeData::new(kind)))
    }

    #[test]
    fn union_find() {
        let mut nodes = Arena::new();
        let ids: Vec<Id> = (0..10).map(|i| singleton(&mut nodes, i)).collect();

        // two sets, unioned in chain order
        for &later in &ids[1..4] {
            let root = find(&nodes, ids[0]);
            union(&mut nodes, later, root);
        }
        for &later in &ids[7..10] {
            let root = find(&nodes, ids[6]);
            union(&mut nodes, later, root);
        }

        for i in 1..4 {
            assert_eq!(find(&nodes, ids[i]), ids[0]);
        }
        assert_eq!(find(&nodes, ids[4]), ids[4]);
        assert_eq!(find(&nodes, ids[5]), ids[5]);
        for i in 7..10 {
            assert_eq!(find(&nodes, ids[i]), ids[6]);
        }
        assert_ne!(find(&nodes, ids[0]), find(&nodes, ids[6]));
    }

    #[test]
    fn rank_rule() {
        let mut nodes = Arena::new();
        let a = singleton(&mut nodes, 0);
        let b = singleton(&mut nodes, 1);
        let c = singleton(&mut nodes, 2);

        // equal ranks: winner's rank bumps
        union(&mut nodes, a, b);
        assert_eq!(nodes[b].rank, 1);
        assert_eq!(nodes[a].rank, 0);

        // strictly lower-ranked loser: no bump
        union(&mut nodes, c, b);
        assert_eq!(nodes[b].rank, 1);
    }

    #[test]
    fn path_compression() {
        let mut nodes = Arena::new();
        let ids: Vec<Id> = (0..5).map(|i| singleton(&mut nodes, i)).collect();

        // build a deliberate chain 0 -> 1 -> 2 -> 3 -> 4
        for window in ids.windows(2) {
            nodes[window[0]].up = Some(window[1]);
        }
        nodes[ids[4]].rank = 4;

        assert_eq!(find_mut(&mut nodes, ids[0]), ids[4]);
        for &id in &ids[..4] {
            assert_eq!(nodes[id].up, Some(ids[4]));
        }
    }
}
