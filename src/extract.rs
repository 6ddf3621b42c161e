use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::{self, Debug, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use log::debug;

use crate::util::HashMap;
use crate::{EGraph, Id, Node, NodeData};

/// A saturating 64-bit term cost.
///
/// Addition saturates at [`Cost::INF`], the "unreachable so far" sentinel,
/// so overflow can never corrupt the extraction order.
///
/// ```
/// use quotient::Cost;
///
/// assert_eq!(Cost::INF + Cost::new(1), Cost::INF);
/// assert_eq!(Cost::new(u64::MAX - 1) + Cost::new(5), Cost::INF);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cost(u64);

impl Cost {
    /// The additive identity.
    pub const ZERO: Cost = Cost(0);

    /// The saturation point, representing an unreachable class.
    pub const INF: Cost = Cost(u64::MAX);

    /// Wraps a plain cost value.
    pub const fn new(value: u64) -> Cost {
        Cost(value)
    }

    /// Whether this cost is below [`Cost::INF`].
    pub fn is_finite(self) -> bool {
        self != Cost::INF
    }
}

impl From<u64> for Cost {
    fn from(value: u64) -> Cost {
        Cost(value)
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        Cost(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Cost) {
        *self = *self + rhs;
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Cost>>(iter: I) -> Cost {
        iter.fold(Cost::ZERO, Add::add)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_finite() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "inf")
        }
    }
}

impl Debug for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// Computes the cost of one node from the best known costs of its
/// children's classes.
///
/// Implementations must return a strictly positive cost that exceeds the
/// cost of every child; the extractor's upward Dijkstra relies on this
/// monotonicity to finalise cheaper classes first.
pub trait CostFunction<D: NodeData> {
    /// Costs `node`, looking child costs up through `costs`. The argument
    /// to `costs` must be one of `node`'s children.
    fn cost<C>(&mut self, node: &Node<D>, costs: C) -> Cost
    where
        C: FnMut(Id) -> Cost;
}

/// The unit cost function: every node costs 1 plus its children.
///
/// Extraction under [`AstSize`] picks the representative with the fewest
/// nodes in its term DAG (counting shared subterms once per occurrence).
#[derive(Debug, Clone, Copy, Default)]
pub struct AstSize;

impl<D: NodeData> CostFunction<D> for AstSize {
    fn cost<C>(&mut self, node: &Node<D>, mut costs: C) -> Cost
    where
        C: FnMut(Id) -> Cost,
    {
        node.children()
            .iter()
            .fold(Cost::new(1), |sum, &child| sum + costs(child))
    }
}

/// Derives a [`CostFunction`] from a per-payload cost: a node costs its
/// payload's cost plus the sum of its children's class costs.
#[derive(Debug, Clone, Copy)]
pub struct DataCost<F>(F);

impl<F> DataCost<F> {
    /// Wraps a per-payload cost function.
    pub fn new(data_cost: F) -> Self {
        DataCost(data_cost)
    }
}

impl<D, F> CostFunction<D> for DataCost<F>
where
    D: NodeData,
    F: FnMut(&D) -> Cost,
{
    fn cost<C>(&mut self, node: &Node<D>, mut costs: C) -> Cost
    where
        C: FnMut(Id) -> Cost,
    {
        node.children()
            .iter()
            .fold((self.0)(node.data()), |sum, &child| sum + costs(child))
    }
}

/// Computes one minimum-cost representative per class.
///
/// Construction runs a Dijkstra-style upward propagation: leaves seed a
/// priority queue, and popping a finalised class relaxes every parent on
/// its use list. Stale heap entries are tolerated and discarded on pop.
/// Ties break deterministically: the first node to reach a class's best
/// cost stays its representative.
pub struct Extractor<'a, D: NodeData, CF> {
    egraph: &'a EGraph<D>,
    cost_fn: CF,
    best: HashMap<Id, (Cost, Id)>,
}

impl<'a, D: NodeData, CF: CostFunction<D>> Extractor<'a, D, CF> {
    /// Computes best costs for every class of `egraph`.
    pub fn new(egraph: &'a EGraph<D>, cost_fn: CF) -> Self {
        let mut best = HashMap::default();
        for root in egraph.roots() {
            best.insert(root, (Cost::INF, root));
        }

        let mut extractor = Extractor {
            egraph,
            cost_fn,
            best,
        };
        extractor.find_costs();
        extractor
    }

    /// The minimum cost and representative of `id`'s class, or `None` if
    /// every term of the class transitively depends on an unreachable
    /// class.
    pub fn find_best(&self, id: Id) -> Option<(Cost, Id)> {
        let (cost, node) = self.best[&self.egraph.find(id)];
        cost.is_finite().then_some((cost, node))
    }

    fn find_costs(&mut self) {
        let egraph = self.egraph;
        let mut heap: BinaryHeap<(Reverse<Cost>, Id)> = BinaryHeap::new();

        for class in egraph.classes() {
            let root = class.root();
            for id in class.iter() {
                let node = &egraph[id];
                if node.is_leaf() {
                    let cost = self.cost_fn.cost(node, |_| Cost::INF);
                    self.relax(&mut heap, root, id, cost);
                }
            }
        }

        let mut pops = 0usize;
        while let Some((Reverse(cost), root)) = heap.pop() {
            pops += 1;
            if self.best[&root].0 != cost {
                // lazily deleted: a cheaper entry already ran
                continue;
            }

            for (parent, _slot) in egraph.uses_of(root) {
                let node = &egraph[parent];
                if !node.is_in_hashcons() {
                    continue;
                }
                let best = &self.best;
                let cost = self
                    .cost_fn
                    .cost(node, |child| best[&egraph.find(child)].0);
                self.relax(&mut heap, egraph.find(parent), parent, cost);
            }
        }

        debug!(
            "extraction finished after {} pops over {} classes",
            pops,
            self.best.len()
        );
    }

    fn relax(
        &mut self,
        heap: &mut BinaryHeap<(Reverse<Cost>, Id)>,
        root: Id,
        node: Id,
        cost: Cost,
    ) {
        debug_assert!(cost > Cost::ZERO, "costs must be strictly positive");
        let entry = self.best.get_mut(&root).unwrap();
        if cost < entry.0 {
            *entry = (cost, node);
            heap.push((Reverse(cost), root));
        }
    }
}

impl<D: NodeData> EGraph<D> {
    /// Computes the minimum-cost representative of every class under
    /// [`AstSize`]. The result maps each reachable class root to the
    /// chosen member node.
    pub fn extract(&self) -> std::collections::HashMap<Id, Id> {
        self.extract_with(AstSize)
    }

    /// Like [`extract`](EGraph::extract) with a caller-supplied cost
    /// function. Classes whose best cost is still [`Cost::INF`] are left
    /// out of the map; on an empty graph the map is empty.
    pub fn extract_with<CF: CostFunction<D>>(
        &self,
        cost_fn: CF,
    ) -> std::collections::HashMap<Id, Id> {
        let extractor = Extractor::new(self, cost_fn);
        self.roots()
            .filter_map(|root| extractor.find_best(root).map(|(_, node)| (root, node)))
            .collect()
    }
}
