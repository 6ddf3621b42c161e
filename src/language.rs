use std::fmt::{self, Debug, Display};
use std::hash::Hash;

/// The user-supplied payload of a term node.
///
/// A payload identifies the applied operator together with any immediates
/// (constants, variable names). The e-graph hash-conses nodes on
/// `(payload, children)`, so payloads must be cheap to compare, hash and
/// clone. Keep them small; use [`Symbol`](crate::Symbol) for string
/// immediates.
///
/// The associated [`Kind`](NodeData::Kind) identifies the operator alone,
/// ignoring immediates, and drives
/// [`EClass::match_kind`](crate::EClass::match_kind). For payloads that
/// carry no immediates, [`SimpleNodeData`] makes the whole payload the
/// kind.
pub trait NodeData: Debug + Clone + Eq + Hash {
    /// The operator part of the payload.
    type Kind: Debug + Clone + Eq + Hash;

    /// Extracts the operator kind, discarding immediates.
    fn kind(&self) -> Self::Kind;
}

/// A [`NodeData`] for operator alphabets with no immediates: the operator
/// kind is the entire payload.
///
/// # Example
/// ```
/// use quotient::{EGraph, SimpleNodeData};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Math {
///     Zero,
///     Succ,
/// }
///
/// let mut egraph = EGraph::new();
/// let zero = egraph.leaf(SimpleNodeData::new(Math::Zero));
/// let one = egraph.node(SimpleNodeData::new(Math::Succ), &[zero]);
/// assert_ne!(egraph.find(zero), egraph.find(one));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimpleNodeData<K>(K);

impl<K> SimpleNodeData<K> {
    /// Wraps an operator kind.
    pub fn new(kind: K) -> Self {
        SimpleNodeData(kind)
    }
}

impl<K: Debug + Clone + Eq + Hash> NodeData for SimpleNodeData<K> {
    type Kind = K;

    fn kind(&self) -> K {
        self.0.clone()
    }
}

impl<K> From<K> for SimpleNodeData<K> {
    fn from(kind: K) -> Self {
        SimpleNodeData(kind)
    }
}

impl<K: Debug> Debug for SimpleNodeData<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<K: Display> Display for SimpleNodeData<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
