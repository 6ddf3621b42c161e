/// An interned string, provided by the
/// [`symbol_table`](https://crates.io/crates/symbol_table) crate.
///
/// Operator alphabets frequently carry variable names or other string
/// immediates in their [`NodeData`](crate::NodeData) payloads. A [`Symbol`]
/// is a 4-byte handle into a global table, so it keeps payloads small and
/// makes equality and hashing cheap. The table leaks its strings, which is
/// fine for identifiers.
///
/// # Example
/// ```
/// use quotient::Symbol;
///
/// assert_eq!(Symbol::from("foo"), Symbol::from("foo"));
/// assert_ne!(Symbol::from("foo"), Symbol::from("bar"));
/// ```
pub use symbol_table::GlobalSymbol as Symbol;

pub(crate) type BuildHasher = fxhash::FxBuildHasher;

pub(crate) type HashMap<K, V> = hashbrown::HashMap<K, V, BuildHasher>;
pub(crate) type IndexSet<K> = indexmap::IndexSet<K, BuildHasher>;
