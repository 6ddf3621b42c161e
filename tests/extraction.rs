use std::collections::VecDeque;
use std::fmt::{self, Display};

use quotient::{AstSize, Cost, DataCost, EGraph, Extractor, Id, NodeData, SimpleNodeData, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Bool {
    Const(bool),
    Var(Symbol),
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BoolKind {
    Const,
    Var,
    And,
    Or,
    Not,
}

impl NodeData for Bool {
    type Kind = BoolKind;

    fn kind(&self) -> BoolKind {
        match self {
            Bool::Const(_) => BoolKind::Const,
            Bool::Var(_) => BoolKind::Var,
            Bool::And => BoolKind::And,
            Bool::Or => BoolKind::Or,
            Bool::Not => BoolKind::Not,
        }
    }
}

impl Display for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bool::Const(c) => write!(f, "{}", c),
            Bool::Var(v) => write!(f, "{}", v),
            Bool::And => write!(f, "&"),
            Bool::Or => write!(f, "|"),
            Bool::Not => write!(f, "~"),
        }
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Drives the three boolean rules (De Morgan, double negation, excluded
/// middle) to fixpoint through the public matching surface.
fn saturate(egraph: &mut EGraph<Bool>) {
    loop {
        let mut members: Vec<Id> = Vec::new();
        for class in egraph.classes() {
            members.extend(class.iter());
        }

        let mut pending = VecDeque::new();
        for id in members {
            match egraph[id].kind() {
                BoolKind::Not => {
                    let inner: Vec<Id> = egraph.class(egraph[id].children()[0]).iter().collect();
                    for m in inner {
                        match egraph[m].kind() {
                            // ~(a & b) == ~a | ~b
                            BoolKind::And => {
                                let a = egraph.find(egraph[m].children()[0]);
                                let b = egraph.find(egraph[m].children()[1]);
                                let na = egraph.node(Bool::Not, &[a]);
                                let nb = egraph.node(Bool::Not, &[b]);
                                let or = egraph.node(Bool::Or, &[na, nb]);
                                pending.push_back((id, or));
                            }
                            // ~(~a) == a
                            BoolKind::Not => {
                                let a = egraph.find(egraph[m].children()[0]);
                                pending.push_back((id, a));
                            }
                            _ => {}
                        }
                    }
                }
                BoolKind::Or => {
                    // a | ~a == true
                    let a = egraph.find(egraph[id].children()[0]);
                    let b = egraph.find(egraph[id].children()[1]);
                    for (x, y) in [(a, b), (b, a)] {
                        let negated: Vec<Id> =
                            egraph.class(y).match_kind(BoolKind::Not).collect();
                        if negated
                            .iter()
                            .any(|&n| egraph.find(egraph[n].children()[0]) == x)
                        {
                            let truth = egraph.leaf(Bool::Const(true));
                            pending.push_back((id, truth));
                        }
                    }
                }
                _ => {}
            }
        }

        if !egraph.merge_queue(&mut pending) {
            break;
        }
    }
}

#[test]
fn saturate_and_extract_tautology() {
    init_logger();
    let mut egraph = EGraph::new();

    // ~(x & ~x)
    let x = egraph.leaf(Bool::Var(Symbol::from("x")));
    let nx = egraph.node(Bool::Not, &[x]);
    let and = egraph.node(Bool::And, &[x, nx]);
    let root = egraph.node(Bool::Not, &[and]);

    saturate(&mut egraph);

    let truth = egraph.leaf(Bool::Const(true));
    assert!(egraph.equiv(root, truth));

    let extractor = Extractor::new(&egraph, AstSize);
    let (cost, best) = extractor.find_best(root).unwrap();
    assert_eq!(cost, Cost::new(1));
    assert_eq!(*egraph[best].data(), Bool::Const(true));

    let extracted = egraph.extract();
    assert_eq!(extracted[&egraph.find(root)], best);

    let dot = egraph.dot_extracted(&extracted, root).to_string();
    assert!(dot.starts_with("digraph extracted {"));
    assert!(dot.contains("label = \"true\""));
}

#[test]
fn extraction_is_optimal_within_a_class() {
    init_logger();
    let mut egraph: EGraph<SimpleNodeData<&'static str>> = EGraph::new();

    let a = egraph.leaf(SimpleNodeData::new("a"));
    let add = egraph.node(SimpleNodeData::new("+"), &[a, a]);
    let shl = egraph.node(SimpleNodeData::new("<<"), &[a]);
    egraph.merge(add, shl);

    // under unit cost the shift (2 nodes) beats the addition (3 nodes)
    let extractor = Extractor::new(&egraph, AstSize);
    let (cost, best) = extractor.find_best(add).unwrap();
    assert_eq!(cost, Cost::new(2));
    assert_eq!(best, shl);

    // a weighting that penalises shifts flips the choice
    let weights = DataCost::new(|data: &SimpleNodeData<&'static str>| match data.kind() {
        "<<" => Cost::new(5),
        _ => Cost::new(1),
    });
    let extractor = Extractor::new(&egraph, weights);
    let (cost, best) = extractor.find_best(shl).unwrap();
    assert_eq!(cost, Cost::new(3));
    assert_eq!(best, add);
}

#[test]
fn extraction_follows_merged_leaves() {
    init_logger();
    let mut egraph: EGraph<SimpleNodeData<&'static str>> = EGraph::new();

    let x = egraph.leaf(SimpleNodeData::new("x"));
    let heavy = {
        let a = egraph.leaf(SimpleNodeData::new("a"));
        let b = egraph.leaf(SimpleNodeData::new("b"));
        egraph.node(SimpleNodeData::new("pair"), &[a, b])
    };
    egraph.merge(heavy, x);

    // the class holds both the application and the leaf; the leaf wins
    let extracted = egraph.extract();
    let best = extracted[&egraph.find(heavy)];
    assert_eq!(*egraph[best].data(), SimpleNodeData::new("x"));

    // every class gets a representative
    assert_eq!(extracted.len(), egraph.roots().len());
}
