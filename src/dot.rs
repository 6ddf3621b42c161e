//! E-graph visualization with [GraphViz].
//!
//! [`Dot`] renders the whole graph, one dotted cluster per class;
//! [`ExtractedDot`] renders the representative DAG chosen by an
//! extraction. Both implement [`Display`], so they can be written to any
//! stream; the helpers on [`Dot`] additionally pipe through a `dot`
//! binary.
//!
//! [GraphViz]: https://graphviz.gitlab.io/

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt::{self, Debug, Display, Formatter};
use std::io::{Error, ErrorKind, Result, Write};
use std::path::Path;

use crate::util::IndexSet;
use crate::{EGraph, Id, NodeData};

impl<D: NodeData> EGraph<D> {
    /// Makes a GraphViz view of the whole graph.
    pub fn dot(&self) -> Dot<'_, D> {
        Dot { egraph: self }
    }

    /// Makes a GraphViz view of the extracted DAG below `root`, where
    /// `extracted` is a map produced by [`extract`](EGraph::extract) or
    /// [`extract_with`](EGraph::extract_with).
    pub fn dot_extracted<'a>(
        &'a self,
        extracted: &'a HashMap<Id, Id>,
        root: Id,
    ) -> ExtractedDot<'a, D> {
        ExtractedDot {
            egraph: self,
            extracted,
            root,
        }
    }
}

impl<D: NodeData + Display> EGraph<D> {
    /// Writes the whole-graph GraphViz source to `writer`.
    pub fn write_dot<W: Write>(&self, writer: &mut W) -> Result<()> {
        write!(writer, "{}", self.dot())
    }
}

/// A wrapper for an [`EGraph`] that outputs GraphViz source on [`Display`].
pub struct Dot<'a, D: NodeData> {
    egraph: &'a EGraph<D>,
}

impl<D: NodeData> Dot<'_, D> {
    /// Writes the GraphViz source to a file. Does _not_ require a `dot`
    /// binary.
    pub fn to_dot(&self, filename: impl AsRef<Path>) -> Result<()>
    where
        D: Display,
    {
        let mut file = std::fs::File::create(filename)?;
        write!(file, "{}", self)?;
        Ok(())
    }

    /// Renders to an .svg file. Requires a `dot` binary on `$PATH`.
    pub fn to_svg(&self, filename: impl AsRef<Path>) -> Result<()>
    where
        D: Display,
    {
        self.run_dot(["-Tsvg".as_ref(), "-o".as_ref(), filename.as_ref().as_os_str()])
    }

    /// Renders to a .png file. Requires a `dot` binary on `$PATH`.
    pub fn to_png(&self, filename: impl AsRef<Path>) -> Result<()>
    where
        D: Display,
    {
        self.run_dot(["-Tpng".as_ref(), "-o".as_ref(), filename.as_ref().as_os_str()])
    }

    /// Invokes `dot` with the given arguments, piping the formatted
    /// source into stdin.
    pub fn run_dot<S, I>(&self, args: I) -> Result<()>
    where
        S: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        D: Display,
    {
        self.run("dot", args)
    }

    /// Invokes some GraphViz-compatible program with the given arguments,
    /// piping the formatted source into stdin.
    pub fn run<S1, S2, I>(&self, program: S1, args: I) -> Result<()>
    where
        S1: AsRef<OsStr>,
        S2: AsRef<OsStr>,
        I: IntoIterator<Item = S2>,
        D: Display,
    {
        use std::process::{Command, Stdio};
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()?;
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        write!(stdin, "{}", self)?;
        match child.wait()?.code() {
            Some(0) => Ok(()),
            Some(e) => Err(Error::new(
                ErrorKind::Other,
                format!("dot program returned error code {}", e),
            )),
            None => Err(Error::new(
                ErrorKind::Other,
                "dot program was killed by a signal",
            )),
        }
    }
}

impl<D: NodeData> Debug for Dot<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dot({:?} nodes)", self.egraph.len())
    }
}

impl<D: NodeData + Display> Display for Dot<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph egraph {{")?;

        // set compound=true to enable edges to clusters
        writeln!(f, "  compound=true")?;
        writeln!(f, "  clusterrank=local")?;

        // define all the nodes, clustered by class
        for class in self.egraph.classes() {
            writeln!(f, "  subgraph cluster_{} {{", class.root())?;
            writeln!(f, "    style=dotted")?;
            for id in class.iter() {
                writeln!(f, "    n{}[label = \"{}\"]", id, self.egraph[id].data())?;
            }
            writeln!(f, "  }}")?;
        }

        for class in self.egraph.classes() {
            for id in class.iter() {
                for (slot, &child) in self.egraph[id].children().iter().enumerate() {
                    // clip the edge to the child's cluster with lhead
                    let child_root = self.egraph.find(child);
                    if child_root == class.root() {
                        writeln!(
                            f,
                            "  n{} -> n{}:n [lhead = cluster_{}, label = {}]",
                            id, id, child_root, slot
                        )?;
                    } else {
                        let target = self
                            .egraph
                            .class(child_root)
                            .iter()
                            .next()
                            .unwrap_or(child_root);
                        writeln!(
                            f,
                            "  n{} -> n{} [lhead = cluster_{}, label = {}]",
                            id, target, child_root, slot
                        )?;
                    }
                }
            }
        }

        write!(f, "}}")
    }
}

/// A wrapper outputting the GraphViz source of one extracted DAG.
pub struct ExtractedDot<'a, D: NodeData> {
    egraph: &'a EGraph<D>,
    extracted: &'a HashMap<Id, Id>,
    root: Id,
}

impl<D: NodeData> ExtractedDot<'_, D> {
    /// Writes the GraphViz source to a file.
    pub fn to_dot(&self, filename: impl AsRef<Path>) -> Result<()>
    where
        D: Display,
    {
        let mut file = std::fs::File::create(filename)?;
        write!(file, "{}", self)?;
        Ok(())
    }

    /// The classes reachable from the root through chosen representatives,
    /// in a deterministic order.
    fn reachable(&self) -> IndexSet<Id> {
        let mut visited = IndexSet::default();
        let mut stack = vec![self.egraph.find(self.root)];
        while let Some(class) = stack.pop() {
            if !visited.insert(class) {
                continue;
            }
            if let Some(&node) = self.extracted.get(&class) {
                for &child in self.egraph[node].children() {
                    stack.push(self.egraph.find(child));
                }
            }
        }
        visited
    }
}

impl<D: NodeData + Display> Display for ExtractedDot<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let reachable = self.reachable();

        writeln!(f, "digraph extracted {{")?;
        for &class in &reachable {
            if let Some(&node) = self.extracted.get(&class) {
                writeln!(f, "  n{}[label = \"{}\"]", node, self.egraph[node].data())?;
            }
        }
        for &class in &reachable {
            let Some(&node) = self.extracted.get(&class) else {
                continue;
            };
            for (slot, &child) in self.egraph[node].children().iter().enumerate() {
                if let Some(&target) = self.extracted.get(&self.egraph.find(child)) {
                    writeln!(f, "  n{} -> n{} [label = {}]", node, target, slot)?;
                }
            }
        }
        write!(f, "}}")
    }
}
