//! Parser for the plain-text graph file format.
//!
//! One declaration per line, comments start with `#`:
//!
//! ```text
//! # a triangle with a tail
//! node den 0 0
//! node birch 4 0
//! node creek 2 3
//! node burrow 6 3
//! edge den birch
//! edge den creek
//! edge birch creek
//! edge birch burrow
//! ```
//!
//! Names exist only in the file; they are mapped to allocated node ids at
//! parse time and kept as display labels. Files are read-only input —
//! edited graphs are never written back.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};

use crate::graph::model::{Graph, NodeAttrs, NodeId};

/// A parsed graph plus the name-to-id mapping from the source file.
#[derive(Debug)]
pub struct LoadedGraph {
    pub graph: Graph,
    pub names: BTreeMap<String, NodeId>,
}

/// Parse a graph file. Errors carry the offending line number.
pub fn parse(input: &str) -> Result<LoadedGraph> {
    let mut graph = Graph::new();
    let mut names: BTreeMap<String, NodeId> = BTreeMap::new();

    for (idx, raw) in input.lines().enumerate() {
        let line_num = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let directive = parts.next().expect("non-empty line has a first token");
        match directive {
            "node" => {
                let (name, x, y) = parse_node_args(parts.collect::<Vec<_>>())
                    .with_context(|| format!("invalid node at line {line_num}"))?;
                if names.contains_key(&name) {
                    bail!("duplicate node '{name}' at line {line_num}");
                }
                let id = graph.add_node(NodeAttrs::labelled(x, y, name.clone()));
                names.insert(name, id);
            }
            "edge" => {
                let args: Vec<_> = parts.collect();
                let [a, b] = args.as_slice() else {
                    bail!("invalid edge at line {line_num}: expected 'edge A B'");
                };
                let &a = names
                    .get(*a)
                    .with_context(|| format!("unknown node '{a}' at line {line_num}"))?;
                let &b = names
                    .get(*b)
                    .with_context(|| format!("unknown node '{b}' at line {line_num}"))?;
                // Duplicate pairs are refused by the model; harmless here.
                graph.add_edge(a, b);
            }
            other => bail!("unknown directive '{other}' at line {line_num}"),
        }
    }

    Ok(LoadedGraph { graph, names })
}

fn parse_node_args(args: Vec<&str>) -> Result<(String, f64, f64)> {
    let [name, x, y] = args.as_slice() else {
        bail!("expected 'node NAME X Y'");
    };
    let x: f64 = x.parse().with_context(|| format!("bad x coordinate '{x}'"))?;
    let y: f64 = y.parse().with_context(|| format!("bad y coordinate '{y}'"))?;
    Ok((name.to_string(), x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# a path of three
node a 0 0
node b 1 0

node c 2 0
edge a b
edge b c
";

    #[test]
    fn parses_nodes_edges_comments_and_blanks() {
        let loaded = parse(SAMPLE).unwrap();
        assert_eq!(loaded.graph.node_count(), 3);
        assert_eq!(loaded.graph.edge_count(), 2);

        let b = loaded.names["b"];
        let attrs = loaded.graph.node(b).unwrap();
        assert_eq!((attrs.x, attrs.y), (1.0, 0.0));
        assert_eq!(attrs.label, "b");
        assert_eq!(
            loaded.graph.neighbors(b).len(),
            2,
            "b sits between a and c"
        );
    }

    #[test]
    fn accepts_fractional_coordinates() {
        let loaded = parse("node a 1.5 -2.25\n").unwrap();
        let a = loaded.names["a"];
        let attrs = loaded.graph.node(a).unwrap();
        assert_eq!((attrs.x, attrs.y), (1.5, -2.25));
    }

    #[test]
    fn rejects_duplicate_node_names_with_line_number() {
        let err = parse("node a 0 0\nnode a 1 1\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn rejects_edges_to_unknown_nodes() {
        let err = parse("node a 0 0\nedge a ghost\n").unwrap_err();
        assert!(format!("{err:#}").contains("ghost"), "{err:#}");
    }

    #[test]
    fn rejects_malformed_lines_with_location() {
        let err = parse("node a 0 zero\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 1"), "{err:#}");

        let err = parse("link a b\n").unwrap_err();
        assert!(err.to_string().contains("unknown directive"), "{err}");
    }

    #[test]
    fn duplicate_edges_are_tolerated() {
        let loaded = parse("node a 0 0\nnode b 1 0\nedge a b\nedge b a\n").unwrap();
        assert_eq!(loaded.graph.edge_count(), 1);
    }
}
