use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::parser::graph::{self, LoadedGraph};

/// Parse a graph file and print a short report without opening the board.
pub fn run(path: &Path) -> Result<()> {
    let input =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let loaded = graph::parse(&input)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    for line in summary(&loaded) {
        println!("{line}");
    }
    Ok(())
}

fn summary(loaded: &LoadedGraph) -> Vec<String> {
    let graph = &loaded.graph;
    let mut lines = vec![
        format!("nodes: {}", graph.node_count()),
        format!("edges: {}", graph.edge_count()),
    ];

    // An isolated node has no neighbor for the fox to arrive from, so a
    // single day eliminates it. Worth flagging before a hunt starts.
    let isolated: Vec<&str> = loaded
        .names
        .iter()
        .filter(|&(_, &id)| graph.neighbors(id).is_empty())
        .map(|(name, _)| name.as_str())
        .collect();
    if isolated.is_empty() {
        lines.push("isolated nodes: none".to_string());
    } else {
        lines.push(format!("isolated nodes: {}", isolated.join(", ")));
    }
    lines
}
