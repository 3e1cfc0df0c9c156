use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::graph::AdvisorTree;
use super::parse::parse_dataset;

pub fn load_tree(path: &Path) -> Result<AdvisorTree> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let tree = parse_tree(&raw).with_context(|| format!("rejected dataset {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = tree.node_count(),
        edges = tree.edges.len(),
        generated_at = tree.generated_at.as_deref().unwrap_or("unknown"),
        "advisor tree loaded"
    );
    Ok(tree)
}

pub fn parse_tree(raw: &str) -> Result<AdvisorTree> {
    let dataset = parse_dataset(raw)?;
    let tree = AdvisorTree::from_raw(dataset)?;

    if tree.summary.total_nodes != 0 && tree.summary.total_nodes != tree.node_count() {
        tracing::warn!(
            declared = tree.summary.total_nodes,
            actual = tree.node_count(),
            "summary node count does not match node list"
        );
    }
    Ok(tree)
}
