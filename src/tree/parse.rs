use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawDataset {
    pub(super) root: String,
    #[serde(default)]
    pub(super) summary: Option<RawSummary>,
    #[serde(default)]
    pub(super) generated_at: Option<String>,
    #[serde(default)]
    pub(super) nodes: Vec<RawNode>,
    #[serde(default)]
    pub(super) edges: Vec<RawEdge>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(super) struct RawSummary {
    #[serde(default)]
    pub(super) total_nodes: usize,
    #[serde(default)]
    pub(super) direct_advisees: usize,
    #[serde(default)]
    pub(super) max_depth: u32,
    #[serde(default)]
    pub(super) depth_counts: BTreeMap<String, usize>,
    #[serde(default)]
    pub(super) generated_from: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawNode {
    pub(super) id: String,
    #[serde(default)]
    pub(super) name: Option<String>,
    #[serde(default)]
    pub(super) depth: u32,
    #[serde(default)]
    pub(super) direct_advisee_count: u32,
    #[serde(default)]
    pub(super) total_descendants: u32,
    #[serde(default)]
    pub(super) affiliation_name: Option<String>,
    #[serde(default)]
    pub(super) affiliation_domain: Option<String>,
    #[serde(default)]
    pub(super) research_area_summary: Option<String>,
    #[serde(default)]
    pub(super) expertise_keywords: Vec<String>,
    #[serde(default)]
    pub(super) homepage: Option<String>,
    #[serde(default)]
    pub(super) gscholar: Option<String>,
    #[serde(default)]
    pub(super) dblp: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawEdge {
    pub(super) from: String,
    pub(super) to: String,
}

pub(super) fn parse_dataset(raw: &str) -> Result<RawDataset> {
    serde_json::from_str(raw).context("invalid advisor tree JSON")
}
