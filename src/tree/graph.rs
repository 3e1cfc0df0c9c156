use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use super::error::TreeError;
use super::parse::{RawDataset, RawNode};

#[derive(Clone, Debug, Default)]
pub struct Profile {
    pub affiliation_name: Option<String>,
    pub affiliation_domain: Option<String>,
    pub research_area_summary: Option<String>,
    pub expertise_keywords: Vec<String>,
    pub homepage: Option<String>,
    pub gscholar: Option<String>,
    pub dblp: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AdvisorNode {
    pub id: String,
    pub name: Option<String>,
    pub depth: u32,
    pub direct_advisee_count: u32,
    pub total_descendants: u32,
    pub profile: Profile,
}

impl AdvisorNode {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Sizing weight: descendants plus half the direct advisees.
    pub fn influence(&self) -> f32 {
        self.total_descendants as f32 + (self.direct_advisee_count as f32 * 0.5)
    }
}

impl From<RawNode> for AdvisorNode {
    fn from(raw: RawNode) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            depth: raw.depth,
            direct_advisee_count: raw.direct_advisee_count,
            total_descendants: raw.total_descendants,
            profile: Profile {
                affiliation_name: raw.affiliation_name,
                affiliation_domain: raw.affiliation_domain,
                research_area_summary: raw.research_area_summary,
                expertise_keywords: raw.expertise_keywords,
                homepage: raw.homepage,
                gscholar: raw.gscholar,
                dblp: raw.dblp,
            },
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TreeSummary {
    pub total_nodes: usize,
    pub direct_advisees: usize,
    pub max_depth: u32,
    pub depth_counts: BTreeMap<String, usize>,
    pub generated_from: Option<String>,
}

/// Validated advisor dataset. Edges are stored as `(advisor, advisee)` index pairs.
#[derive(Clone, Debug)]
pub struct AdvisorTree {
    pub root_id: String,
    pub nodes: Vec<AdvisorNode>,
    pub edges: Vec<(usize, usize)>,
    pub summary: TreeSummary,
    pub generated_at: Option<String>,
    root_index: usize,
    index_by_id: HashMap<String, usize>,
}

impl AdvisorTree {
    pub(super) fn from_raw(raw: RawDataset) -> Result<Self, TreeError> {
        let mut index_by_id = HashMap::with_capacity(raw.nodes.len());
        let mut nodes = Vec::with_capacity(raw.nodes.len());
        for raw_node in raw.nodes {
            if index_by_id.contains_key(&raw_node.id) {
                return Err(TreeError::DuplicateNode { id: raw_node.id });
            }
            index_by_id.insert(raw_node.id.clone(), nodes.len());
            nodes.push(AdvisorNode::from(raw_node));
        }

        let Some(&root_index) = index_by_id.get(&raw.root) else {
            return Err(TreeError::MissingRoot { root: raw.root });
        };

        let mut edges = Vec::with_capacity(raw.edges.len());
        for edge in raw.edges {
            let from = index_by_id.get(&edge.from).copied();
            let to = index_by_id.get(&edge.to).copied();
            let (from, to) = match (from, to) {
                (Some(from), Some(to)) => (from, to),
                (None, _) => {
                    let missing = edge.from.clone();
                    return Err(TreeError::UnknownEndpoint {
                        from: edge.from,
                        to: edge.to,
                        missing,
                    });
                }
                (_, None) => {
                    let missing = edge.to.clone();
                    return Err(TreeError::UnknownEndpoint {
                        from: edge.from,
                        to: edge.to,
                        missing,
                    });
                }
            };

            // The root has no advisor inside the tree.
            if to == root_index {
                warn!(from = %edge.from, root = %edge.to, "ignoring edge into the root");
                continue;
            }
            if from != to {
                edges.push((from, to));
            }
        }

        let summary = raw
            .summary
            .map(|summary| TreeSummary {
                total_nodes: summary.total_nodes,
                direct_advisees: summary.direct_advisees,
                max_depth: summary.max_depth,
                depth_counts: summary.depth_counts,
                generated_from: summary.generated_from,
            })
            .unwrap_or_default();

        Ok(Self {
            root_id: raw.root,
            nodes,
            edges,
            summary,
            generated_at: raw.generated_at,
            root_index,
            index_by_id,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn root_index(&self) -> usize {
        self.root_index
    }

    pub fn node(&self, id: &str) -> Option<&AdvisorNode> {
        self.index_of(id).map(|index| &self.nodes[index])
    }
}
