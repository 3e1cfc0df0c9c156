mod error;
#[cfg(test)]
pub(crate) mod fixtures;
mod graph;
mod hierarchy;
mod load;
mod parse;

pub use graph::{AdvisorNode, AdvisorTree, TreeSummary};
pub use hierarchy::Hierarchy;
pub use load::load_tree;
