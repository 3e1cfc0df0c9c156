use thiserror::Error;

/// Reasons an advisor tree dataset is rejected at load time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("root `{root}` is not present in the node list")]
    MissingRoot { root: String },

    #[error("node id `{id}` appears more than once")]
    DuplicateNode { id: String },

    #[error("edge {from} -> {to} references unknown node `{missing}`")]
    UnknownEndpoint {
        from: String,
        to: String,
        missing: String,
    },
}
