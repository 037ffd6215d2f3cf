use thiserror::Error;

use crate::{EdgeId, NodeId};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid node index {0}")]
    InvalidNodeIndex(NodeId),
    #[error("Invalid edge index {0}")]
    InvalidEdgeIndex(EdgeId),
    #[error("Intersection with same name already exists: {0}")]
    DuplicateIntersection(String),
    #[error("Intersection not found: {0}")]
    IntersectionNotFound(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// True for the out-of-range kind (bad node or edge handle)
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Error::InvalidNodeIndex(_) | Error::InvalidEdgeIndex(_))
    }
}
