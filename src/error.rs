use thiserror::Error;

use crate::core::{NodeId, ScaffoldId};

pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("unknown scaffolding element: {0}")]
    UnknownScaffold(ScaffoldId),

    #[error("node `{0}` is not a container")]
    NotAContainer(NodeId),

    #[error("no drag session is active for container `{0}`")]
    NoDragSession(NodeId),
}
