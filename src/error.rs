use crate::batch::{BatchId, Stage, Status};
use crate::registry::Role;

/// Typed failure of every ledger operation. Rejections happen before any
/// write, so an `Err` always means the stored state is untouched.
#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("caller holds role {actual}, {required} required")]
    Unauthorized { required: Role, actual: Role },
    #[error("{action} not permitted at stage {stage}, status {status}")]
    InvalidTransition {
        action: &'static str,
        stage: Stage,
        status: Status,
    },
    #[error("batch {0} does not exist")]
    NotFound(BatchId),
    #[error("batch {0} already exists")]
    DuplicateCreate(BatchId),
    #[error("history index {index} out of range, batch has {len} entries")]
    HistoryOutOfRange { index: u64, len: u64 },
    #[error("role assignment by {caller} denied by policy")]
    AssignmentDenied { caller: String },
    #[error("storage failure")]
    Storage(#[from] sled::Error),
    #[error("codec failure: {0}")]
    Codec(String),
}

impl From<minicbor::decode::Error> for LedgerError {
    fn from(err: minicbor::decode::Error) -> Self {
        LedgerError::Codec(err.to_string())
    }
}
