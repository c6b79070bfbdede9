use crate::errors::error::Error as CrateError;

/// Error taxonomy for the tree-merge engine.
///
/// Structural invariant violations are not represented here: the engine
/// panics for those (see the module docs on `Collector`/`Resolver`), since
/// they indicate a programming error rather than a recoverable condition.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("failed to read or write object store: {0}")]
    Store(#[from] Box<CrateError>),
    #[error("collecting merge info failed for trees {base}, {side1}, {side2}")]
    CollectMergeInfo {
        base: String,
        side1: String,
        side2: String,
    },
    #[error("{0}")]
    Generic(String),
}

impl From<CrateError> for MergeError {
    fn from(err: CrateError) -> Self {
        MergeError::Store(Box::new(err))
    }
}
