use crate::errors::FolioResult;
use crate::models::PolicyState;

/// Checkpoint storage for the ranking policy.
pub trait IPolicyStore: Send + Sync {
    fn save_policy(&self, state: &PolicyState) -> FolioResult<()>;

    /// The most recent checkpoint, if any.
    fn load_policy(&self) -> FolioResult<Option<PolicyState>>;
}
