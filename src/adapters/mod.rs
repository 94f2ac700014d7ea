pub mod local;
pub mod remote;

use crate::errors::{AppError, AppResult};
use crate::models::Document;

pub use local::{LocalStore, STORAGE_KEY};
pub use remote::RemoteStore;

// Uniform mutation/query surface over one backing store. Every mutation
// takes the caller's current document plus arguments and returns the new
// canonical document reflecting the store's post-mutation state.
// Implementations may consult the passed document or re-read backing truth
// themselves; both must satisfy the same shape and cascade invariants so
// backends can be swapped without touching the caller.
pub trait StorageAdapter: Send + Sync {
    fn load_state(&self) -> AppResult<Document>;

    fn add_todo(&self, state: &Document, text: &str) -> AppResult<Document>;
    fn delete_todo(&self, state: &Document, id: &str) -> AppResult<Document>;

    fn create_block(&self, state: &Document, name: &str) -> AppResult<Document>;
    fn delete_block(&self, state: &Document, block_id: &str) -> AppResult<Document>;
    fn add_block_task(&self, state: &Document, block_id: &str, text: &str) -> AppResult<Document>;
    fn delete_block_task(&self, state: &Document, block_id: &str, task_id: &str) -> AppResult<Document>;

    fn add_block_to_today(&self, state: &Document, block_id: &str) -> AppResult<Document>;
    fn remove_today_block(&self, state: &Document, today_block_id: &str) -> AppResult<Document>;
    fn add_today_block_task(&self, state: &Document, today_block_id: &str, text: &str) -> AppResult<Document>;
    fn delete_today_block_task(
        &self,
        state: &Document,
        today_block_id: &str,
        task_id: &str,
    ) -> AppResult<Document>;
}

pub(crate) fn require_text(label: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Invalid(format!("{label} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::require_text;

    #[test]
    fn require_text_trims_and_rejects_empty() {
        assert_eq!(require_text("task text", "  walk  ").unwrap(), "walk");
        assert!(require_text("task text", "   ").is_err());
        assert!(require_text("block name", "").is_err());
    }
}
