pub mod ddb_copy_repository;
pub mod mem_copy_repository;

use async_trait::async_trait;
use crate::copies::domain::model::CopyEntity;
use crate::core::library::{CopyState, LibraryResult};
use crate::core::repository::Repository;

#[async_trait]
pub(crate) trait CopyRepository: Repository<CopyEntity> {
    async fn find_by_code(&self, code: &str) -> LibraryResult<CopyEntity>;

    // atomically flips the state only when the stored state is still `expected`,
    // returns false when another writer got there first
    async fn compare_and_set_state(&self, copy_id: &str, expected: CopyState,
                                   new_state: CopyState) -> LibraryResult<bool>;
}
