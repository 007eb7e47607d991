pub mod ddb_policy_repository;
pub mod mem_policy_repository;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::policies::domain::model::PolicyEntity;

#[async_trait]
pub(crate) trait PolicyRepository: Repository<PolicyEntity> {
    // None when no policy is configured for the category
    async fn find_by_category(&self, category: &str) -> LibraryResult<Option<PolicyEntity>>;
}
