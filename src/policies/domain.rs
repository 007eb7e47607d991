pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::policies::domain::model::PolicySnapshot;
use crate::policies::dto::PolicyDto;

#[async_trait]
pub(crate) trait PolicyService: Sync + Send {
    // returns the policy configured for the category, or the fallback policy when there is none
    async fn resolve_policy(&self, category: &str) -> LibraryResult<PolicySnapshot>;
    async fn add_policy(&self, policy: &PolicyDto) -> LibraryResult<PolicyDto>;
    async fn update_policy(&self, policy: &PolicyDto) -> LibraryResult<PolicyDto>;
    async fn find_policy_for_category(&self, category: &str) -> LibraryResult<Option<PolicyDto>>;
}
