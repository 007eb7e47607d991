pub mod eligibility;
pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::members::dto::MemberDto;

#[async_trait]
pub(crate) trait MemberService: Sync + Send {
    async fn find_member_by_external_id(&self, external_id: &str) -> LibraryResult<MemberDto>;
    async fn find_member_by_id(&self, id: &str) -> LibraryResult<MemberDto>;
    // number of the member's loans that are not returned yet
    async fn count_active_loans(&self, member_id: &str) -> LibraryResult<i64>;
}
