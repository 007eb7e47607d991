pub mod ddb_member_repository;
pub mod mem_member_repository;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::members::domain::model::MemberEntity;

#[async_trait]
pub(crate) trait MemberRepository: Repository<MemberEntity> {
    async fn find_by_external_id(&self, external_id: &str) -> LibraryResult<MemberEntity>;
}
