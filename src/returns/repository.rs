pub mod ddb_return_repository;
pub mod mem_return_repository;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::returns::domain::model::ReturnEntity;

#[async_trait]
pub(crate) trait ReturnRepository: Repository<ReturnEntity> {
    // a loan is settled by at most one return
    async fn find_by_loan(&self, loan_id: &str) -> LibraryResult<Option<ReturnEntity>>;
}
