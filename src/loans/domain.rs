pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::loans::dto::LoanDto;

#[async_trait]
pub(crate) trait LoanService: Sync + Send {
    // lends the copy with the given code to the member with the given external id
    async fn create_loan(&self, member_external_id: &str, copy_code: &str) -> LibraryResult<LoanDto>;
    async fn find_loan(&self, loan_id: &str) -> LibraryResult<LoanDto>;
    // full loan history of the member, returned loans included
    async fn member_loans(&self, member_external_id: &str) -> LibraryResult<Vec<LoanDto>>;
    async fn query_overdue(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<LoanDto>>;
}
