pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::returns::dto::ReturnDto;

#[async_trait]
pub(crate) trait ReturnService: Sync + Send {
    // settles the loan, a blank or missing condition records the copy as Available
    async fn register_return(&self, loan_id: &str, condition: Option<&str>, notes: Option<&str>) -> LibraryResult<ReturnDto>;
    async fn correct_return(&self, return_id: &str, condition: Option<&str>, notes: Option<&str>) -> LibraryResult<ReturnDto>;
    async fn find_return_for_loan(&self, loan_id: &str) -> LibraryResult<ReturnDto>;
}
