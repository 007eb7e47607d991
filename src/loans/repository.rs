pub mod ddb_loan_repository;
pub mod mem_loan_repository;

use std::collections::HashMap;
use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::loans::domain::model::LoanEntity;

#[async_trait]
pub(crate) trait LoanRepository: Repository<LoanEntity> {
    async fn find_by_member(&self, member_id: &str) -> LibraryResult<Vec<LoanEntity>>;

    async fn find_active_by_member(&self, member_id: &str) -> LibraryResult<Vec<LoanEntity>> {
        let loans = self.find_by_member(member_id).await?;
        Ok(loans.into_iter().filter(|l| !l.returned).collect())
    }

    async fn find_by_copy(&self, copy_id: &str) -> LibraryResult<Vec<LoanEntity>> {
        let predicate = HashMap::from([("copy_id".to_string(), copy_id.to_string())]);
        let mut loans = vec![];
        let mut next_page: Option<String> = None;
        loop {
            let res = self.query(&predicate, next_page.as_deref(), 500).await?;
            loans.extend(res.records);
            next_page = res.next_page;
            if next_page.is_none() {
                break;
            }
        }
        Ok(loans)
    }

    async fn list_all(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<LoanEntity>> {
        self.query(&HashMap::new(), page, page_size).await
    }
}
