use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::loans::domain::model::LoanEntity;
use crate::loans::repository::LoanRepository;
use crate::utils::mem::MemTable;

#[derive(Debug, Clone)]
pub(crate) struct MemLoanRepository {
    table: Arc<MemTable<LoanEntity>>,
}

impl MemLoanRepository {
    pub(crate) fn new(table: Arc<MemTable<LoanEntity>>) -> Self {
        Self {
            table,
        }
    }
}

#[async_trait]
impl Repository<LoanEntity> for MemLoanRepository {
    async fn create(&self, entity: &LoanEntity) -> LibraryResult<usize> {
        self.table.create(entity)
    }

    async fn update(&self, entity: &LoanEntity) -> LibraryResult<usize> {
        self.table.update(entity)
    }

    async fn get(&self, id: &str) -> LibraryResult<LoanEntity> {
        self.table.get(id)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.table.delete(id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<LoanEntity>> {
        self.table.query(predicate, page, page_size)
    }
}

#[async_trait]
impl LoanRepository for MemLoanRepository {
    async fn find_by_member(&self, member_id: &str) -> LibraryResult<Vec<LoanEntity>> {
        let mut loans = self.table.find(|l| l.member_id == member_id)?;
        loans.sort_by(|a, b| a.loan_date.cmp(&b.loan_date).then(a.created_at.cmp(&b.created_at)));
        Ok(loans)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use chrono::NaiveDate;
    use crate::core::repository::Repository;
    use crate::loans::repository::LoanRepository;
    use crate::utils::fixtures::Fixture;

    #[tokio::test]
    async fn test_should_find_loans_by_member() {
        let fixture = Fixture::on(2024, 1, 1);
        let loan_repo = fixture.loan_repository();
        let mut returned = fixture.loan_for("m1", "C-1");
        returned.returned = true;
        loan_repo.create(&returned).await.expect("should create loan");
        loan_repo.create(&fixture.loan_for("m1", "C-2")).await.expect("should create loan");
        loan_repo.create(&fixture.loan_for("m2", "C-3")).await.expect("should create loan");

        assert_eq!(2, loan_repo.find_by_member("m1").await.expect("should find loans").len());
        let active = loan_repo.find_active_by_member("m1").await.expect("should find loans");
        assert_eq!(1, active.len());
        assert_eq!("C-2", active[0].copy_code.as_str());
        assert_eq!(3, loan_repo.list_all(None, 10).await.expect("should list loans").records.len());
    }

    #[tokio::test]
    async fn test_should_query_by_due_date() {
        let fixture = Fixture::on(2024, 1, 1);
        let loan_repo = fixture.loan_repository();
        loan_repo.create(&fixture.loan_for("m1", "C-1")).await.expect("should create loan");
        let predicate = HashMap::from([
            ("returned".to_string(), "false".to_string()),
            ("due_date:<".to_string(), NaiveDate::from_ymd_opt(2024, 1, 16).unwrap().to_string()),
        ]);
        assert_eq!(1, loan_repo.query(&predicate, None, 10).await.expect("should query").records.len());
        let predicate = HashMap::from([
            ("due_date:<".to_string(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().to_string()),
        ]);
        assert_eq!(0, loan_repo.query(&predicate, None, 10).await.expect("should query").records.len());
    }
}
