use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::policies::domain::model::PolicyEntity;
use crate::policies::repository::PolicyRepository;
use crate::utils::mem::MemTable;

#[derive(Debug, Clone)]
pub(crate) struct MemPolicyRepository {
    table: Arc<MemTable<PolicyEntity>>,
}

impl MemPolicyRepository {
    pub(crate) fn new(table: Arc<MemTable<PolicyEntity>>) -> Self {
        Self {
            table,
        }
    }
}

#[async_trait]
impl Repository<PolicyEntity> for MemPolicyRepository {
    async fn create(&self, entity: &PolicyEntity) -> LibraryResult<usize> {
        if !self.table.find(|p| p.category == entity.category)?.is_empty() {
            return Err(LibraryError::conflict(format!("policy for category {} already exists", entity.category).as_str()));
        }
        self.table.create(entity)
    }

    async fn update(&self, entity: &PolicyEntity) -> LibraryResult<usize> {
        self.table.update(entity)
    }

    async fn get(&self, id: &str) -> LibraryResult<PolicyEntity> {
        self.table.get(id)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.table.delete(id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PolicyEntity>> {
        self.table.query(predicate, page, page_size)
    }
}

#[async_trait]
impl PolicyRepository for MemPolicyRepository {
    async fn find_by_category(&self, category: &str) -> LibraryResult<Option<PolicyEntity>> {
        Ok(self.table.find(|p| p.category == category)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use rust_decimal_macros::dec;
    use crate::core::library::LibraryError;
    use crate::core::repository::Repository;
    use crate::policies::domain::model::PolicyEntity;
    use crate::policies::repository::mem_policy_repository::MemPolicyRepository;
    use crate::policies::repository::PolicyRepository;
    use crate::utils::mem::MemTable;

    #[tokio::test]
    async fn test_should_find_policy_by_category() {
        let policy_repo = MemPolicyRepository::new(Arc::new(MemTable::new("policies")));
        let policy = PolicyEntity::new("Faculty", 21, 5, dec!(30));
        policy_repo.create(&policy).await.expect("should create policy");
        let loaded = policy_repo.find_by_category("Faculty").await.expect("should query").expect("should find policy");
        assert_eq!(policy.policy_id, loaded.policy_id);
        assert_eq!(None, policy_repo.find_by_category("Child").await.expect("should query"));
    }

    #[tokio::test]
    async fn test_should_reject_second_policy_for_category() {
        let policy_repo = MemPolicyRepository::new(Arc::new(MemTable::new("policies")));
        policy_repo.create(&PolicyEntity::new("Faculty", 21, 5, dec!(30))).await.expect("should create policy");
        let res = policy_repo.create(&PolicyEntity::new("Faculty", 7, 1, dec!(10))).await;
        assert!(matches!(res, Err(LibraryError::Conflict{ .. })));
    }
}
