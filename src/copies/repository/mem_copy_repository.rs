use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use crate::copies::domain::model::CopyEntity;
use crate::copies::repository::CopyRepository;
use crate::core::library::{CopyState, LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::mem::MemTable;

#[derive(Debug, Clone)]
pub(crate) struct MemCopyRepository {
    table: Arc<MemTable<CopyEntity>>,
}

impl MemCopyRepository {
    pub(crate) fn new(table: Arc<MemTable<CopyEntity>>) -> Self {
        Self {
            table,
        }
    }
}

#[async_trait]
impl Repository<CopyEntity> for MemCopyRepository {
    async fn create(&self, entity: &CopyEntity) -> LibraryResult<usize> {
        if !self.table.find(|c| c.code == entity.code)?.is_empty() {
            return Err(LibraryError::conflict(format!("copy code {} already registered", entity.code).as_str()));
        }
        self.table.create(entity)
    }

    async fn update(&self, entity: &CopyEntity) -> LibraryResult<usize> {
        self.table.update(entity)
    }

    async fn get(&self, id: &str) -> LibraryResult<CopyEntity> {
        self.table.get(id)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.table.delete(id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CopyEntity>> {
        self.table.query(predicate, page, page_size)
    }
}

#[async_trait]
impl CopyRepository for MemCopyRepository {
    async fn find_by_code(&self, code: &str) -> LibraryResult<CopyEntity> {
        self.table.find(|c| c.code == code)?.into_iter().next().ok_or_else(||
            LibraryError::not_found(format!("copy not found for code {}", code).as_str()))
    }

    async fn compare_and_set_state(&self, copy_id: &str, expected: CopyState,
                                   new_state: CopyState) -> LibraryResult<bool> {
        let swapped = self.table.modify(copy_id, |copy| {
            if copy.copy_state != expected {
                return Ok(false);
            }
            copy.copy_state = new_state;
            copy.updated_at = Utc::now().naive_utc();
            Ok(true)
        });
        match swapped {
            Err(err) if err.is_not_found() => Ok(false),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::copies::domain::model::CopyEntity;
    use crate::copies::repository::CopyRepository;
    use crate::copies::repository::mem_copy_repository::MemCopyRepository;
    use crate::core::library::{CopyState, LibraryError};
    use crate::core::repository::Repository;
    use crate::utils::mem::MemTable;

    fn repo() -> MemCopyRepository {
        MemCopyRepository::new(Arc::new(MemTable::new("copies")))
    }

    #[tokio::test]
    async fn test_should_create_find_by_code() {
        let copy_repo = repo();
        let copy = CopyEntity::new("C-100", "book1", "Shelf A");
        copy_repo.create(&copy).await.expect("should create copy");
        let loaded = copy_repo.find_by_code("C-100").await.expect("should find copy");
        assert_eq!(copy.copy_id, loaded.copy_id);
        assert!(matches!(copy_repo.find_by_code("C-404").await, Err(LibraryError::NotFound{ .. })));
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_code() {
        let copy_repo = repo();
        copy_repo.create(&CopyEntity::new("C-100", "book1", "Shelf A")).await.expect("should create copy");
        let res = copy_repo.create(&CopyEntity::new("C-100", "book2", "Shelf B")).await;
        assert!(matches!(res, Err(LibraryError::Conflict{ .. })));
    }

    #[tokio::test]
    async fn test_should_compare_and_set_state_once() {
        let copy_repo = repo();
        let copy = CopyEntity::new("C-100", "book1", "Shelf A");
        copy_repo.create(&copy).await.expect("should create copy");
        assert!(copy_repo.compare_and_set_state(copy.copy_id.as_str(), CopyState::Available, CopyState::Loaned).await.expect("cas"));
        assert!(!copy_repo.compare_and_set_state(copy.copy_id.as_str(), CopyState::Available, CopyState::Loaned).await.expect("cas"));
        let loaded = copy_repo.get(copy.copy_id.as_str()).await.expect("should get copy");
        assert_eq!(CopyState::Loaned, loaded.copy_state);
        assert_eq!(1, loaded.version);
        assert!(!copy_repo.compare_and_set_state("missing", CopyState::Available, CopyState::Loaned).await.expect("cas"));
    }
}
