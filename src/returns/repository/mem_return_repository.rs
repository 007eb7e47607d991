use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::returns::domain::model::ReturnEntity;
use crate::returns::repository::ReturnRepository;
use crate::utils::mem::MemTable;

#[derive(Debug, Clone)]
pub(crate) struct MemReturnRepository {
    table: Arc<MemTable<ReturnEntity>>,
}

impl MemReturnRepository {
    pub(crate) fn new(table: Arc<MemTable<ReturnEntity>>) -> Self {
        Self {
            table,
        }
    }
}

#[async_trait]
impl Repository<ReturnEntity> for MemReturnRepository {
    async fn create(&self, entity: &ReturnEntity) -> LibraryResult<usize> {
        if !self.table.find(|r| r.loan_id == entity.loan_id)?.is_empty() {
            return Err(LibraryError::conflict(format!("loan {} already has a return", entity.loan_id).as_str()));
        }
        self.table.create(entity)
    }

    async fn update(&self, entity: &ReturnEntity) -> LibraryResult<usize> {
        self.table.update(entity)
    }

    async fn get(&self, id: &str) -> LibraryResult<ReturnEntity> {
        self.table.get(id)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.table.delete(id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReturnEntity>> {
        self.table.query(predicate, page, page_size)
    }
}

#[async_trait]
impl ReturnRepository for MemReturnRepository {
    async fn find_by_loan(&self, loan_id: &str) -> LibraryResult<Option<ReturnEntity>> {
        Ok(self.table.find(|r| r.loan_id == loan_id)?.into_iter().next())
    }
}
