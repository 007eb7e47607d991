use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::members::domain::model::MemberEntity;
use crate::members::repository::MemberRepository;
use crate::utils::mem::MemTable;

#[derive(Debug, Clone)]
pub(crate) struct MemMemberRepository {
    table: Arc<MemTable<MemberEntity>>,
}

impl MemMemberRepository {
    pub(crate) fn new(table: Arc<MemTable<MemberEntity>>) -> Self {
        Self {
            table,
        }
    }
}

#[async_trait]
impl Repository<MemberEntity> for MemMemberRepository {
    async fn create(&self, entity: &MemberEntity) -> LibraryResult<usize> {
        if !self.table.find(|m| m.external_id == entity.external_id)?.is_empty() {
            return Err(LibraryError::conflict(format!("member {} already registered", entity.external_id).as_str()));
        }
        self.table.create(entity)
    }

    async fn update(&self, entity: &MemberEntity) -> LibraryResult<usize> {
        self.table.update(entity)
    }

    async fn get(&self, id: &str) -> LibraryResult<MemberEntity> {
        self.table.get(id)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.table.delete(id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<MemberEntity>> {
        self.table.query(predicate, page, page_size)
    }
}

#[async_trait]
impl MemberRepository for MemMemberRepository {
    async fn find_by_external_id(&self, external_id: &str) -> LibraryResult<MemberEntity> {
        self.table.find(|m| m.external_id == external_id)?.into_iter().next().ok_or_else(||
            LibraryError::not_found(format!("member not found for {}", external_id).as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::core::library::LibraryError;
    use crate::core::repository::Repository;
    use crate::members::domain::model::MemberEntity;
    use crate::members::repository::mem_member_repository::MemMemberRepository;
    use crate::members::repository::MemberRepository;
    use crate::utils::mem::MemTable;

    #[tokio::test]
    async fn test_should_create_find_member() {
        let member_repo = MemMemberRepository::new(Arc::new(MemTable::new("members")));
        let member = MemberEntity::new("30111222", "Standard");
        member_repo.create(&member).await.expect("should create member");
        let loaded = member_repo.find_by_external_id("30111222").await.expect("should find member");
        assert_eq!(member.member_id, loaded.member_id);
        let res = member_repo.create(&MemberEntity::new("30111222", "Faculty")).await;
        assert!(matches!(res, Err(LibraryError::Conflict{ .. })));
    }
}
