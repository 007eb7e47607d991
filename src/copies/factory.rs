use std::sync::Arc;
use lazy_static::lazy_static;
use crate::copies::domain::model::CopyEntity;
use crate::copies::repository::CopyRepository;
use crate::copies::repository::ddb_copy_repository::DDBCopyRepository;
use crate::copies::repository::mem_copy_repository::MemCopyRepository;
use crate::core::repository::RepositoryStore;
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::mem::MemTable;

lazy_static! {
    static ref COPIES: Arc<MemTable<CopyEntity>> = Arc::new(MemTable::new("copies"));
}

pub(crate) async fn create_copy_repository(store: RepositoryStore) -> Box<dyn CopyRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBCopyRepository::new(client, "copies", "copies_ndx"))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, "copies", "copy_id", "code", "copy_state").await;
            Box::new(DDBCopyRepository::new(client, "copies", "copies_ndx"))
        }
        RepositoryStore::InMemory => {
            Box::new(MemCopyRepository::new(COPIES.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::copies::domain::model::CopyEntity;
    use crate::copies::factory::create_copy_repository;
    use crate::copies::repository::CopyRepository;
    use crate::core::repository::{Repository, RepositoryStore};

    #[tokio::test]
    async fn test_should_share_in_memory_copies() {
        let copy = CopyEntity::new("F-100", "book1", "Shelf A");
        create_copy_repository(RepositoryStore::InMemory).await.create(&copy).await.expect("should create copy");
        let loaded = create_copy_repository(RepositoryStore::InMemory).await
            .find_by_code("F-100").await.expect("should find copy");
        assert_eq!(copy.copy_id, loaded.copy_id);
    }
}
