use std::sync::Arc;
use lazy_static::lazy_static;
use crate::copies::factory::create_copy_repository;
use crate::core::domain::{Configuration, SystemClock};
use crate::core::repository::RepositoryStore;
use crate::gateway::factory::create_publisher;
use crate::loans::factory::create_loan_repository;
use crate::returns::domain::model::ReturnEntity;
use crate::returns::domain::ReturnService;
use crate::returns::domain::service::ReturnServiceImpl;
use crate::returns::repository::ReturnRepository;
use crate::returns::repository::ddb_return_repository::DDBReturnRepository;
use crate::returns::repository::mem_return_repository::MemReturnRepository;
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::mem::MemTable;

lazy_static! {
    static ref RETURNS: Arc<MemTable<ReturnEntity>> = Arc::new(MemTable::new("returns"));
}

pub(crate) async fn create_return_repository(store: RepositoryStore) -> Box<dyn ReturnRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBReturnRepository::new(client, "returns", "returns_ndx"))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, "returns", "return_id", "loan_id", "returned_on").await;
            Box::new(DDBReturnRepository::new(client, "returns", "returns_ndx"))
        }
        RepositoryStore::InMemory => {
            Box::new(MemReturnRepository::new(RETURNS.clone()))
        }
    }
}

pub(crate) async fn create_return_service(config: &Configuration, store: RepositoryStore) -> Box<dyn ReturnService> {
    let loan_repo = create_loan_repository(store).await;
    let copy_repo = create_copy_repository(store).await;
    let return_repo = create_return_repository(store).await;
    let publisher = create_publisher(store.gateway_publisher()).await;
    Box::new(ReturnServiceImpl::new(config, Box::new(SystemClock), loan_repo, copy_repo,
                                    return_repo, publisher))
}
