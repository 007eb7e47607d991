use std::sync::Arc;
use lazy_static::lazy_static;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::policies::domain::model::PolicyEntity;
use crate::policies::domain::PolicyService;
use crate::policies::domain::service::PolicyServiceImpl;
use crate::policies::repository::PolicyRepository;
use crate::policies::repository::ddb_policy_repository::DDBPolicyRepository;
use crate::policies::repository::mem_policy_repository::MemPolicyRepository;
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::mem::MemTable;

lazy_static! {
    static ref POLICIES: Arc<MemTable<PolicyEntity>> = Arc::new(MemTable::new("policies"));
}

pub(crate) async fn create_policy_repository(store: RepositoryStore) -> Box<dyn PolicyRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBPolicyRepository::new(client, "policies", "policies_ndx"))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, "policies", "policy_id", "category", "updated_at").await;
            Box::new(DDBPolicyRepository::new(client, "policies", "policies_ndx"))
        }
        RepositoryStore::InMemory => {
            Box::new(MemPolicyRepository::new(POLICIES.clone()))
        }
    }
}

pub(crate) async fn create_policy_service(config: &Configuration, store: RepositoryStore) -> Box<dyn PolicyService> {
    let policy_repo = create_policy_repository(store).await;
    Box::new(PolicyServiceImpl::new(config, policy_repo))
}
