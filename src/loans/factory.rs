use std::sync::Arc;
use lazy_static::lazy_static;
use crate::copies::factory::create_copy_repository;
use crate::core::domain::{Configuration, SystemClock};
use crate::core::repository::RepositoryStore;
use crate::gateway::factory::create_publisher;
use crate::loans::domain::LoanService;
use crate::loans::domain::model::LoanEntity;
use crate::loans::domain::service::LoanServiceImpl;
use crate::loans::repository::LoanRepository;
use crate::loans::repository::ddb_loan_repository::DDBLoanRepository;
use crate::loans::repository::mem_loan_repository::MemLoanRepository;
use crate::members::factory::create_member_service;
use crate::policies::factory::create_policy_service;
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::mem::MemTable;

lazy_static! {
    static ref LOANS: Arc<MemTable<LoanEntity>> = Arc::new(MemTable::new("loans"));
}

pub(crate) async fn create_loan_repository(store: RepositoryStore) -> Box<dyn LoanRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBLoanRepository::new(client, "loans", "loans_ndx"))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, "loans", "loan_id", "member_id", "loan_date").await;
            Box::new(DDBLoanRepository::new(client, "loans", "loans_ndx"))
        }
        RepositoryStore::InMemory => {
            Box::new(MemLoanRepository::new(LOANS.clone()))
        }
    }
}

pub(crate) async fn create_loan_service(config: &Configuration, store: RepositoryStore) -> Box<dyn LoanService> {
    let loan_repo = create_loan_repository(store).await;
    let copy_repo = create_copy_repository(store).await;
    let member_svc = create_member_service(config, store).await;
    let policy_svc = create_policy_service(config, store).await;
    let publisher = create_publisher(store.gateway_publisher()).await;
    Box::new(LoanServiceImpl::new(config, Box::new(SystemClock), loan_repo, copy_repo,
                                  member_svc, policy_svc, publisher))
}
