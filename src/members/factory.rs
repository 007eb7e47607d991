use std::sync::Arc;
use lazy_static::lazy_static;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::loans::factory::create_loan_repository;
use crate::members::domain::MemberService;
use crate::members::domain::model::MemberEntity;
use crate::members::domain::service::MemberServiceImpl;
use crate::members::repository::MemberRepository;
use crate::members::repository::ddb_member_repository::DDBMemberRepository;
use crate::members::repository::mem_member_repository::MemMemberRepository;
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::mem::MemTable;

lazy_static! {
    static ref MEMBERS: Arc<MemTable<MemberEntity>> = Arc::new(MemTable::new("members"));
}

pub(crate) async fn create_member_repository(store: RepositoryStore) -> Box<dyn MemberRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBMemberRepository::new(client, "members", "members_ndx"))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, "members", "member_id", "external_id", "category").await;
            Box::new(DDBMemberRepository::new(client, "members", "members_ndx"))
        }
        RepositoryStore::InMemory => {
            Box::new(MemMemberRepository::new(MEMBERS.clone()))
        }
    }
}

pub(crate) async fn create_member_service(config: &Configuration, store: RepositoryStore) -> Box<dyn MemberService> {
    let member_repo = create_member_repository(store).await;
    let loan_repo = create_loan_repository(store).await;
    Box::new(MemberServiceImpl::new(config, member_repo, loan_repo))
}
