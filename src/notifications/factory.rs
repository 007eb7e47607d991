use std::sync::Arc;
use lazy_static::lazy_static;
use crate::copies::factory::create_copy_repository;
use crate::core::domain::{Configuration, SystemClock};
use crate::core::repository::RepositoryStore;
use crate::gateway::factory::create_publisher;
use crate::loans::factory::create_loan_repository;
use crate::members::factory::create_member_service;
use crate::notifications::domain::model::NotificationEntity;
use crate::notifications::domain::NotificationService;
use crate::notifications::domain::service::NotificationServiceImpl;
use crate::notifications::repository::NotificationRepository;
use crate::notifications::repository::ddb_notification_repository::DDBNotificationRepository;
use crate::notifications::repository::mem_notification_repository::MemNotificationRepository;
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::mem::MemTable;

lazy_static! {
    static ref NOTIFICATIONS: Arc<MemTable<NotificationEntity>> = Arc::new(MemTable::new("notifications"));
}

pub(crate) async fn create_notification_repository(store: RepositoryStore) -> Box<dyn NotificationRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBNotificationRepository::new(client, "notifications", "notifications_ndx"))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, "notifications", "notification_id", "loan_id", "created_at").await;
            Box::new(DDBNotificationRepository::new(client, "notifications", "notifications_ndx"))
        }
        RepositoryStore::InMemory => {
            Box::new(MemNotificationRepository::new(NOTIFICATIONS.clone()))
        }
    }
}

pub(crate) async fn create_notification_service(config: &Configuration, store: RepositoryStore) -> Box<dyn NotificationService> {
    let loan_repo = create_loan_repository(store).await;
    let copy_repo = create_copy_repository(store).await;
    let member_svc = create_member_service(config, store).await;
    let notification_repo = create_notification_repository(store).await;
    let publisher = create_publisher(store.gateway_publisher()).await;
    Box::new(NotificationServiceImpl::new(config, Box::new(SystemClock), loan_repo, copy_repo,
                                          member_svc, notification_repo, publisher))
}
