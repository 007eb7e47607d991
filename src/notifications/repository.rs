pub mod ddb_notification_repository;
pub mod mem_notification_repository;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::notifications::domain::model::NotificationEntity;

#[async_trait]
pub(crate) trait NotificationRepository: Repository<NotificationEntity> {
    async fn find_by_loan(&self, loan_id: &str) -> LibraryResult<Vec<NotificationEntity>>;

    async fn find_unsent(&self) -> LibraryResult<Vec<NotificationEntity>>;
}
