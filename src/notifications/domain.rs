pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::notifications::dto::NotificationDto;

#[async_trait]
pub(crate) trait NotificationService: Sync + Send {
    // sweeps every loan and returns the notifications created by this sweep
    async fn derive_notifications(&self) -> LibraryResult<Vec<NotificationDto>>;
    // delivers the unsent notifications and returns the ones that went out
    async fn dispatch_pending(&self) -> LibraryResult<Vec<NotificationDto>>;
    async fn mark_read(&self, notification_id: &str) -> LibraryResult<NotificationDto>;
}
