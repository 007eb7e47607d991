use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::notifications::domain::NotificationService;
use crate::notifications::dto::NotificationDto;

pub(crate) struct DeriveNotificationsCommand {
    notification_service: Box<dyn NotificationService>,
}

impl DeriveNotificationsCommand {
    pub(crate) fn new(notification_service: Box<dyn NotificationService>) -> Self {
        Self {
            notification_service,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeriveNotificationsCommandRequest {}

#[derive(Debug, Serialize)]
pub(crate) struct DeriveNotificationsCommandResponse {
    pub notifications: Vec<NotificationDto>,
}

impl DeriveNotificationsCommandResponse {
    pub fn new(notifications: Vec<NotificationDto>) -> Self {
        Self {
            notifications,
        }
    }
}

#[async_trait]
impl Command<DeriveNotificationsCommandRequest, DeriveNotificationsCommandResponse> for DeriveNotificationsCommand {
    async fn execute(&self, _req: DeriveNotificationsCommandRequest) -> Result<DeriveNotificationsCommandResponse, CommandError> {
        self.notification_service.derive_notifications()
            .await.map_err(CommandError::from).map(DeriveNotificationsCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;
    use crate::notifications::command::derive_notifications_cmd::{DeriveNotificationsCommand, DeriveNotificationsCommandRequest};
    use crate::notifications::factory::create_notification_service;

    #[tokio::test]
    async fn test_should_run_sweep() {
        let svc = create_notification_service(&Configuration::new("test"), RepositoryStore::InMemory).await;
        let cmd = DeriveNotificationsCommand::new(svc);
        cmd.execute(DeriveNotificationsCommandRequest::default()).await.expect("should sweep");
        let res = cmd.execute(DeriveNotificationsCommandRequest::default()).await.expect("should sweep");
        assert!(res.notifications.is_empty());
    }
}
