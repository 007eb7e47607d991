use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::notifications::domain::NotificationService;
use crate::notifications::dto::NotificationDto;

pub(crate) struct DispatchNotificationsCommand {
    notification_service: Box<dyn NotificationService>,
}

impl DispatchNotificationsCommand {
    pub(crate) fn new(notification_service: Box<dyn NotificationService>) -> Self {
        Self {
            notification_service,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DispatchNotificationsCommandRequest {}

#[derive(Debug, Serialize)]
pub(crate) struct DispatchNotificationsCommandResponse {
    pub dispatched: Vec<NotificationDto>,
}

impl DispatchNotificationsCommandResponse {
    pub fn new(dispatched: Vec<NotificationDto>) -> Self {
        Self {
            dispatched,
        }
    }
}

#[async_trait]
impl Command<DispatchNotificationsCommandRequest, DispatchNotificationsCommandResponse> for DispatchNotificationsCommand {
    async fn execute(&self, _req: DispatchNotificationsCommandRequest) -> Result<DispatchNotificationsCommandResponse, CommandError> {
        self.notification_service.dispatch_pending()
            .await.map_err(CommandError::from).map(DispatchNotificationsCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;
    use crate::notifications::command::dispatch_notifications_cmd::{DispatchNotificationsCommand, DispatchNotificationsCommandRequest};
    use crate::notifications::factory::create_notification_service;

    #[tokio::test]
    async fn test_should_run_dispatch() {
        let config = Configuration::new("test");
        let cmd = DispatchNotificationsCommand::new(create_notification_service(&config, RepositoryStore::InMemory).await);
        let res = cmd.execute(DispatchNotificationsCommandRequest::default()).await.expect("should dispatch");
        assert!(res.dispatched.iter().all(|n| n.sent));
    }
}
