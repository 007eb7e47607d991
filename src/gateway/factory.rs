use tracing::warn;
use crate::core::events::LendingEventType;
use crate::core::repository::RepositoryStore;
use crate::gateway::ddb::publisher::{DDBAuditPublisher, AUDIT_TABLE};
use crate::gateway::events::EventPublisher;
use crate::gateway::GatewayPublisherVia;
use crate::gateway::logs::publisher::LogPublisher;
use crate::gateway::sns::publisher::SNSPublisher;
use crate::utils::ddb::{build_db_client, build_sns_client};

pub(crate) async fn create_publisher(via: GatewayPublisherVia) -> Box<dyn EventPublisher> {
    let mut publisher: Box<dyn EventPublisher> = match via {
        GatewayPublisherVia::Sns => Box::new(SNSPublisher::new(build_sns_client().await)),
        GatewayPublisherVia::LocalDynamoDB => {
            let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
            Box::new(DDBAuditPublisher::new(client, AUDIT_TABLE))
        }
        GatewayPublisherVia::Log => Box::new(LogPublisher::new()),
    };
    // audit failures never block lending, unprepared kinds are reported on publish
    if let Err(err) = publisher.prepare(&LendingEventType::ALL).await {
        warn!("failed to prepare {:?} publisher: {}", via, err);
    }
    publisher
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::events::DomainEvent;
    use crate::gateway::events::EventPublisher;
    use crate::gateway::factory::create_publisher;
    use crate::gateway::GatewayPublisherVia;

    #[tokio::test]
    async fn test_should_create_log_publisher() {
        let publisher = create_publisher(GatewayPublisherVia::Log).await;
        let event = DomainEvent::loan_created("loan1", &HashMap::new(), &"payload").expect("build event");
        publisher.publish(&event).await.expect("should publish");
    }
}
