use std::collections::HashMap;
use aws_sdk_sns::Client;
use async_trait::async_trait;
use aws_sdk_sns::error::SdkError;
use aws_sdk_sns::operation::create_topic::CreateTopicError;
use aws_sdk_sns::operation::publish::PublishError;
use aws_sdk_sns::types::MessageAttributeValue;
use tracing::info;
use crate::core::events::{DomainEvent, LendingEventType};
use crate::core::library::{LibraryError, LibraryResult};
use crate::gateway::events::EventPublisher;

// SNSPublisher fans lending events out to one topic per LendingEventType. Subscribers
// filter on the group, key and metadata message attributes.
#[derive(Debug)]
pub struct SNSPublisher {
    client: Client,
    topics: HashMap<LendingEventType, String>,
}

impl SNSPublisher {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            topics: HashMap::new(),
        }
    }
}

pub(crate) fn topic_name(kind: LendingEventType) -> String {
    format!("lending-{}", kind.name().replace('_', "-"))
}

pub(crate) fn message_attributes(event: &DomainEvent) -> HashMap<String, MessageAttributeValue> {
    let string_attr = |value: &str| MessageAttributeValue::builder()
        .data_type("String")
        .string_value(value)
        .build();
    let mut attrs = event.metadata.iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.to_string(), string_attr(v)))
        .collect::<HashMap<String, MessageAttributeValue>>();
    // event fields win over metadata entries of the same name
    attrs.insert("group".to_string(), string_attr(event.group.as_str()));
    attrs.insert("key".to_string(), string_attr(event.key.as_str()));
    attrs.insert("kind".to_string(), string_attr(event.kind.name()));
    attrs
}

#[async_trait]
impl EventPublisher for SNSPublisher {
    async fn prepare(&mut self, kinds: &[LendingEventType]) -> LibraryResult<()> {
        for kind in kinds {
            let name = topic_name(*kind);
            let resp = self.client.create_topic().name(name.as_str()).send().await?;
            let arn = resp.topic_arn().unwrap_or_default();
            info!(topic = name.as_str(), arn, "created lending topic");
            self.topics.insert(*kind, arn.to_string());
        }
        Ok(())
    }

    async fn publish(&self, event: &DomainEvent) -> LibraryResult<()> {
        let arn = self.topics.get(&event.kind).ok_or_else(|| LibraryError::runtime(
            format!("no topic prepared for {}", topic_name(event.kind)).as_str(), None))?;
        let json = serde_json::to_string(event)?;
        self.client.publish()
            .topic_arn(arn)
            .subject(format!("{} {}", event.name, event.key))
            .set_message_attributes(Some(message_attributes(event)))
            .message(json)
            .send().await?;
        Ok(())
    }
}

impl From<SdkError<CreateTopicError>> for LibraryError {
    fn from(err: SdkError<CreateTopicError>) -> Self {
        LibraryError::unavailable(format!("failed to create lending topic {:?}", err).as_str(), None, true)
    }
}

impl From<SdkError<PublishError>> for LibraryError {
    fn from(err: SdkError<PublishError>) -> Self {
        LibraryError::unavailable(format!("failed to publish lending event {:?}", err).as_str(), None, true)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::events::{DomainEvent, LendingEventType};
    use crate::gateway::{factory, GatewayPublisherVia};
    use crate::gateway::sns::publisher::{message_attributes, topic_name};

    #[tokio::test]
    async fn test_should_name_topic_per_event_kind() {
        assert_eq!("lending-loan-created", topic_name(LendingEventType::LoanCreated).as_str());
        assert_eq!("lending-notification-sent", topic_name(LendingEventType::NotificationSent).as_str());
        let names = LendingEventType::ALL.iter().map(|k| topic_name(*k)).collect::<Vec<String>>();
        assert_eq!(4, names.len());
        assert!(names.iter().all(|n| n.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')));
    }

    #[tokio::test]
    async fn test_should_build_filter_attributes() {
        let metadata = HashMap::from([
            ("member_id".to_string(), "m1".to_string()),
            ("key".to_string(), "shadowed".to_string()),
            ("note".to_string(), "".to_string()),
        ]);
        let event = DomainEvent::loan_created("loan1", &metadata, &"payload").expect("build event");
        let attrs = message_attributes(&event);
        assert_eq!(Some("loans"), attrs.get("group").and_then(|a| a.string_value()));
        assert_eq!(Some("loan1"), attrs.get("key").and_then(|a| a.string_value()));
        assert_eq!(Some("loan_created"), attrs.get("kind").and_then(|a| a.string_value()));
        assert_eq!(Some("m1"), attrs.get("member_id").and_then(|a| a.string_value()));
        assert_eq!(Some("String"), attrs.get("member_id").and_then(|a| a.data_type()));
        assert!(!attrs.contains_key("note"));
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials and SNS access"]
    async fn test_should_publish_to_sns() {
        let event = DomainEvent::loan_created("loan1", &HashMap::from([("member_id".to_string(), "m1".to_string())]), &"payload").expect("build event");
        let publisher = factory::create_publisher(GatewayPublisherVia::Sns).await;
        publisher.publish(&event).await.expect("should publish");
    }
}
