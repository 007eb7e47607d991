use std::collections::HashMap;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::utils::date::{serializer};

// LendingEventType names the audit events published to the history collaborator
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum LendingEventType {
    LoanCreated,
    LoanReturned,
    ReturnCorrected,
    NotificationSent,
}

impl LendingEventType {
    pub const ALL: [LendingEventType; 4] = [LendingEventType::LoanCreated, LendingEventType::LoanReturned,
        LendingEventType::ReturnCorrected, LendingEventType::NotificationSent];

    pub fn name(&self) -> &'static str {
        match self {
            LendingEventType::LoanCreated => "loan_created",
            LendingEventType::LoanReturned => "loan_returned",
            LendingEventType::ReturnCorrected => "return_corrected",
            LendingEventType::NotificationSent => "notification_sent",
        }
    }
}

// DomainEvent abstracts an audit record for lending changes
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct DomainEvent {
    pub event_id: String,
    pub name: String,
    pub group: String,
    pub key: String,
    pub kind: LendingEventType,
    pub metadata: HashMap<String, String>,
    pub json_data: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
}

impl DomainEvent {
    pub fn loan_created<T: Serialize>(key: &str, metadata: &HashMap<String, String>, data: &T) -> serde_json::Result<Self> {
        Self::build(LendingEventType::LoanCreated, "loans", key, metadata, data)
    }

    pub fn loan_returned<T: Serialize>(key: &str, metadata: &HashMap<String, String>, data: &T) -> serde_json::Result<Self> {
        Self::build(LendingEventType::LoanReturned, "returns", key, metadata, data)
    }

    pub fn return_corrected<T: Serialize>(key: &str, metadata: &HashMap<String, String>, data: &T) -> serde_json::Result<Self> {
        Self::build(LendingEventType::ReturnCorrected, "returns", key, metadata, data)
    }

    pub fn notification_sent<T: Serialize>(key: &str, metadata: &HashMap<String, String>, data: &T) -> serde_json::Result<Self> {
        Self::build(LendingEventType::NotificationSent, "notifications", key, metadata, data)
    }

    fn build<T: Serialize>(kind: LendingEventType, group: &str, key: &str,
                           metadata: &HashMap<String, String>, data: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_string(&data)?;
        Ok(DomainEvent {
            event_id: Uuid::new_v4().to_string(),
            name: kind.name().to_string(),
            group: group.to_string(),
            key: key.to_string(),
            kind,
            metadata: metadata.clone(),
            json_data: json,
            created_at: Utc::now().naive_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::events::{DomainEvent, LendingEventType};

    #[tokio::test]
    async fn test_should_build_loan_created() {
        let data = HashMap::from([("copy_code", "C-1")]);
        let event = DomainEvent::loan_created("loan1", &HashMap::from([("member_id".to_string(), "m1".to_string())]), &data).expect("build event");
        assert_eq!("loan_created", event.name.as_str());
        assert_eq!("loans", event.group.as_str());
        assert_eq!("loan1", event.key.as_str());
        assert_eq!(LendingEventType::LoanCreated, event.kind);
        assert!(event.json_data.contains("C-1"));
    }

    #[tokio::test]
    async fn test_should_build_loan_returned() {
        let event = DomainEvent::loan_returned("loan1", &HashMap::new(), &"payload").expect("build event");
        assert_eq!("loan_returned", event.name.as_str());
        assert_eq!(LendingEventType::LoanReturned, event.kind);
    }

    #[tokio::test]
    async fn test_should_round_trip_event_json() {
        let event = DomainEvent::notification_sent("n1", &HashMap::new(), &"payload").expect("build event");
        let json = serde_json::to_string(&event).expect("should serialize");
        let parsed: DomainEvent = serde_json::from_str(json.as_str()).expect("should parse");
        assert_eq!(event, parsed);
    }
}
