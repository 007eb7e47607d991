use std::collections::HashMap;
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::{debug, info};
use crate::core::events::{DomainEvent, LendingEventType};
use crate::core::library::{LibraryError, LibraryResult};
use crate::gateway::events::EventPublisher;
use crate::utils::ddb::{create_table, string_date, table_exists};

pub(crate) const AUDIT_TABLE: &str = "lending_events";

// DDBAuditPublisher keeps the lending audit trail in a DynamoDB table. Rows are keyed by
// event_id and indexed by (key, created_at) so the history of a loan, return or
// notification reads back in order.
#[derive(Debug)]
pub struct DDBAuditPublisher {
    client: Client,
    table_name: String,
    kinds: Vec<LendingEventType>,
}

impl DDBAuditPublisher {
    pub(crate) fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            kinds: vec![],
        }
    }
}

pub(crate) fn audit_item(event: &DomainEvent) -> HashMap<String, AttributeValue> {
    let metadata = event.metadata.iter()
        .map(|(k, v)| (k.to_string(), AttributeValue::S(v.to_string())))
        .collect::<HashMap<String, AttributeValue>>();
    HashMap::from([
        ("event_id".to_string(), AttributeValue::S(event.event_id.to_string())),
        ("name".to_string(), AttributeValue::S(event.name.to_string())),
        ("group".to_string(), AttributeValue::S(event.group.to_string())),
        ("key".to_string(), AttributeValue::S(event.key.to_string())),
        ("kind".to_string(), AttributeValue::S(event.kind.name().to_string())),
        ("metadata".to_string(), AttributeValue::M(metadata)),
        ("json_data".to_string(), AttributeValue::S(event.json_data.to_string())),
        ("created_at".to_string(), string_date(event.created_at)),
    ])
}

#[async_trait]
impl EventPublisher for DDBAuditPublisher {
    async fn prepare(&mut self, kinds: &[LendingEventType]) -> LibraryResult<()> {
        if table_exists(&self.client, self.table_name.as_str()).await {
            debug!(table = self.table_name.as_str(), "audit table already exists");
        } else {
            create_table(&self.client, self.table_name.as_str(), "event_id", "key", "created_at").await
                .map_err(|err| err.with_context("creating audit table"))?;
            info!(table = self.table_name.as_str(), "created audit table");
        }
        for kind in kinds {
            if !self.kinds.contains(kind) {
                self.kinds.push(*kind);
            }
        }
        Ok(())
    }

    async fn publish(&self, event: &DomainEvent) -> LibraryResult<()> {
        if !self.kinds.contains(&event.kind) {
            return Err(LibraryError::runtime(format!("audit table is not prepared for {}",
                                                     event.kind.name()).as_str(), None));
        }
        self.client
            .put_item()
            .table_name(self.table_name.as_str())
            .condition_expression("attribute_not_exists(event_id)")
            .set_item(Some(audit_item(event)))
            .send()
            .await.map(|_| ()).map_err(LibraryError::from)
    }
}
