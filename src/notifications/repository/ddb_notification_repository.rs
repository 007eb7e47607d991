use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult, NotificationKind, PaginatedResult};
use crate::core::repository::Repository;
use crate::notifications::domain::model::NotificationEntity;
use crate::notifications::repository::NotificationRepository;
use crate::utils::ddb::{add_filter_expr, from_ddb, is_put_condition_failed, is_update_condition_failed, parse_bool_attribute, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, string_date, to_ddb_page};

#[derive(Debug)]
pub(crate) struct DDBNotificationRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBNotificationRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }

    async fn find_all(&self, predicate: &HashMap<String, String>) -> LibraryResult<Vec<NotificationEntity>> {
        let mut notifications = vec![];
        let mut next_page: Option<String> = None;
        loop {
            let res = self.query(predicate, next_page.as_deref(), 500).await?;
            notifications.extend(res.records);
            next_page = res.next_page;
            if next_page.is_none() {
                break;
            }
        }
        Ok(notifications)
    }
}

// the delivery flags are stored as dynamodb bools
fn predicate_value(key: &str, value: &str) -> AttributeValue {
    if key == "sent" {
        AttributeValue::Bool(value == "true")
    } else {
        AttributeValue::S(value.to_string())
    }
}

#[async_trait]
impl Repository<NotificationEntity> for DDBNotificationRepository {
    async fn create(&self, entity: &NotificationEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(notification_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(|err| {
            if is_put_condition_failed(&err) {
                LibraryError::conflict(format!("notification {} already exists", entity.notification_id).as_str())
            } else {
                LibraryError::from(err)
            }
        })
    }

    // only the delivery flags change once a notification is derived
    async fn update(&self, entity: &NotificationEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("notification_id", AttributeValue::S(entity.notification_id.clone()))
            .update_expression("SET version = :version, sent = :sent, #read = :read, updated_at = :updated_at")
            .expression_attribute_names("#read", "read")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":sent", AttributeValue::Bool(entity.sent))
            .expression_attribute_values(":read", AttributeValue::Bool(entity.read))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(|err| {
            if is_update_condition_failed(&err) {
                LibraryError::conflict(format!("stale version {} for notification {}", entity.version, entity.notification_id).as_str())
            } else {
                LibraryError::from(err)
            }
        })
    }

    async fn get(&self, id: &str) -> LibraryResult<NotificationEntity> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .query()
            .table_name(table_name)
            .limit(2)
            .consistent_read(true)
            .key_condition_expression(
                "notification_id = :notification_id",
            )
            .expression_attribute_values(
                ":notification_id",
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await.map_err(LibraryError::from).and_then(|req| {
            if let Some(items) = req.items {
                if items.len() > 1 {
                    return Err(LibraryError::database(format!("too many notifications for {}", id).as_str(), None, false));
                } else if let Some(map) = items.first() {
                    return Ok(NotificationEntity::from(map));
                }
            }
            Err(LibraryError::not_found(format!("notification not found for {}", id).as_str()))
        })
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("notification_id", AttributeValue::S(id.to_string()))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    // queries the loan index when the predicate names a loan, otherwise scans the table
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<NotificationEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        let exclusive_start_key = to_ddb_page(page);
        let mut filter_expr = String::new();
        let mut values = HashMap::new();
        for (k, v) in predicate {
            if k != "loan_id" {
                let ks = add_filter_expr(k.as_str(), &mut filter_expr);
                values.insert(format!(":{}", ks), predicate_value(ks.as_str(), v));
            }
        }
        let res = if let Some(loan_id) = predicate.get("loan_id") {
            values.insert(":loan_id".to_string(), AttributeValue::S(loan_id.to_string()));
            let mut request = self.client
                .query()
                .table_name(table_name)
                .index_name(index_name)
                .limit(cmp::min(page_size, 500) as i32)
                .consistent_read(false)
                .set_exclusive_start_key(exclusive_start_key)
                .key_condition_expression("loan_id = :loan_id")
                .set_expression_attribute_values(Some(values));
            if !filter_expr.is_empty() {
                request = request.filter_expression(filter_expr);
            }
            let res = request.send().await.map_err(LibraryError::from)?;
            (res.items().unwrap_or_default().to_vec(), res.last_evaluated_key().cloned())
        } else {
            let mut request = self.client
                .scan()
                .table_name(table_name)
                .limit(cmp::min(page_size, 500) as i32)
                .set_exclusive_start_key(exclusive_start_key);
            if !filter_expr.is_empty() {
                request = request.filter_expression(filter_expr).set_expression_attribute_values(Some(values));
            }
            let res = request.send().await.map_err(LibraryError::from)?;
            (res.items().unwrap_or_default().to_vec(), res.last_evaluated_key().cloned())
        };
        let (items, last_evaluated_key) = res;
        let records = items.iter().map(NotificationEntity::from).collect();
        Ok(from_ddb(page, page_size, last_evaluated_key.as_ref(), records))
    }
}

#[async_trait]
impl NotificationRepository for DDBNotificationRepository {
    async fn find_by_loan(&self, loan_id: &str) -> LibraryResult<Vec<NotificationEntity>> {
        self.find_all(&HashMap::from([("loan_id".to_string(), loan_id.to_string())])).await
    }

    async fn find_unsent(&self) -> LibraryResult<Vec<NotificationEntity>> {
        let mut unsent = self.find_all(&HashMap::from([("sent".to_string(), "false".to_string())])).await?;
        unsent.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(unsent)
    }
}

impl From<&HashMap<String, AttributeValue>> for NotificationEntity {
    fn from(map: &HashMap<String, AttributeValue>) -> Self {
        NotificationEntity {
            notification_id: parse_string_attribute("notification_id", map).unwrap_or_else(|| String::from("")),
            version: parse_number_attribute("version", map),
            member_id: parse_string_attribute("member_id", map).unwrap_or_else(|| String::from("")),
            copy_id: parse_string_attribute("copy_id", map).unwrap_or_else(|| String::from("")),
            loan_id: parse_string_attribute("loan_id", map).unwrap_or_else(|| String::from("")),
            kind: NotificationKind::from(parse_string_attribute("kind", map).unwrap_or_else(|| String::from(""))),
            message: parse_string_attribute("message", map).unwrap_or_else(|| String::from("")),
            dedup_key: parse_string_attribute("dedup_key", map).unwrap_or_else(|| String::from("")),
            sent: parse_bool_attribute("sent", map),
            read: parse_bool_attribute("read", map),
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use chrono::NaiveDate;
    use lazy_static::lazy_static;
    use rust_decimal_macros::dec;

    use crate::copies::domain::model::CopyEntity;
    use crate::core::library::NotificationKind;
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::loans::domain::model::LoanEntity;
    use crate::members::dto::MemberDto;
    use crate::notifications::domain::model::NotificationEntity;
    use crate::notifications::repository::ddb_notification_repository::DDBNotificationRepository;
    use crate::notifications::repository::NotificationRepository;
    use crate::policies::domain::model::PolicyEntity;
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                let _ = delete_table(&client, "notifications").await;
                let _ = create_table(&client, "notifications", "notification_id", "loan_id", "created_at").await;
                client
            });
    }

    fn loan_for(code: &str) -> LoanEntity {
        LoanEntity::new("test", &MemberDto::new("30111222", "Standard"), &CopyEntity::new(code, "book1", "Shelf A"),
                        PolicyEntity::new("Standard", 14, 3, dec!(50)).snapshot(),
                        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).expect("should build loan")
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_find_notification() {
        let repo = DDBNotificationRepository::new(CLIENT.get().await.clone(), "notifications", "notifications_ndx");
        let loan = loan_for("N-100");
        let notification = NotificationEntity::new(&loan, NotificationKind::Overdue, "late");
        assert_eq!(1, repo.create(&notification).await.expect("should create notification"));
        let found = repo.find_by_loan(loan.loan_id.as_str()).await.expect("should find notifications");
        assert_eq!(1, found.len());
        assert_eq!(NotificationKind::Overdue, found[0].kind);
        assert_eq!(notification.dedup_key, found[0].dedup_key);
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_mark_sent() {
        let repo = DDBNotificationRepository::new(CLIENT.get().await.clone(), "notifications", "notifications_ndx");
        let loan = loan_for("N-101");
        let mut notification = NotificationEntity::new(&loan, NotificationKind::DueSoon, "soon");
        repo.create(&notification).await.expect("should create notification");
        assert!(repo.find_unsent().await.expect("should find unsent").iter().any(|n| n.notification_id == notification.notification_id));
        notification.mark_sent();
        repo.update(&notification).await.expect("should update notification");
        assert!(!repo.find_unsent().await.expect("should find unsent").iter().any(|n| n.notification_id == notification.notification_id));
    }
}
