use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::policies::domain::model::PolicyEntity;
use crate::policies::repository::PolicyRepository;
use crate::utils::ddb::{add_filter_expr, from_ddb, is_put_condition_failed, is_update_condition_failed, parse_date_attribute, parse_decimal_attribute, parse_item, parse_number_attribute, parse_string_attribute, require_number_attribute, string_date, string_decimal, to_ddb_page};

#[derive(Debug)]
pub(crate) struct DDBPolicyRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBPolicyRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<PolicyEntity> for DDBPolicyRepository {
    async fn create(&self, entity: &PolicyEntity) -> LibraryResult<usize> {
        if self.find_by_category(entity.category.as_str()).await?.is_some() {
            return Err(LibraryError::conflict(format!("policy for category {} already exists", entity.category).as_str()));
        }
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(policy_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(|err| {
            if is_put_condition_failed(&err) {
                LibraryError::conflict(format!("policy {} already exists", entity.policy_id).as_str())
            } else {
                LibraryError::from(err)
            }
        })
    }

    async fn update(&self, entity: &PolicyEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("policy_id", AttributeValue::S(entity.policy_id.clone()))
            .update_expression("SET version = :version, loan_days = :loan_days, max_concurrent_loans = :max_concurrent_loans, fine_per_day = :fine_per_day, updated_at = :updated_at")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":loan_days", AttributeValue::N(entity.loan_days.to_string()))
            .expression_attribute_values(":max_concurrent_loans", AttributeValue::N(entity.max_concurrent_loans.to_string()))
            .expression_attribute_values(":fine_per_day", string_decimal(entity.fine_per_day))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(|err| {
            if is_update_condition_failed(&err) {
                LibraryError::conflict(format!("stale version {} for policy {}", entity.version, entity.policy_id).as_str())
            } else {
                LibraryError::from(err)
            }
        })
    }

    async fn get(&self, id: &str) -> LibraryResult<PolicyEntity> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .query()
            .table_name(table_name)
            .limit(2)
            .consistent_read(true)
            .key_condition_expression(
                "policy_id = :policy_id",
            )
            .expression_attribute_values(
                ":policy_id",
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await.map_err(LibraryError::from).and_then(|req| {
            if let Some(items) = req.items {
                if items.len() > 1 {
                    return Err(LibraryError::database(format!("too many policies for {}", id).as_str(), None, false));
                } else if let Some(map) = items.first() {
                    return PolicyEntity::try_from(map);
                }
            }
            Err(LibraryError::not_found(format!("policy not found for {}", id).as_str()))
        })
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("policy_id", AttributeValue::S(id.to_string()))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PolicyEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        let category = predicate.get("category").ok_or_else(||
            LibraryError::validation("policy query requires a category", Some("missing-category".to_string())))?;
        let exclusive_start_key = to_ddb_page(page);
        let mut request = self.client
            .query()
            .table_name(table_name)
            .index_name(index_name)
            .limit(cmp::min(page_size, 500) as i32)
            .consistent_read(false)
            .set_exclusive_start_key(exclusive_start_key)
            .key_condition_expression("category = :category")
            .expression_attribute_values(":category", AttributeValue::S(category.to_string()));
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            if k != "category" {
                let ks = add_filter_expr(k.as_str(), &mut filter_expr);
                request = request.expression_attribute_values(format!(":{}", ks).as_str(), AttributeValue::S(v.to_string()));
            }
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        let res = request.send().await.map_err(LibraryError::from)?;
        let records = res.items.as_ref().unwrap_or(&vec![]).iter()
            .map(PolicyEntity::try_from).collect::<LibraryResult<Vec<PolicyEntity>>>()?;
        Ok(from_ddb(page, page_size, res.last_evaluated_key(), records))
    }
}

#[async_trait]
impl PolicyRepository for DDBPolicyRepository {
    async fn find_by_category(&self, category: &str) -> LibraryResult<Option<PolicyEntity>> {
        let predicate = HashMap::from([("category".to_string(), category.to_string())]);
        let res = self.query(&predicate, None, 2).await?;
        Ok(res.records.into_iter().next())
    }
}

impl TryFrom<&HashMap<String, AttributeValue>> for PolicyEntity {
    type Error = LibraryError;

    fn try_from(map: &HashMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        Ok(PolicyEntity {
            policy_id: parse_string_attribute("policy_id", map).unwrap_or_else(|| String::from("")),
            version: parse_number_attribute("version", map),
            category: parse_string_attribute("category", map).unwrap_or_else(|| String::from("")),
            loan_days: require_number_attribute("loan_days", map)?,
            max_concurrent_loans: require_number_attribute("max_concurrent_loans", map)?,
            fine_per_day: parse_decimal_attribute("fine_per_day", map)?,
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        })
    }
}
