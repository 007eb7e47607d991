use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::members::domain::model::{ACTIVE_STATUS, MemberEntity};
use crate::members::repository::MemberRepository;
use crate::utils::ddb::{add_filter_expr, from_ddb, is_put_condition_failed, is_update_condition_failed, parse_bool_attribute, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, string_date, to_ddb_page};

#[derive(Debug)]
pub(crate) struct DDBMemberRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBMemberRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<MemberEntity> for DDBMemberRepository {
    async fn create(&self, entity: &MemberEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(member_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(|err| {
            if is_put_condition_failed(&err) {
                LibraryError::conflict(format!("member {} already exists", entity.member_id).as_str())
            } else {
                LibraryError::from(err)
            }
        })
    }

    async fn update(&self, entity: &MemberEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("member_id", AttributeValue::S(entity.member_id.clone()))
            .update_expression("SET version = :version, category = :category, #status = :status, sanctioned = :sanctioned, has_overdue = :has_overdue, updated_at = :updated_at")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":category", AttributeValue::S(entity.category.clone()))
            .expression_attribute_values(":status", AttributeValue::S(entity.status.clone()))
            .expression_attribute_values(":sanctioned", AttributeValue::Bool(entity.sanctioned))
            .expression_attribute_values(":has_overdue", AttributeValue::Bool(entity.has_overdue))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(|err| {
            if is_update_condition_failed(&err) {
                LibraryError::conflict(format!("stale version {} for member {}", entity.version, entity.member_id).as_str())
            } else {
                LibraryError::from(err)
            }
        })
    }

    async fn get(&self, id: &str) -> LibraryResult<MemberEntity> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .query()
            .table_name(table_name)
            .limit(2)
            .consistent_read(true)
            .key_condition_expression(
                "member_id = :member_id",
            )
            .expression_attribute_values(
                ":member_id",
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await.map_err(LibraryError::from).and_then(|req| {
            if let Some(items) = req.items {
                if items.len() > 1 {
                    return Err(LibraryError::database(format!("too many members for {}", id).as_str(), None, false));
                } else if let Some(map) = items.first() {
                    return Ok(MemberEntity::from(map));
                }
            }
            Err(LibraryError::not_found(format!("member not found for {}", id).as_str()))
        })
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("member_id", AttributeValue::S(id.to_string()))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<MemberEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        let external_id = predicate.get("external_id").ok_or_else(||
            LibraryError::validation("member query requires an external id", Some("missing-external-id".to_string())))?;
        let exclusive_start_key = to_ddb_page(page);
        let mut request = self.client
            .query()
            .table_name(table_name)
            .index_name(index_name)
            .limit(cmp::min(page_size, 500) as i32)
            .consistent_read(false)
            .set_exclusive_start_key(exclusive_start_key)
            .expression_attribute_values(":external_id", AttributeValue::S(external_id.to_string()));
        let mut key_cond = String::new();
        key_cond.push_str("external_id = :external_id");

        if let Some(category) = predicate.get("category") {
            key_cond.push_str(" AND category = :category");
            request = request.expression_attribute_values(":category", AttributeValue::S(category.to_string()));
        }
        request = request.key_condition_expression(key_cond);
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            if k != "external_id" && k != "category" {
                let ks = add_filter_expr(k.as_str(), &mut filter_expr);
                request = request.expression_attribute_values(format!(":{}", ks).as_str(), AttributeValue::S(v.to_string()));
            }
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        request
            .send()
            .await.map_err(LibraryError::from).map(|req| {
            let records = req.items.as_ref().unwrap_or(&vec![]).iter()
                .map(MemberEntity::from).collect();
            from_ddb(page, page_size, req.last_evaluated_key(), records)
        })
    }
}

#[async_trait]
impl MemberRepository for DDBMemberRepository {
    async fn find_by_external_id(&self, external_id: &str) -> LibraryResult<MemberEntity> {
        let predicate = HashMap::from([("external_id".to_string(), external_id.to_string())]);
        let res = self.query(&predicate, None, 2).await?;
        res.records.into_iter().next().ok_or_else(||
            LibraryError::not_found(format!("member not found for {}", external_id).as_str()))
    }
}

impl From<&HashMap<String, AttributeValue>> for MemberEntity {
    fn from(map: &HashMap<String, AttributeValue>) -> Self {
        MemberEntity {
            member_id: parse_string_attribute("member_id", map).unwrap_or_else(|| String::from("")),
            version: parse_number_attribute("version", map),
            external_id: parse_string_attribute("external_id", map).unwrap_or_else(|| String::from("")),
            full_name: parse_string_attribute("full_name", map).unwrap_or_else(|| String::from("")),
            email: parse_string_attribute("email", map).unwrap_or_else(|| String::from("")),
            category: parse_string_attribute("category", map).unwrap_or_else(|| String::from("")),
            status: parse_string_attribute("status", map).unwrap_or_else(|| ACTIVE_STATUS.to_string()),
            sanctioned: parse_bool_attribute("sanctioned", map),
            has_overdue: parse_bool_attribute("has_overdue", map),
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}
