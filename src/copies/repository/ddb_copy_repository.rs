use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::copies::domain::model::CopyEntity;
use crate::copies::repository::CopyRepository;
use crate::core::library::{CopyState, LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::ddb::{add_filter_expr, from_ddb, is_put_condition_failed, is_update_condition_failed, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, string_date, to_ddb_page};

#[derive(Debug)]
pub(crate) struct DDBCopyRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBCopyRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<CopyEntity> for DDBCopyRepository {
    // the code index is eventually consistent, concurrent registrations of one code can still race
    async fn create(&self, entity: &CopyEntity) -> LibraryResult<usize> {
        match self.find_by_code(entity.code.as_str()).await {
            Ok(existing) => {
                return Err(LibraryError::conflict(format!("copy code {} already registered to {}",
                                                          entity.code, existing.copy_id).as_str()));
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.with_context(format!("checking copy code {}", entity.code).as_str())),
        }
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(copy_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(|err| {
            if is_put_condition_failed(&err) {
                LibraryError::conflict(format!("copy {} already exists", entity.copy_id).as_str())
            } else {
                LibraryError::from(err)
            }
        })
    }

    async fn update(&self, entity: &CopyEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("copy_id", AttributeValue::S(entity.copy_id.clone()))
            .update_expression("SET version = :version, copy_state = :copy_state, #location = :location, updated_at = :updated_at")
            .expression_attribute_names("#location", "location")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":copy_state", AttributeValue::S(entity.copy_state.to_string()))
            .expression_attribute_values(":location", AttributeValue::S(entity.location.clone()))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(|err| {
            if is_update_condition_failed(&err) {
                LibraryError::conflict(format!("stale version {} for copy {}", entity.version, entity.copy_id).as_str())
            } else {
                LibraryError::from(err)
            }
        })
    }

    async fn get(&self, id: &str) -> LibraryResult<CopyEntity> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .query()
            .table_name(table_name)
            .limit(2)
            .consistent_read(true)
            .key_condition_expression(
                "copy_id = :copy_id",
            )
            .expression_attribute_values(
                ":copy_id",
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await.map_err(LibraryError::from).and_then(|req| {
            if let Some(items) = req.items {
                if items.len() > 1 {
                    return Err(LibraryError::database(format!("too many copies for {}", id).as_str(), None, false));
                } else if let Some(map) = items.first() {
                    return CopyEntity::try_from(map);
                }
            }
            Err(LibraryError::not_found(format!("copy not found for {}", id).as_str()))
        })
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("copy_id", AttributeValue::S(id.to_string()))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    // the index is keyed by code and copy_state, so a query needs at least the code
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CopyEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        let code = predicate.get("code").ok_or_else(||
            LibraryError::validation("copy query requires a code", Some("missing-code".to_string())))?;
        let exclusive_start_key = to_ddb_page(page);
        let mut request = self.client
            .query()
            .table_name(table_name)
            .index_name(index_name)
            .limit(cmp::min(page_size, 500) as i32)
            .consistent_read(false)
            .set_exclusive_start_key(exclusive_start_key)
            .expression_attribute_values(":code", AttributeValue::S(code.to_string()));
        let mut key_cond = String::new();
        key_cond.push_str("code = :code");

        if let Some(copy_state) = predicate.get("copy_state") {
            key_cond.push_str(" AND copy_state = :copy_state");
            request = request.expression_attribute_values(":copy_state", AttributeValue::S(copy_state.to_string()));
        }
        request = request.key_condition_expression(key_cond);
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            if k != "code" && k != "copy_state" {
                let ks = add_filter_expr(k.as_str(), &mut filter_expr);
                request = request.expression_attribute_values(format!(":{}", ks).as_str(), AttributeValue::S(v.to_string()));
            }
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        let res = request.send().await.map_err(LibraryError::from)?;
        let records = res.items.as_ref().unwrap_or(&vec![]).iter()
            .map(CopyEntity::try_from).collect::<LibraryResult<Vec<CopyEntity>>>()?;
        Ok(from_ddb(page, page_size, res.last_evaluated_key(), records))
    }
}

#[async_trait]
impl CopyRepository for DDBCopyRepository {
    async fn find_by_code(&self, code: &str) -> LibraryResult<CopyEntity> {
        let predicate = HashMap::from([("code".to_string(), code.to_string())]);
        let res = self.query(&predicate, None, 2).await?;
        res.records.into_iter().next().ok_or_else(||
            LibraryError::not_found(format!("copy not found for code {}", code).as_str()))
    }

    async fn compare_and_set_state(&self, copy_id: &str, expected: CopyState,
                                   new_state: CopyState) -> LibraryResult<bool> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();
        let res = self.client
            .update_item()
            .table_name(table_name)
            .key("copy_id", AttributeValue::S(copy_id.to_string()))
            .update_expression("SET copy_state = :new_state, version = version + :one, updated_at = :updated_at")
            .expression_attribute_values(":expected", AttributeValue::S(expected.to_string()))
            .expression_attribute_values(":new_state", AttributeValue::S(new_state.to_string()))
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(copy_id) AND copy_state = :expected")
            .send()
            .await;
        match res {
            Ok(_) => Ok(true),
            Err(err) if is_update_condition_failed(&err) => Ok(false),
            Err(err) => Err(LibraryError::from(err)),
        }
    }
}

impl TryFrom<&HashMap<String, AttributeValue>> for CopyEntity {
    type Error = LibraryError;

    fn try_from(map: &HashMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        let state = parse_string_attribute("copy_state", map).unwrap_or_else(|| CopyState::Available.to_string());
        Ok(CopyEntity {
            copy_id: parse_string_attribute("copy_id", map).unwrap_or_else(|| String::from("")),
            version: parse_number_attribute("version", map),
            code: parse_string_attribute("code", map).unwrap_or_else(|| String::from("")),
            book_id: parse_string_attribute("book_id", map).unwrap_or_else(|| String::from("")),
            copy_state: CopyState::try_from(state.as_str())?,
            location: parse_string_attribute("location", map).unwrap_or_else(|| String::from("")),
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        })
    }
}
