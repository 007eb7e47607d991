use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::loans::domain::model::LoanEntity;
use crate::loans::repository::LoanRepository;
use crate::policies::domain::model::PolicySnapshot;
use crate::utils::ddb::{add_filter_expr, from_ddb, is_put_condition_failed, is_update_condition_failed, opt_string_date, parse_bool_attribute, parse_date_attribute, parse_decimal_attribute, parse_item, parse_number_attribute, parse_string_attribute, require_day_attribute, require_number_attribute, string_date, to_ddb_page};

#[derive(Debug)]
pub(crate) struct DDBLoanRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBLoanRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

// the returned flag is stored as a dynamodb bool, everything else in predicates is a string
fn predicate_value(key: &str, value: &str) -> AttributeValue {
    if key == "returned" {
        AttributeValue::Bool(value == "true")
    } else {
        AttributeValue::S(value.to_string())
    }
}

#[async_trait]
impl Repository<LoanEntity> for DDBLoanRepository {
    async fn create(&self, entity: &LoanEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(loan_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(|err| {
            if is_put_condition_failed(&err) {
                LibraryError::conflict(format!("loan {} already exists", entity.loan_id).as_str())
            } else {
                LibraryError::from(err)
            }
        })
    }

    // only the return fields change after a loan is created
    async fn update(&self, entity: &LoanEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("loan_id", AttributeValue::S(entity.loan_id.clone()))
            .update_expression("SET version = :version, returned = :returned, returned_at = :returned_at, updated_at = :updated_at")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":returned", AttributeValue::Bool(entity.returned))
            .expression_attribute_values(":returned_at", opt_string_date(entity.returned_at))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(|err| {
            if is_update_condition_failed(&err) {
                LibraryError::conflict(format!("stale version {} for loan {}", entity.version, entity.loan_id).as_str())
            } else {
                LibraryError::from(err)
            }
        })
    }

    async fn get(&self, id: &str) -> LibraryResult<LoanEntity> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .query()
            .table_name(table_name)
            .limit(2)
            .consistent_read(true)
            .key_condition_expression(
                "loan_id = :loan_id",
            )
            .expression_attribute_values(
                ":loan_id",
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await.map_err(LibraryError::from).and_then(|req| {
            if let Some(items) = req.items {
                if items.len() > 1 {
                    return Err(LibraryError::database(format!("too many loans for {}", id).as_str(), None, false));
                } else if let Some(map) = items.first() {
                    return LoanEntity::try_from(map);
                }
            }
            Err(LibraryError::not_found(format!("loan not found for {}", id).as_str()))
        })
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("loan_id", AttributeValue::S(id.to_string()))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    // queries the member index when the predicate names a member, otherwise scans the table
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<LoanEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        let exclusive_start_key = to_ddb_page(page);
        let mut filter_expr = String::new();
        let mut values = HashMap::new();
        for (k, v) in predicate {
            if k != "member_id" {
                let ks = add_filter_expr(k.as_str(), &mut filter_expr);
                values.insert(format!(":{}", ks), predicate_value(ks.as_str(), v));
            }
        }
        if let Some(member_id) = predicate.get("member_id") {
            values.insert(":member_id".to_string(), AttributeValue::S(member_id.to_string()));
            let mut request = self.client
                .query()
                .table_name(table_name)
                .index_name(index_name)
                .limit(cmp::min(page_size, 500) as i32)
                .consistent_read(false)
                .set_exclusive_start_key(exclusive_start_key)
                .key_condition_expression("member_id = :member_id")
                .set_expression_attribute_values(Some(values));
            if !filter_expr.is_empty() {
                request = request.filter_expression(filter_expr);
            }
            let res = request.send().await.map_err(LibraryError::from)?;
            let records = res.items.as_ref().unwrap_or(&vec![]).iter()
                .map(LoanEntity::try_from).collect::<LibraryResult<Vec<LoanEntity>>>()?;
            Ok(from_ddb(page, page_size, res.last_evaluated_key(), records))
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
            let records = res.items.as_ref().unwrap_or(&vec![]).iter()
                .map(LoanEntity::try_from).collect::<LibraryResult<Vec<LoanEntity>>>()?;
            Ok(from_ddb(page, page_size, res.last_evaluated_key(), records))
        }
    }
}

#[async_trait]
impl LoanRepository for DDBLoanRepository {
    async fn find_by_member(&self, member_id: &str) -> LibraryResult<Vec<LoanEntity>> {
        let predicate = HashMap::from([("member_id".to_string(), member_id.to_string())]);
        let mut loans = vec![];
        let mut next_page: Option<String> = None;
        loop {
            let res = self.query(&predicate, next_page.as_deref(), 500).await?;
            loans.extend(res.records);
            next_page = res.next_page;
            if next_page.is_none() {
                break;
            }
        }
        Ok(loans)
    }
}

// dates and policy values decide status and fines, a row missing any of them is rejected
impl TryFrom<&HashMap<String, AttributeValue>> for LoanEntity {
    type Error = LibraryError;

    fn try_from(map: &HashMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        Ok(LoanEntity {
            loan_id: parse_string_attribute("loan_id", map).unwrap_or_else(|| String::from("")),
            version: parse_number_attribute("version", map),
            branch_id: parse_string_attribute("branch_id", map).unwrap_or_else(|| String::from("")),
            member_id: parse_string_attribute("member_id", map).unwrap_or_else(|| String::from("")),
            copy_id: parse_string_attribute("copy_id", map).unwrap_or_else(|| String::from("")),
            copy_code: parse_string_attribute("copy_code", map).unwrap_or_else(|| String::from("")),
            loan_date: require_day_attribute("loan_date", map)?,
            due_date: require_day_attribute("due_date", map)?,
            returned: parse_bool_attribute("returned", map),
            returned_at: parse_date_attribute("returned_at", map),
            policy: PolicySnapshot {
                policy_id: parse_string_attribute("policy_id", map).unwrap_or_else(|| String::from("")),
                category: parse_string_attribute("category", map).unwrap_or_else(|| String::from("")),
                loan_days: require_number_attribute("loan_days", map)?,
                max_concurrent_loans: require_number_attribute("max_concurrent_loans", map)?,
                fine_per_day: parse_decimal_attribute("fine_per_day", map)?,
            },
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        })
    }
}
