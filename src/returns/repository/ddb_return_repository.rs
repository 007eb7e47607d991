use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::core::library::{CopyState, LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::returns::domain::model::ReturnEntity;
use crate::returns::repository::ReturnRepository;
use crate::utils::ddb::{add_filter_expr, from_ddb, is_put_condition_failed, is_update_condition_failed, parse_date_attribute, parse_decimal_attribute, parse_item, parse_number_attribute, parse_string_attribute, require_day_attribute, string_date, to_ddb_page};

#[derive(Debug)]
pub(crate) struct DDBReturnRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBReturnRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<ReturnEntity> for DDBReturnRepository {
    async fn create(&self, entity: &ReturnEntity) -> LibraryResult<usize> {
        if self.find_by_loan(entity.loan_id.as_str()).await?.is_some() {
            return Err(LibraryError::conflict(format!("loan {} already has a return", entity.loan_id).as_str()));
        }
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(return_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(|err| {
            if is_put_condition_failed(&err) {
                LibraryError::conflict(format!("return {} already exists", entity.return_id).as_str())
            } else {
                LibraryError::from(err)
            }
        })
    }

    // condition and notes are the only fields a correction may change
    async fn update(&self, entity: &ReturnEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("return_id", AttributeValue::S(entity.return_id.clone()))
            .update_expression("SET version = :version, #condition = :condition, notes = :notes, updated_at = :updated_at")
            .expression_attribute_names("#condition", "condition")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":condition", AttributeValue::S(entity.condition.to_string()))
            .expression_attribute_values(":notes", AttributeValue::S(entity.notes.clone()))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(|err| {
            if is_update_condition_failed(&err) {
                LibraryError::conflict(format!("stale version {} for return {}", entity.version, entity.return_id).as_str())
            } else {
                LibraryError::from(err)
            }
        })
    }

    async fn get(&self, id: &str) -> LibraryResult<ReturnEntity> {
        let table_name: &str = self.table_name.as_ref();
        let res = self.client
            .query()
            .table_name(table_name)
            .limit(2)
            .consistent_read(true)
            .key_condition_expression(
                "return_id = :return_id",
            )
            .expression_attribute_values(
                ":return_id",
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await.map_err(LibraryError::from)?;
        if let Some(items) = res.items {
            if items.len() > 1 {
                return Err(LibraryError::database(format!("too many returns for {}", id).as_str(), None, false));
            } else if let Some(map) = items.first() {
                return ReturnEntity::try_from(map);
            }
        }
        Err(LibraryError::not_found(format!("return not found for {}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("return_id", AttributeValue::S(id.to_string()))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReturnEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        let loan_id = predicate.get("loan_id").ok_or_else(||
            LibraryError::validation("return query requires a loan id", Some("missing-loan-id".to_string())))?;
        let exclusive_start_key = to_ddb_page(page);
        let mut request = self.client
            .query()
            .table_name(table_name)
            .index_name(index_name)
            .limit(cmp::min(page_size, 500) as i32)
            .consistent_read(false)
            .set_exclusive_start_key(exclusive_start_key)
            .key_condition_expression("loan_id = :loan_id")
            .expression_attribute_values(":loan_id", AttributeValue::S(loan_id.to_string()));
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            if k != "loan_id" {
                let ks = add_filter_expr(k.as_str(), &mut filter_expr);
                request = request.expression_attribute_values(format!(":{}", ks).as_str(), AttributeValue::S(v.to_string()));
            }
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        let res = request.send().await.map_err(LibraryError::from)?;
        let records = res.items.as_ref().unwrap_or(&vec![]).iter()
            .map(ReturnEntity::try_from).collect::<LibraryResult<Vec<ReturnEntity>>>()?;
        Ok(from_ddb(page, page_size, res.last_evaluated_key(), records))
    }
}

#[async_trait]
impl ReturnRepository for DDBReturnRepository {
    async fn find_by_loan(&self, loan_id: &str) -> LibraryResult<Option<ReturnEntity>> {
        let predicate = HashMap::from([("loan_id".to_string(), loan_id.to_string())]);
        let res = self.query(&predicate, None, 2).await?;
        Ok(res.records.into_iter().next())
    }
}

impl TryFrom<&HashMap<String, AttributeValue>> for ReturnEntity {
    type Error = LibraryError;

    fn try_from(map: &HashMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        let condition = parse_string_attribute("condition", map).unwrap_or_else(|| CopyState::Available.to_string());
        let condition = CopyState::try_from(condition.as_str())?;
        Ok(ReturnEntity {
            return_id: parse_string_attribute("return_id", map).unwrap_or_else(|| String::from("")),
            version: parse_number_attribute("version", map),
            loan_id: parse_string_attribute("loan_id", map).unwrap_or_else(|| String::from("")),
            member_id: parse_string_attribute("member_id", map).unwrap_or_else(|| String::from("")),
            copy_id: parse_string_attribute("copy_id", map).unwrap_or_else(|| String::from("")),
            returned_on: require_day_attribute("returned_on", map)?,
            condition,
            notes: parse_string_attribute("notes", map).unwrap_or_else(|| String::from("")),
            fine: parse_decimal_attribute("fine", map)?,
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use aws_sdk_dynamodb::types::AttributeValue;
    use chrono::NaiveDate;
    use lazy_static::lazy_static;
    use rust_decimal_macros::dec;

    use crate::copies::domain::model::CopyEntity;
    use crate::core::library::{CopyState, LibraryError};
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::loans::domain::model::LoanEntity;
    use crate::members::dto::MemberDto;
    use crate::policies::domain::model::PolicyEntity;
    use crate::returns::domain::model::ReturnEntity;
    use crate::returns::repository::ddb_return_repository::DDBReturnRepository;
    use crate::returns::repository::ReturnRepository;
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                let _ = delete_table(&client, "returns").await;
                let _ = create_table(&client, "returns", "return_id", "loan_id", "returned_on").await;
                client
            });
    }

    fn return_for(code: &str) -> ReturnEntity {
        let loan = LoanEntity::new("test", &MemberDto::new("30111222", "Standard"),
                                   &CopyEntity::new(code, "book1", "Shelf A"),
                                   PolicyEntity::new("Standard", 14, 3, dec!(50)).snapshot(),
                                   NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).expect("should build loan");
        ReturnEntity::new(&loan, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(), CopyState::Damaged, "torn cover")
            .expect("should build return")
    }

    #[tokio::test]
    async fn test_should_reject_unknown_condition() {
        let map = HashMap::from([
            ("return_id".to_string(), AttributeValue::S("r1".to_string())),
            ("condition".to_string(), AttributeValue::S("Torn".to_string())),
        ]);
        assert!(matches!(ReturnEntity::try_from(&map), Err(LibraryError::InvalidState{ .. })));
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_find_return() {
        let return_repo = DDBReturnRepository::new(CLIENT.get().await.clone(), "returns", "returns_ndx");
        let ret = return_for("R-100");
        let size = return_repo.create(&ret).await.expect("should create return");
        assert_eq!(1, size);
        let loaded = return_repo.find_by_loan(ret.loan_id.as_str()).await.expect("should query")
            .expect("should find return");
        assert_eq!(dec!(250), loaded.fine);
        assert_eq!(CopyState::Damaged, loaded.condition);
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_correct_return() {
        let return_repo = DDBReturnRepository::new(CLIENT.get().await.clone(), "returns", "returns_ndx");
        let mut ret = return_for("R-101");
        return_repo.create(&ret).await.expect("should create return");
        ret.correct(CopyState::Lost, Some("never came back"));
        return_repo.update(&ret).await.expect("should update return");
        let loaded = return_repo.get(ret.return_id.as_str()).await.expect("should get return");
        assert_eq!(CopyState::Lost, loaded.condition);
        assert_eq!(1, loaded.version);
    }
}
