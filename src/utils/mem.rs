use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::Serialize;
use serde_json::Value;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};

// MemRecord is implemented by entities that can live in a MemTable
pub(crate) trait MemRecord: Identifiable + Clone + Serialize {
    fn set_version(&mut self, version: i64);
}

// MemTable is an in-process table keyed by entity id. It keeps the same create/update
// semantics as the dynamodb tables: create fails on existing ids and update is guarded
// by the entity version.
#[derive(Debug)]
pub(crate) struct MemTable<T> {
    table_name: String,
    rows: RwLock<BTreeMap<String, T>>,
}

impl<T: MemRecord> MemTable<T> {
    pub(crate) fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> LibraryResult<RwLockReadGuard<'_, BTreeMap<String, T>>> {
        self.rows.read().map_err(|_| LibraryError::runtime(
            format!("{} table lock poisoned", self.table_name).as_str(), None))
    }

    fn write(&self) -> LibraryResult<RwLockWriteGuard<'_, BTreeMap<String, T>>> {
        self.rows.write().map_err(|_| LibraryError::runtime(
            format!("{} table lock poisoned", self.table_name).as_str(), None))
    }

    pub(crate) fn create(&self, entity: &T) -> LibraryResult<usize> {
        let mut rows = self.write()?;
        if rows.contains_key(entity.id().as_str()) {
            return Err(LibraryError::conflict(format!("{} already exists in {}",
                                                      entity.id(), self.table_name).as_str()));
        }
        rows.insert(entity.id(), entity.clone());
        Ok(1)
    }

    pub(crate) fn update(&self, entity: &T) -> LibraryResult<usize> {
        let mut rows = self.write()?;
        let stored = rows.get(entity.id().as_str()).ok_or_else(|| LibraryError::not_found(
            format!("{} not found in {}", entity.id(), self.table_name).as_str()))?;
        if stored.version() != entity.version() {
            return Err(LibraryError::conflict(format!("stale version {} for {} in {}, stored {}",
                                                      entity.version(), entity.id(), self.table_name, stored.version()).as_str()));
        }
        let mut next = entity.clone();
        next.set_version(entity.version() + 1);
        rows.insert(entity.id(), next);
        Ok(1)
    }

    pub(crate) fn get(&self, id: &str) -> LibraryResult<T> {
        self.read()?.get(id).cloned().ok_or_else(|| LibraryError::not_found(
            format!("{} not found in {}", id, self.table_name).as_str()))
    }

    pub(crate) fn delete(&self, id: &str) -> LibraryResult<usize> {
        Ok(self.write()?.remove(id).map(|_| 1).unwrap_or(0))
    }

    // runs the closure against the stored row while holding the write lock
    pub(crate) fn modify<R>(&self, id: &str, f: impl FnOnce(&mut T) -> LibraryResult<R>) -> LibraryResult<R> {
        let mut rows = self.write()?;
        let row = rows.get_mut(id).ok_or_else(|| LibraryError::not_found(
            format!("{} not found in {}", id, self.table_name).as_str()))?;
        let res = f(row)?;
        let version = row.version();
        row.set_version(version + 1);
        Ok(res)
    }

    pub(crate) fn find(&self, filter: impl Fn(&T) -> bool) -> LibraryResult<Vec<T>> {
        Ok(self.read()?.values().filter(|row| filter(row)).cloned().collect())
    }

    pub(crate) fn query(&self, predicate: &HashMap<String, String>,
                        page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<T>> {
        let rows = self.read()?;
        let mut records = vec![];
        let mut next_page = None;
        for (key, row) in rows.iter() {
            if let Some(after) = page {
                if key.as_str() <= after {
                    continue;
                }
            }
            if !matches_predicate(&serde_json::to_value(row)?, predicate) {
                continue;
            }
            if records.len() == page_size {
                next_page = records.last().map(|r: &T| r.id());
                break;
            }
            records.push(row.clone());
        }
        Ok(PaginatedResult::new(page, page_size, next_page, records))
    }
}

// matches a serialized row against predicate keys of the form "field" or "field:op"
pub(crate) fn matches_predicate(row: &Value, predicate: &HashMap<String, String>) -> bool {
    predicate.iter().all(|(k, expected)| {
        let mut parts = k.splitn(2, ':');
        let field = parts.next().unwrap_or_default();
        let op = parts.next().unwrap_or("=");
        let actual = match row.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        match op {
            "=" => actual == *expected,
            "<>" => actual != *expected,
            "<" => actual < *expected,
            "<=" => actual <= *expected,
            ">" => actual > *expected,
            ">=" => actual >= *expected,
            _ => false,
        }
    })
}
