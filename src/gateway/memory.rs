use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use super::{DataGateway, Direction, Filter, Nulls, Query, Resource, Row};
use crate::error::DataAccessError;

/// Uniqueness over `columns`, counted only among rows where `where_null`
/// is null (all rows when `None`).
#[derive(Debug, Clone)]
pub struct UniqueIndex {
    pub name: &'static str,
    pub resource: Resource,
    pub columns: &'static [&'static str],
    pub where_null: Option<&'static str>,
}

/// The indexes the MySQL migration declares.
pub const DEFAULT_INDEXES: &[UniqueIndex] = &[
    UniqueIndex {
        name: "uq_attendance_open_day",
        resource: Resource::Attendance,
        columns: &["user_id", "date"],
        where_null: Some("check_out"),
    },
    UniqueIndex {
        name: "uq_identities_email",
        resource: Resource::Identities,
        columns: &["email"],
        where_null: None,
    },
    UniqueIndex {
        name: "uq_payroll_user_month",
        resource: Resource::Payroll,
        columns: &["user_id", "month"],
        where_null: None,
    },
];

/// In-process store with the same filtering and ordering semantics as the
/// remote backends.
pub struct MemoryGateway {
    tables: RwLock<HashMap<Resource, Vec<Row>>>,
    indexes: Vec<UniqueIndex>,
    #[cfg(test)]
    failures: RwLock<HashMap<Resource, DataAccessError>>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            indexes: DEFAULT_INDEXES.to_vec(),
            #[cfg(test)]
            failures: RwLock::new(HashMap::new()),
        }
    }

    /// Every call on `resource` fails with `err` until cleared.
    #[cfg(test)]
    pub fn fail(&self, resource: Resource, err: DataAccessError) {
        self.failures
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(resource, err);
    }

    #[cfg(test)]
    pub fn recover(&self, resource: Resource) {
        self.failures
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&resource);
    }

    #[cfg(test)]
    fn injected(&self, resource: Resource) -> Result<(), DataAccessError> {
        match self
            .failures
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&resource)
        {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    #[cfg(not(test))]
    fn injected(&self, _resource: Resource) -> Result<(), DataAccessError> {
        Ok(())
    }

    fn with_store_defaults(resource: Resource, mut row: Row) -> Row {
        let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true));
        if !row.contains_key("id") {
            row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
        for stamp in ["created_at", "updated_at"] {
            if resource.column(stamp).is_ok() && !row.contains_key(stamp) {
                row.insert(stamp.into(), now.clone());
            }
        }
        row
    }

    fn check_indexes(&self, resource: Resource, rows: &[Row]) -> Result<(), DataAccessError> {
        for index in self.indexes.iter().filter(|i| i.resource == resource) {
            let mut seen: Vec<Vec<&Value>> = Vec::new();
            for row in rows {
                if let Some(col) = index.where_null {
                    if !field(row, col).is_null() {
                        continue;
                    }
                }
                let key: Vec<&Value> = index.columns.iter().map(|c| field(row, c)).collect();
                if key.iter().any(|v| v.is_null()) {
                    continue;
                }
                if seen.contains(&key) {
                    return Err(DataAccessError::Constraint(index.name.to_string()));
                }
                seen.push(key);
            }
        }
        Ok(())
    }
}

static NULL: Value = Value::Null;

fn field<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&NULL)
}

fn matches(row: &Row, filter: Option<&Filter>) -> bool {
    filter.is_none_or(|f| field(row, &f.column) == &f.value)
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn select(&self, resource: Resource, query: &Query) -> Result<Vec<Row>, DataAccessError> {
        self.injected(resource)?;
        resource.check_query(query)?;

        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        let mut rows: Vec<Row> = tables
            .get(&resource)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, query.filter.as_ref()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(tables);

        if let Some(order) = &query.order {
            // stable: ties keep insertion order
            rows.sort_by(|a, b| {
                let (a, b) = (field(a, &order.column), field(b, &order.column));
                match (a.is_null(), b.is_null()) {
                    (true, true) => Ordering::Equal,
                    (true, false) if order.nulls == Nulls::First => Ordering::Less,
                    (true, false) => Ordering::Greater,
                    (false, true) if order.nulls == Nulls::First => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => match order.direction {
                        Direction::Ascending => compare_values(a, b),
                        Direction::Descending => compare_values(b, a),
                    },
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        if let Some(columns) = &query.columns {
            rows = rows
                .into_iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|c| (c.clone(), field(&row, c).clone()))
                        .collect()
                })
                .collect();
        }

        Ok(rows)
    }

    async fn insert(&self, resource: Resource, row: Row) -> Result<(), DataAccessError> {
        self.injected(resource)?;
        resource.check_row(&row)?;

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let table = tables.entry(resource).or_default();

        let mut candidate = table.clone();
        candidate.push(Self::with_store_defaults(resource, row));
        self.check_indexes(resource, &candidate)?;

        *table = candidate;
        Ok(())
    }

    async fn update(
        &self,
        resource: Resource,
        filter: &Filter,
        patch: Row,
    ) -> Result<u64, DataAccessError> {
        self.injected(resource)?;
        resource.check_row(&patch)?;
        resource.column(&filter.column)?;

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let table = tables.entry(resource).or_default();

        let mut candidate = table.clone();
        let mut touched = 0;
        for row in candidate.iter_mut().filter(|row| matches(row, Some(filter))) {
            for (k, v) in &patch {
                row.insert(k.clone(), v.clone());
            }
            touched += 1;
        }
        self.check_indexes(resource, &candidate)?;

        *table = candidate;
        Ok(touched)
    }
}
