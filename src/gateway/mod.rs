//! Row-level access to the hosted data service.
//!
//! Every page issues the same shape of call: read rows of one resource
//! filtered by equality on a single column, optionally ordered and capped,
//! and occasionally insert or patch a row. Rows travel as JSON objects and
//! are decoded into typed records with serde at the call site.

pub mod memory;
pub mod mysql;
pub mod rest;
pub mod schema;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::error::DataAccessError;

pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    Users,
    Tasks,
    Attendance,
    Payroll,
    Identities,
}

/// Equality predicate on a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
    pub nulls: Nulls,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// `None` selects every column.
    pub columns: Option<Vec<String>>,
    pub filter: Option<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filter = Some(Filter::eq(column, value));
        self
    }

    pub fn order(mut self, column: &str, direction: Direction, nulls: Nulls) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            direction,
            nulls,
        });
        self
    }

    pub fn order_asc(self, column: &str) -> Self {
        self.order(column, Direction::Ascending, Nulls::Last)
    }

    pub fn order_desc(self, column: &str) -> Self {
        self.order(column, Direction::Descending, Nulls::Last)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn select(&self, resource: Resource, query: &Query) -> Result<Vec<Row>, DataAccessError>;

    async fn insert(&self, resource: Resource, row: Row) -> Result<(), DataAccessError>;

    /// Applies `patch` to every row matching `filter`; returns rows touched.
    async fn update(
        &self,
        resource: Resource,
        filter: &Filter,
        patch: Row,
    ) -> Result<u64, DataAccessError>;
}

/// `select` followed by decoding each row into `T`.
pub async fn fetch<T: DeserializeOwned>(
    gateway: &dyn DataGateway,
    resource: Resource,
    query: &Query,
) -> Result<Vec<T>, DataAccessError> {
    gateway
        .select(resource, query)
        .await?
        .into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)).map_err(DataAccessError::from))
        .collect()
}
