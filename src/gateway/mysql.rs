use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::mysql::{MySqlArguments, MySqlPoolOptions};
use sqlx::query::Query as SqlQuery;
use sqlx::{MySql, MySqlPool, Row as _};
use tracing::debug;

use super::schema::{Column, ColumnKind};
use super::{DataGateway, Direction, Filter, Nulls, Query, Resource, Row};
use crate::error::DataAccessError;

/// SQL bindable value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// SQL statement plus the values for its placeholders, in order.
#[derive(Debug, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

pub struct MySqlGateway {
    pool: MySqlPool,
}

impl MySqlGateway {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn quote(ident: &str) -> String {
    format!("`{ident}`")
}

/// JSON_OBJECT member for one column; dates and timestamps are rendered in
/// the same text form serde reads them back from.
fn project(column: &Column) -> String {
    let name = quote(column.name);
    let expr = match column.kind {
        ColumnKind::Date => format!("DATE_FORMAT({name}, '%Y-%m-%d')"),
        ColumnKind::Timestamp => format!("DATE_FORMAT({name}, '%Y-%m-%dT%H:%i:%s.%fZ')"),
        ColumnKind::Text | ColumnKind::Integer | ColumnKind::Decimal => name,
    };
    format!("'{}', {expr}", column.name)
}

/// Converts a JSON value into a bindable value according to the column kind.
pub fn to_sql_value(column: &Column, value: &Value) -> Result<SqlValue, DataAccessError> {
    let invalid = || {
        DataAccessError::InvalidQuery(format!("{} cannot hold {value}", column.name))
    };

    Ok(match (column.kind, value) {
        (_, Value::Null) => SqlValue::Null,
        (ColumnKind::Text, Value::String(s)) => SqlValue::String(s.clone()),
        (ColumnKind::Text, Value::Number(n)) => SqlValue::String(n.to_string()),
        (ColumnKind::Integer, Value::Number(n)) => SqlValue::I64(n.as_i64().ok_or_else(invalid)?),
        (ColumnKind::Decimal, Value::Number(n)) => SqlValue::F64(n.as_f64().ok_or_else(invalid)?),
        (ColumnKind::Date, Value::String(s)) => SqlValue::Date(
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())?,
        ),
        (ColumnKind::Timestamp, Value::String(s)) => SqlValue::DateTime(
            DateTime::parse_from_rfc3339(s)
                .map_err(|_| invalid())?
                .naive_utc(),
        ),
        _ => return Err(invalid()),
    })
}

/// Build `SELECT` returning one JSON text column per row.
pub fn build_select_sql(resource: Resource, query: &Query) -> Result<SqlStatement, DataAccessError> {
    resource.check_query(query)?;

    let columns: Vec<&Column> = match &query.columns {
        Some(names) => names
            .iter()
            .map(|n| resource.column(n))
            .collect::<Result<_, _>>()?,
        None => resource.columns().iter().collect(),
    };
    let members = columns
        .iter()
        .map(|c| project(c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!(
        "SELECT CAST(JSON_OBJECT({members}) AS CHAR) AS row_json FROM {}",
        quote(resource.table())
    );
    let mut values = Vec::new();

    if let Some(filter) = &query.filter {
        sql.push_str(&where_clause(resource, filter, &mut values)?);
    }

    if let Some(order) = &query.order {
        let name = quote(&order.column);
        let nulls = match order.nulls {
            Nulls::Last => "IS NULL",
            Nulls::First => "IS NOT NULL",
        };
        let direction = match order.direction {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        };
        sql.push_str(&format!(" ORDER BY {name} {nulls}, {name} {direction}"));
    }

    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        values.push(SqlValue::I64(limit as i64));
    }

    Ok(SqlStatement { sql, values })
}

fn where_clause(
    resource: Resource,
    filter: &Filter,
    values: &mut Vec<SqlValue>,
) -> Result<String, DataAccessError> {
    let column = resource.column(&filter.column)?;
    let name = quote(column.name);
    Ok(match to_sql_value(column, &filter.value)? {
        SqlValue::Null => format!(" WHERE {name} IS NULL"),
        value => {
            values.push(value);
            format!(" WHERE {name} = ?")
        }
    })
}

pub fn build_insert_sql(resource: Resource, row: &Row) -> Result<SqlStatement, DataAccessError> {
    resource.check_row(row)?;

    let mut names = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    for (name, value) in row {
        let column = resource.column(name)?;
        names.push(quote(column.name));
        values.push(to_sql_value(column, value)?);
    }

    let placeholders = vec!["?"; names.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders})",
        quote(resource.table()),
        names.join(", ")
    );

    Ok(SqlStatement { sql, values })
}

pub fn build_update_sql(
    resource: Resource,
    filter: &Filter,
    patch: &Row,
) -> Result<SqlStatement, DataAccessError> {
    resource.check_row(patch)?;

    let mut assignments = Vec::with_capacity(patch.len());
    let mut values = Vec::with_capacity(patch.len() + 1);
    for (name, value) in patch {
        let column = resource.column(name)?;
        assignments.push(format!("{} = ?", quote(column.name)));
        values.push(to_sql_value(column, value)?);
    }

    let mut sql = format!(
        "UPDATE {} SET {}",
        quote(resource.table()),
        assignments.join(", ")
    );
    sql.push_str(&where_clause(resource, filter, &mut values)?);

    Ok(SqlStatement { sql, values })
}

fn bind_all(statement: &SqlStatement) -> SqlQuery<'_, MySql, MySqlArguments> {
    let mut query = sqlx::query(&statement.sql);

    for value in &statement.values {
        query = match value {
            SqlValue::String(v) => query.bind(v.as_str()),
            SqlValue::I64(v) => query.bind(*v),
            SqlValue::F64(v) => query.bind(*v),
            SqlValue::Date(v) => query.bind(*v),
            SqlValue::DateTime(v) => query.bind(*v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    query
}

fn map_sqlx(e: sqlx::Error) -> DataAccessError {
    match e {
        sqlx::Error::Database(db) => {
            let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
            let message = db.message().to_string();
            match code.get(..2) {
                Some("23") => DataAccessError::Constraint(message),
                Some("28") => DataAccessError::Auth(message),
                Some("42") => DataAccessError::InvalidQuery(message),
                _ => DataAccessError::Network(message),
            }
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::RowNotFound
        | sqlx::Error::TypeNotFound { .. } => DataAccessError::Decode(e.to_string()),
        other => DataAccessError::Network(other.to_string()),
    }
}

#[async_trait]
impl DataGateway for MySqlGateway {
    async fn select(&self, resource: Resource, query: &Query) -> Result<Vec<Row>, DataAccessError> {
        let statement = build_select_sql(resource, query)?;
        debug!(sql = %statement.sql, values = ?statement.values, "select");

        let rows = bind_all(&statement)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        rows.iter()
            .map(|row| -> Result<Row, DataAccessError> {
                let text: String = row.try_get("row_json").map_err(map_sqlx)?;
                Ok(serde_json::from_str(&text)?)
            })
            .collect()
    }

    async fn insert(&self, resource: Resource, row: Row) -> Result<(), DataAccessError> {
        let statement = build_insert_sql(resource, &row)?;
        debug!(sql = %statement.sql, values = ?statement.values, "insert");

        bind_all(&statement)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn update(
        &self,
        resource: Resource,
        filter: &Filter,
        patch: Row,
    ) -> Result<u64, DataAccessError> {
        let statement = build_update_sql(resource, filter, &patch)?;
        debug!(sql = %statement.sql, values = ?statement.values, "update");

        let result = bind_all(&statement)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected())
    }
}
