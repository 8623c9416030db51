use super::{Query, Resource, Row};
use crate::error::DataAccessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Decimal,
    Date,
    Timestamp,
}

#[derive(Debug)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

use ColumnKind::*;

const USERS: &[Column] = &[
    col("id", Text),
    col("full_name", Text),
    col("role", Text),
    col("department", Text),
    col("join_date", Date),
    col("updated_at", Timestamp),
];

const TASKS: &[Column] = &[
    col("id", Text),
    col("title", Text),
    col("description", Text),
    col("assigned_to", Text),
    col("created_by", Text),
    col("status", Text),
    col("priority", Text),
    col("deadline", Date),
    col("created_at", Timestamp),
    col("updated_at", Timestamp),
];

const ATTENDANCE: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("date", Date),
    col("check_in", Timestamp),
    col("check_out", Timestamp),
    col("photo_url", Text),
    col("created_at", Timestamp),
];

const PAYROLL: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("month", Text),
    col("completed_tasks", Integer),
    col("bonuses", Decimal),
    col("total_pay", Decimal),
    col("created_at", Timestamp),
    col("updated_at", Timestamp),
];

const IDENTITIES: &[Column] = &[
    col("id", Text),
    col("email", Text),
    col("password_hash", Text),
];

impl Resource {
    pub fn table(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Tasks => "tasks",
            Resource::Attendance => "attendance",
            Resource::Payroll => "payroll",
            Resource::Identities => "identities",
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        match self {
            Resource::Users => USERS,
            Resource::Tasks => TASKS,
            Resource::Attendance => ATTENDANCE,
            Resource::Payroll => PAYROLL,
            Resource::Identities => IDENTITIES,
        }
    }

    pub fn column(&self, name: &str) -> Result<&'static Column, DataAccessError> {
        self.columns()
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DataAccessError::InvalidQuery(format!("{}.{name}", self.table())))
    }

    /// Rejects any column the resource does not declare.
    pub fn check_query(&self, query: &Query) -> Result<(), DataAccessError> {
        for name in query.columns.iter().flatten() {
            self.column(name)?;
        }
        if let Some(filter) = &query.filter {
            self.column(&filter.column)?;
        }
        if let Some(order) = &query.order {
            self.column(&order.column)?;
        }
        Ok(())
    }

    pub fn check_row(&self, row: &Row) -> Result<(), DataAccessError> {
        if row.is_empty() {
            return Err(DataAccessError::InvalidQuery(format!(
                "empty row for {}",
                self.table()
            )));
        }
        for name in row.keys() {
            self.column(name)?;
        }
        Ok(())
    }
}
