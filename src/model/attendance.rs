use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    pub id: String,
    pub user_id: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub check_in: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out: Option<DateTime<Utc>>,
    pub photo_url: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }
}

/// Projection used by the dashboard's recent attendance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceEntry {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub check_in: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out: Option<DateTime<Utc>>,
}
