use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollRecord {
    pub id: String,
    pub user_id: String,
    /// `YYYY-MM`
    #[schema(example = "2024-02")]
    pub month: String,
    pub completed_tasks: i64,
    pub bonuses: f64,
    pub total_pay: f64,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}
