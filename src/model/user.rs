use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": "9b2c6a0e-6b8e-4f0c-9a55-3f1c2f0f7d11",
        "full_name": "Jane Doe",
        "role": "employee",
        "department": "Operations",
        "join_date": "2024-01-15",
        "updated_at": "2024-01-15T08:00:00Z"
    })
)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub role: Role,
    pub department: String,
    #[schema(value_type = String, format = "date")]
    pub join_date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}
