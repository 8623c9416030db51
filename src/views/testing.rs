//! Row builders shared by view and route tests.

use chrono::{NaiveDate, NaiveTime};
use serde_json::{Value, json};

use crate::gateway::memory::MemoryGateway;
use crate::gateway::{DataGateway, Resource, Row};

fn object(value: Value) -> Row {
    match value {
        Value::Object(row) => row,
        other => panic!("expected an object, got {other}"),
    }
}

pub async fn seed_task(
    gateway: &MemoryGateway,
    id: &str,
    assigned_to: &str,
    status: &str,
    deadline: Option<&str>,
) {
    gateway
        .insert(
            Resource::Tasks,
            object(json!({
                "id": id,
                "title": format!("Task {id}"),
                "description": null,
                "assigned_to": assigned_to,
                "created_by": "manager",
                "status": status,
                "priority": "medium",
                "deadline": deadline,
            })),
        )
        .await
        .unwrap();
}

/// One attendance row on `date`, 09:00 to 17:00 UTC when `closed`.
pub async fn seed_attendance(gateway: &MemoryGateway, user_id: &str, date: NaiveDate, closed: bool) {
    let check_in = date.and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()).and_utc();
    let check_out = closed
        .then(|| date.and_time(NaiveTime::from_hms_opt(17, 0, 0).unwrap()).and_utc());
    gateway
        .insert(
            Resource::Attendance,
            object(json!({
                "user_id": user_id,
                "date": date,
                "check_in": check_in,
                "check_out": check_out,
            })),
        )
        .await
        .unwrap();
}

pub async fn seed_payroll(gateway: &MemoryGateway, user_id: &str, month: &str, bonuses: f64, total_pay: f64) {
    gateway
        .insert(
            Resource::Payroll,
            object(json!({
                "user_id": user_id,
                "month": month,
                "completed_tasks": 4,
                "bonuses": bonuses,
                "total_pay": total_pay,
            })),
        )
        .await
        .unwrap();
}

pub async fn seed_user(gateway: &MemoryGateway, id: &str, full_name: &str, role: &str) {
    gateway
        .insert(
            Resource::Users,
            object(json!({
                "id": id,
                "full_name": full_name,
                "role": role,
                "department": "Operations",
                "join_date": "2023-09-04",
            })),
        )
        .await
        .unwrap();
}

pub async fn seed_identity(gateway: &MemoryGateway, id: &str, email: &str, password: &str) {
    let password_hash = crate::auth::password::hash_password(password).unwrap();
    gateway
        .insert(
            Resource::Identities,
            object(json!({
                "id": id,
                "email": email,
                "password_hash": password_hash,
            })),
        )
        .await
        .unwrap();
}
