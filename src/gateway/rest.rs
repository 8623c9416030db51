//! Gateway for a PostgREST-style hosted data service.
//!
//! Reads are `GET /rest/v1/{table}?select=..&{col}=eq.{value}&order=..&limit=..`,
//! inserts are `POST` with a JSON array body and updates are `PATCH` with the
//! filter in the query string. Every request carries the service key both as
//! `apikey` and as a bearer token.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::{DataGateway, Direction, Filter, Nulls, Query, Resource, Row};
use crate::error::DataAccessError;

pub struct RestGateway {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestGateway {
    pub fn new(base_url: String, service_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            service_key,
        }
    }

    fn endpoint(&self, resource: Resource) -> String {
        format!("{}/rest/v1/{}", self.base_url, resource.table())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Ensure the response has a success status code, mapping failures onto
    /// the gateway error kinds.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, DataAccessError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(status_error(status, body))
    }
}

fn status_error(status: StatusCode, body: String) -> DataAccessError {
    let detail = format!("{status}: {body}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DataAccessError::Auth(detail),
        StatusCode::CONFLICT => DataAccessError::Constraint(detail),
        s if s.is_server_error() => DataAccessError::Network(detail),
        _ => DataAccessError::InvalidQuery(detail),
    }
}

fn transport_error(e: reqwest::Error) -> DataAccessError {
    if e.is_decode() {
        DataAccessError::Decode(e.to_string())
    } else {
        DataAccessError::Network(e.to_string())
    }
}

fn filter_value(value: &Value) -> String {
    match value {
        Value::Null => "is.null".to_string(),
        Value::String(s) => format!("eq.{s}"),
        other => format!("eq.{other}"),
    }
}

fn filter_param(filter: &Filter) -> (String, String) {
    (filter.column.clone(), filter_value(&filter.value))
}

/// Query-string pairs for a read.
pub fn select_params(resource: Resource, query: &Query) -> Result<Vec<(String, String)>, DataAccessError> {
    resource.check_query(query)?;

    let select = match &query.columns {
        Some(columns) => columns.join(","),
        None => "*".to_string(),
    };
    let mut params = vec![("select".to_string(), select)];

    if let Some(filter) = &query.filter {
        params.push(filter_param(filter));
    }

    if let Some(order) = &query.order {
        let direction = match order.direction {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        };
        let nulls = match order.nulls {
            Nulls::First => "nullsfirst",
            Nulls::Last => "nullslast",
        };
        params.push((
            "order".to_string(),
            format!("{}.{direction}.{nulls}", order.column),
        ));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    Ok(params)
}

#[async_trait]
impl DataGateway for RestGateway {
    async fn select(&self, resource: Resource, query: &Query) -> Result<Vec<Row>, DataAccessError> {
        let params = select_params(resource, query)?;
        debug!(resource = %resource, params = ?params, "select");

        let response = self
            .authorize(self.client.get(self.endpoint(resource)))
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;

        Self::ensure_success(response)
            .await?
            .json::<Vec<Row>>()
            .await
            .map_err(transport_error)
    }

    async fn insert(&self, resource: Resource, row: Row) -> Result<(), DataAccessError> {
        resource.check_row(&row)?;
        debug!(resource = %resource, "insert");

        let response = self
            .authorize(self.client.post(self.endpoint(resource)))
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await
            .map_err(transport_error)?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn update(
        &self,
        resource: Resource,
        filter: &Filter,
        patch: Row,
    ) -> Result<u64, DataAccessError> {
        resource.check_row(&patch)?;
        resource.column(&filter.column)?;
        debug!(resource = %resource, column = %filter.column, "update");

        let response = self
            .authorize(self.client.patch(self.endpoint(resource)))
            .header("Prefer", "return=representation")
            .query(&[filter_param(filter)])
            .json(&patch)
            .send()
            .await
            .map_err(transport_error)?;

        let touched = Self::ensure_success(response)
            .await?
            .json::<Vec<Row>>()
            .await
            .map_err(transport_error)?;
        Ok(touched.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn dashboard_attendance_read_uses_postgrest_syntax() {
        let query = Query::new()
            .columns(&["date", "check_in", "check_out"])
            .eq("user_id", "u1")
            .order_desc("date")
            .limit(5);
        let params = select_params(Resource::Attendance, &query).unwrap();

        assert_eq!(
            pairs(&params),
            vec![
                ("select", "date,check_in,check_out"),
                ("user_id", "eq.u1"),
                ("order", "date.desc.nullslast"),
                ("limit", "5"),
            ]
        );
    }

    #[test]
    fn null_and_numeric_filters() {
        assert_eq!(filter_value(&Value::Null), "is.null");
        assert_eq!(filter_value(&serde_json::json!(3)), "eq.3");
    }

    #[test]
    fn status_codes_map_to_error_kinds() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            DataAccessError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::CONFLICT, String::new()),
            DataAccessError::Constraint(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, String::new()),
            DataAccessError::Network(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, String::new()),
            DataAccessError::InvalidQuery(_)
        ));
    }
}
