use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use super::state::ViewState;
use crate::clock::Clock;
use crate::display::{format_date, format_duration, format_optional_time, format_time};
use crate::error::{ActionError, DataAccessError};
use crate::gateway::{DataGateway, Filter, Query, Resource, fetch};
use crate::model::attendance::AttendanceRecord;

/// Derived from the held rows, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    CheckedOut,
    CheckedIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceAction {
    CheckIn,
    CheckOut,
}

impl AttendanceAction {
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceAction::CheckIn => "Check In",
            AttendanceAction::CheckOut => "Check Out",
        }
    }
}

impl AttendanceStatus {
    /// Checked in iff a row for `today` has no check-out.
    pub fn derive(records: &[AttendanceRecord], today: NaiveDate) -> Self {
        if open_record(records, today).is_some() {
            AttendanceStatus::CheckedIn
        } else {
            AttendanceStatus::CheckedOut
        }
    }

    pub fn action(&self) -> AttendanceAction {
        match self {
            AttendanceStatus::CheckedOut => AttendanceAction::CheckIn,
            AttendanceStatus::CheckedIn => AttendanceAction::CheckOut,
        }
    }
}

fn open_record(records: &[AttendanceRecord], today: NaiveDate) -> Option<&AttendanceRecord> {
    records.iter().find(|r| r.date == today && r.is_open())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActionButton {
    pub action: AttendanceAction,
    pub label: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceRow {
    pub id: String,
    pub date: String,
    pub check_in: String,
    pub check_out: String,
    pub duration: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendancePage {
    pub status: AttendanceStatus,
    pub action: ActionButton,
    pub records: Vec<AttendanceRow>,
    pub error: Option<String>,
}

pub struct AttendanceController {
    gateway: Arc<dyn DataGateway>,
    clock: Arc<dyn Clock>,
    user_id: String,
    state: ViewState<Vec<AttendanceRecord>>,
}

impl AttendanceController {
    pub fn new(gateway: Arc<dyn DataGateway>, clock: Arc<dyn Clock>, user_id: String) -> Self {
        Self {
            gateway,
            clock,
            user_id,
            state: ViewState::new(Vec::new()),
        }
    }

    pub fn state(&self) -> &ViewState<Vec<AttendanceRecord>> {
        &self.state
    }

    pub fn status(&self) -> AttendanceStatus {
        AttendanceStatus::derive(self.state.data(), self.clock.today())
    }

    async fn fetch_history(&self) -> Result<Vec<AttendanceRecord>, DataAccessError> {
        let query = Query::new()
            .eq("user_id", self.user_id.as_str())
            .order_desc("date");
        fetch(self.gateway.as_ref(), Resource::Attendance, &query).await
    }

    #[tracing::instrument(name = "attendance", skip(self), fields(user_id = %self.user_id))]
    pub async fn activate(&mut self) {
        self.state.begin();
        let history = self.fetch_history().await;
        self.state.replace("attendance history", history);
    }

    #[tracing::instrument(skip(self, photo_url), fields(user_id = %self.user_id))]
    pub async fn check_in(&mut self, photo_url: Option<String>) -> Result<(), ActionError> {
        if self.status() == AttendanceStatus::CheckedIn {
            return Err(ActionError::AlreadyCheckedIn);
        }

        let now = self.clock.now();
        let mut row = Map::new();
        row.insert("user_id".into(), json!(self.user_id));
        row.insert("date".into(), json!(now.date_naive()));
        row.insert("check_in".into(), json!(now));
        row.insert("check_out".into(), Value::Null);
        if let Some(url) = photo_url {
            row.insert("photo_url".into(), json!(url));
        }

        self.gateway
            .insert(Resource::Attendance, row)
            .await
            .map_err(|e| match e {
                // another session opened today's row first
                DataAccessError::Constraint(_) => ActionError::AlreadyCheckedIn,
                other => ActionError::Data(other),
            })?;
        info!(at = %now, "checked in");

        self.activate().await;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn check_out(&mut self) -> Result<(), ActionError> {
        let today = self.clock.today();
        let record_id = open_record(self.state.data(), today)
            .map(|r| r.id.clone())
            .ok_or(ActionError::NotCheckedIn)?;

        let now = self.clock.now();
        let mut patch = Map::new();
        patch.insert("check_out".into(), json!(now));

        let touched = self
            .gateway
            .update(Resource::Attendance, &Filter::eq("id", record_id), patch)
            .await?;
        if touched == 0 {
            return Err(ActionError::NotCheckedIn);
        }
        info!(at = %now, "checked out");

        self.activate().await;
        Ok(())
    }

    pub fn render(&self) -> AttendancePage {
        let status = self.status();
        let action = status.action();
        AttendancePage {
            status,
            action: ActionButton {
                action,
                label: action.label(),
            },
            records: self
                .state
                .data()
                .iter()
                .map(|r| AttendanceRow {
                    id: r.id.clone(),
                    date: format_date(r.date),
                    check_in: format_time(r.check_in),
                    check_out: format_optional_time(r.check_out),
                    duration: format_duration(r.check_in, r.check_out),
                })
                .collect(),
            error: self.state.error().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::gateway::memory::MemoryGateway;
    use crate::gateway::{DataGateway, Row};
    use crate::views::testing::seed_attendance;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, h, m, 0).unwrap()
    }

    fn controller(gateway: Arc<MemoryGateway>, clock: Arc<FixedClock>) -> AttendanceController {
        AttendanceController::new(gateway, clock, "u1".into())
    }

    #[actix_web::test]
    async fn check_in_at_nine_opens_todays_row() {
        let gateway = Arc::new(MemoryGateway::new());
        let clock = Arc::new(FixedClock::new(at(9, 0)));
        let mut view = controller(gateway.clone(), clock);
        view.activate().await;
        assert_eq!(view.status(), AttendanceStatus::CheckedOut);
        assert_eq!(view.render().action.label, "Check In");

        view.check_in(None).await.unwrap();

        let records = view.state().data();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, at(9, 0).date_naive());
        assert_eq!(records[0].check_in, at(9, 0));
        assert_eq!(records[0].check_out, None);
        assert_eq!(view.status(), AttendanceStatus::CheckedIn);
        assert_eq!(view.render().action.label, "Check Out");
    }

    #[actix_web::test]
    async fn check_in_then_out_leaves_one_closed_row() {
        let gateway = Arc::new(MemoryGateway::new());
        let clock = Arc::new(FixedClock::new(at(9, 0)));
        let mut view = controller(gateway.clone(), clock.clone());
        view.activate().await;

        view.check_in(Some("https://cdn.example/p.jpg".into())).await.unwrap();
        clock.set(at(11, 5));
        view.check_out().await.unwrap();

        let records = view.state().data();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.check_out, Some(at(11, 5)));
        assert!(record.check_out.unwrap() >= record.check_in);
        assert_eq!(record.photo_url.as_deref(), Some("https://cdn.example/p.jpg"));
        assert_eq!(view.status(), AttendanceStatus::CheckedOut);
        assert_eq!(view.render().records[0].duration, "2h 5m");
    }

    #[actix_web::test]
    async fn second_check_in_while_open_is_refused() {
        let gateway = Arc::new(MemoryGateway::new());
        let clock = Arc::new(FixedClock::new(at(9, 0)));
        let mut view = controller(gateway.clone(), clock.clone());
        view.activate().await;
        view.check_in(None).await.unwrap();

        assert!(matches!(view.check_in(None).await, Err(ActionError::AlreadyCheckedIn)));

        // a stale view that never saw the open row hits the store's guard
        let mut stale = controller(gateway.clone(), clock);
        assert!(matches!(stale.check_in(None).await, Err(ActionError::AlreadyCheckedIn)));

        let rows = gateway.select(Resource::Attendance, &Query::new()).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[actix_web::test]
    async fn check_out_without_open_row_is_refused() {
        let gateway = Arc::new(MemoryGateway::new());
        let clock = Arc::new(FixedClock::new(at(18, 0)));
        // yesterday's row is still open but does not count for today
        seed_attendance(&gateway, "u1", at(0, 0).date_naive() - Duration::days(1), false).await;

        let mut view = controller(gateway, clock);
        view.activate().await;
        assert_eq!(view.status(), AttendanceStatus::CheckedOut);
        assert!(matches!(view.check_out().await, Err(ActionError::NotCheckedIn)));
    }

    #[actix_web::test]
    async fn closed_row_today_allows_checking_in_again() {
        let gateway = Arc::new(MemoryGateway::new());
        let clock = Arc::new(FixedClock::new(at(18, 0)));
        seed_attendance(&gateway, "u1", at(0, 0).date_naive(), true).await;

        let mut view = controller(gateway, clock);
        view.activate().await;
        assert_eq!(view.status(), AttendanceStatus::CheckedOut);
        view.check_in(None).await.unwrap();
        assert_eq!(view.status(), AttendanceStatus::CheckedIn);
        assert_eq!(view.state().data().len(), 2);
    }

    #[actix_web::test]
    async fn refetch_without_mutation_is_identical() {
        let gateway = Arc::new(MemoryGateway::new());
        let first = at(0, 0).date_naive() - Duration::days(5);
        for offset in 0..4 {
            seed_attendance(&gateway, "u1", first + Duration::days(offset), true).await;
        }
        let mut view = controller(gateway, Arc::new(FixedClock::new(at(9, 0))));

        view.activate().await;
        let before = view.state().data().clone();
        view.activate().await;
        assert_eq!(view.state().data(), &before);
    }

    /// Disposes the view while its fetch is in flight.
    struct DisposeDuringFetch {
        inner: MemoryGateway,
        handle: std::sync::Mutex<Option<crate::views::state::MountHandle>>,
    }

    #[async_trait]
    impl DataGateway for DisposeDuringFetch {
        async fn select(&self, resource: Resource, query: &Query) -> Result<Vec<Row>, DataAccessError> {
            if let Some(handle) = self.handle.lock().unwrap().as_ref() {
                handle.dispose();
            }
            self.inner.select(resource, query).await
        }

        async fn insert(&self, resource: Resource, row: Row) -> Result<(), DataAccessError> {
            self.inner.insert(resource, row).await
        }

        async fn update(&self, resource: Resource, filter: &Filter, patch: Row) -> Result<u64, DataAccessError> {
            self.inner.update(resource, filter, patch).await
        }
    }

    #[actix_web::test]
    async fn late_result_after_dispose_is_dropped() {
        let inner = MemoryGateway::new();
        seed_attendance(&inner, "u1", at(0, 0).date_naive(), true).await;
        let gateway = Arc::new(DisposeDuringFetch {
            inner,
            handle: std::sync::Mutex::new(None),
        });

        let mut view = AttendanceController::new(
            gateway.clone(),
            Arc::new(FixedClock::new(at(9, 0))),
            "u1".into(),
        );
        *gateway.handle.lock().unwrap() = Some(view.state().mount_handle());

        view.activate().await;
        assert!(view.state().data().is_empty());
        assert!(!view.state().is_loaded());
    }
}
