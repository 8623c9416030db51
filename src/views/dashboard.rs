use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::state::ViewState;
use crate::display::{format_date, format_optional_time, format_time};
use crate::gateway::{DataGateway, Query, Resource, fetch};
use crate::model::attendance::AttendanceEntry;
use crate::model::task::{TaskStatus, TaskStatusRow};

pub const RECENT_ATTENDANCE_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
}

impl TaskSummary {
    /// Single pass over the statuses of the user's tasks.
    pub fn tally(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        statuses
            .into_iter()
            .fold(TaskSummary::default(), |mut acc, status| {
                acc.total += 1;
                match status {
                    TaskStatus::Completed => acc.completed += 1,
                    TaskStatus::InProgress => acc.in_progress += 1,
                    _ => {}
                }
                acc
            })
    }
}

#[derive(Debug, Default)]
pub struct DashboardData {
    pub summary: TaskSummary,
    pub recent_attendance: Vec<AttendanceEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentAttendanceRow {
    pub date: String,
    pub check_in: String,
    pub check_out: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardPage {
    pub summary: TaskSummary,
    pub recent_attendance: Vec<RecentAttendanceRow>,
    pub error: Option<String>,
}

pub struct DashboardController {
    gateway: Arc<dyn DataGateway>,
    user_id: String,
    state: ViewState<DashboardData>,
}

impl DashboardController {
    pub fn new(gateway: Arc<dyn DataGateway>, user_id: String) -> Self {
        Self {
            gateway,
            user_id,
            state: ViewState::new(DashboardData::default()),
        }
    }

    pub fn state(&self) -> &ViewState<DashboardData> {
        &self.state
    }

    #[tracing::instrument(name = "dashboard", skip(self), fields(user_id = %self.user_id))]
    pub async fn activate(&mut self) {
        self.state.begin();

        let statuses = Query::new()
            .columns(&["status"])
            .eq("assigned_to", self.user_id.as_str());
        let summary = fetch::<TaskStatusRow>(self.gateway.as_ref(), Resource::Tasks, &statuses)
            .await
            .map(|rows| TaskSummary::tally(rows.into_iter().map(|row| row.status)));
        self.state
            .resolve("task summary", summary, |data, summary| data.summary = summary);

        let recent = Query::new()
            .columns(&["date", "check_in", "check_out"])
            .eq("user_id", self.user_id.as_str())
            .order_desc("date")
            .limit(RECENT_ATTENDANCE_ROWS);
        let rows = fetch::<AttendanceEntry>(self.gateway.as_ref(), Resource::Attendance, &recent).await;
        self.state
            .resolve("recent attendance", rows, |data, rows| data.recent_attendance = rows);
    }

    pub fn render(&self) -> DashboardPage {
        let data = self.state.data();
        DashboardPage {
            summary: data.summary,
            recent_attendance: data
                .recent_attendance
                .iter()
                .map(|entry| RecentAttendanceRow {
                    date: format_date(entry.date),
                    check_in: format_time(entry.check_in),
                    check_out: format_optional_time(entry.check_out),
                })
                .collect(),
            error: self.state.error().map(str::to_string),
        }
    }
}
