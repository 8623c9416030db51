use crate::api::attendance::CheckInRequest;
use crate::api::tasks::UpdateTaskStatus;
use crate::model::task::{TaskPriority, TaskStatus};
use crate::models::{SignInRequest, TokenPair};
use crate::navigation::{Destination, Menu, MenuEntry, SignOutAction};
use crate::views::attendance::{
    ActionButton, AttendanceAction, AttendancePage, AttendanceRow, AttendanceStatus,
};
use crate::views::dashboard::{DashboardPage, RecentAttendanceRow, TaskSummary};
use crate::views::payroll::{PayrollPage, PayrollRow};
use crate::views::profile::{ProfileCard, ProfilePage};
use crate::views::tasks::{Badge, TaskRow, TasksPage};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskify API",
        version = "1.0.0",
        description = r#"
## Taskify

Employee self-service for a small operations team.

### 🔹 Pages
- **Dashboard**
  - Task counters and the five most recent attendance rows
- **Tasks**
  - Tasks assigned to you, earliest deadline first; move a task between statuses
- **Attendance**
  - Daily check-in and check-out with worked durations
- **Payroll**
  - Monthly pay records, newest first
- **Profile**
  - Your own user record

### 🔐 Security
Every page is protected using **JWT Bearer authentication**. Sign in at
`/auth/login`, rotate with `/auth/refresh`, sign out with `/auth/logout`.

### 📦 Response Format
Pages answer with render-ready JSON. When the data service fails the page
keeps its last rows and carries an `error` banner instead of failing the request.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::dashboard::navigation,
        crate::api::dashboard::dashboard,
        crate::api::dashboard::profile,

        crate::api::tasks::list_tasks,
        crate::api::tasks::update_task_status,

        crate::api::attendance::attendance_page,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,

        crate::api::payroll::list_payrolls
    ),
    components(
        schemas(
            SignInRequest,
            TokenPair,
            Destination,
            MenuEntry,
            SignOutAction,
            Menu,
            TaskSummary,
            RecentAttendanceRow,
            DashboardPage,
            TaskStatus,
            TaskPriority,
            Badge,
            TaskRow,
            TasksPage,
            UpdateTaskStatus,
            AttendanceStatus,
            AttendanceAction,
            ActionButton,
            AttendanceRow,
            AttendancePage,
            CheckInRequest,
            PayrollRow,
            PayrollPage,
            ProfileCard,
            ProfilePage
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign-in and token rotation"),
        (name = "Navigation", description = "Side menu"),
        (name = "Dashboard", description = "Dashboard summary"),
        (name = "Tasks", description = "Assigned tasks"),
        (name = "Attendance", description = "Attendance check-in/check-out"),
        (name = "Payroll", description = "Payroll records"),
        (name = "Profile", description = "User profile"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
