use crate::auth::auth::Session;
use crate::state::AppState;
use crate::views::attendance::{AttendanceController, AttendancePage};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CheckInRequest {
    /// Selfie captured at check-in, if the client took one.
    pub photo_url: Option<String>,
}

fn controller(session: &Session, state: &AppState) -> AttendanceController {
    AttendanceController::new(
        state.gateway.clone(),
        state.clock.clone(),
        session.user_id.clone(),
    )
}

/// Attendance history with the derived check-in state
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Attendance page", body = AttendancePage),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_page(session: Session, state: web::Data<AppState>) -> impl Responder {
    let mut view = controller(&session, &state);
    view.activate().await;
    HttpResponse::Ok().json(view.render())
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body(content = CheckInRequest, description = "Optional check-in photo"),
    responses(
        (status = 200, description = "Checked in; refreshed attendance page", body = AttendancePage),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Data service error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    session: Session,
    state: web::Data<AppState>,
    body: Option<web::Json<CheckInRequest>>,
) -> actix_web::Result<impl Responder> {
    let mut view = controller(&session, &state);
    view.activate().await;

    let photo_url = body.and_then(|b| b.into_inner().photo_url);
    view.check_in(photo_url).await.inspect_err(|e| {
        tracing::warn!(error = %e, user_id = %session.user_id, "Check-in refused");
    })?;

    Ok(HttpResponse::Ok().json(view.render()))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out; refreshed attendance page", body = AttendancePage),
        (status = 409, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Data service error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    session: Session,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let mut view = controller(&session, &state);
    view.activate().await;

    view.check_out().await.inspect_err(|e| {
        tracing::warn!(error = %e, user_id = %session.user_id, "Check-out refused");
    })?;

    Ok(HttpResponse::Ok().json(view.render()))
}
