use crate::auth::auth::Session;
use crate::model::task::TaskStatus;
use crate::state::AppState;
use crate::views::tasks::{TasksController, TasksPage};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct UpdateTaskStatus {
    pub status: TaskStatus,
}

/// Tasks assigned to the caller, earliest deadline first
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "Tasks page", body = TasksPage),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn list_tasks(session: Session, state: web::Data<AppState>) -> impl Responder {
    let mut view = TasksController::new(state.gateway.clone(), state.clock.clone(), session.user_id);
    view.activate().await;
    HttpResponse::Ok().json(view.render())
}

#[utoipa::path(
    patch,
    path = "/api/tasks/{task_id}/status",
    request_body = UpdateTaskStatus,
    params(
        ("task_id", description = "Task ID")
    ),
    responses(
        (status = 200, description = "Status changed; refreshed tasks page", body = TasksPage),
        (status = 404, description = "Task not found"),
        (status = 422, description = "Unknown task status"),
        (status = 502, description = "Data service error")
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn update_task_status(
    session: Session,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateTaskStatus>,
) -> actix_web::Result<impl Responder> {
    let task_id = path.into_inner();
    let mut view = TasksController::new(state.gateway.clone(), state.clock.clone(), session.user_id);

    view.set_status(&task_id, body.status).await?;

    Ok(HttpResponse::Ok().json(view.render()))
}
