use crate::auth::auth::Session;
use crate::navigation::{Menu, menu};
use crate::state::AppState;
use crate::views::dashboard::{DashboardController, DashboardPage};
use crate::views::profile::{ProfileController, ProfilePage};
use actix_web::{HttpResponse, Responder, web};

/// Task counters and the latest attendance rows
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard page", body = DashboardPage),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn dashboard(session: Session, state: web::Data<AppState>) -> impl Responder {
    let mut view = DashboardController::new(state.gateway.clone(), session.user_id);
    view.activate().await;
    HttpResponse::Ok().json(view.render())
}

/// The signed-in user's profile
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile page; `profile` is null when the row is missing", body = ProfilePage),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn profile(session: Session, state: web::Data<AppState>) -> impl Responder {
    let mut view = ProfileController::new(state.gateway.clone(), session.user_id, session.email);
    view.activate().await;
    HttpResponse::Ok().json(view.render())
}

/// Side menu destinations and the sign-out action
#[utoipa::path(
    get,
    path = "/api/navigation",
    responses(
        (status = 200, body = Menu),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Navigation"
)]
pub async fn navigation(_session: Session) -> impl Responder {
    HttpResponse::Ok().json(menu())
}
