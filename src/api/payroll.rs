use crate::auth::auth::Session;
use crate::state::AppState;
use crate::views::payroll::{PayrollController, PayrollPage};
use actix_web::{HttpResponse, Responder, web};

#[utoipa::path(
    get,
    path = "/api/payroll",
    responses(
        (status = 200, body = PayrollPage),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(session: Session, state: web::Data<AppState>) -> impl Responder {
    let mut view = PayrollController::new(state.gateway.clone(), session.user_id);
    view.activate().await;
    HttpResponse::Ok().json(view.render())
}
