use crate::auth::auth::{Session, bearer_token};
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::models::TokenType;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::{Value, json};
use tracing::debug;

fn reject(req: ServiceRequest, body: Value) -> ServiceResponse<BoxBody> {
    req.into_response(HttpResponse::Unauthorized().json(body).map_into_boxed_body())
}

/// Validates the access token and stores the caller's [`Session`] in the
/// request extensions.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let secret = req
        .app_data::<Data<Config>>()
        .map(|config| config.jwt_secret.clone())
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let verified = match bearer_token(req.request()) {
        Some(token) => verify_token(token, &secret),
        None => return Ok(reject(req, json!({"error": "Missing bearer token"}))),
    };

    let claims = match verified {
        Ok(c) if c.token_type == TokenType::Access => c,
        Ok(_) => return Ok(reject(req, json!({"error": "Access token required"}))),
        Err(e) => {
            return Ok(reject(
                req,
                json!({"error": "Invalid or expired token", "details": e}),
            ));
        }
    };

    debug!(user_id = %claims.sub, path = %req.path(), "session accepted");
    req.extensions_mut().insert(Session {
        user_id: claims.sub,
        email: claims.email,
    });

    next.call(req).await
}
