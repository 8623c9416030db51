use crate::{
    auth::{
        auth::bearer_token,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::verify_password,
    },
    config::Config,
    gateway::{Query, Resource, fetch},
    model::identity::Identity,
    models::{SignInRequest, TokenPair, TokenType},
    state::AppState,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde_json::json;
use tracing::{debug, error, info, instrument};

fn issue_pair(user_id: &str, email: &str, config: &Config) -> Result<TokenPair, HttpResponse> {
    let access_token =
        generate_access_token(user_id, email, &config.jwt_secret, config.access_token_ttl);
    let refresh = generate_refresh_token(user_id, email, &config.jwt_secret, config.refresh_token_ttl);

    match (access_token, refresh) {
        (Ok(access_token), Ok((refresh_token, _))) => Ok(TokenPair {
            access_token,
            refresh_token,
        }),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "Failed to sign token");
            Err(HttpResponse::InternalServerError().finish())
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenPair),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials"),
        (status = 502, description = "Data service unavailable")
    )
)]
#[instrument(
    name = "auth_login",
    skip(state, config, body),
    fields(email = %body.email)
)]
pub async fn login(
    body: web::Json<SignInRequest>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    let email = body.email.trim().to_lowercase();
    if email.is_empty() || body.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().json(json!({"error": "Email and password required"}));
    }

    debug!("Fetching identity");
    let identity = match fetch::<Identity>(
        state.gateway.as_ref(),
        Resource::Identities,
        &Query::new().eq("email", email.as_str()).limit(1),
    )
    .await
    {
        Ok(mut rows) => match rows.pop() {
            Some(identity) => identity,
            None => {
                info!("Invalid credentials: unknown email");
                return HttpResponse::Unauthorized().json(json!({"error": "Invalid credentials"}));
            }
        },
        Err(e) => {
            error!(error = %e, "Data service error while fetching identity");
            return HttpResponse::BadGateway().json(json!({"error": "Sign-in unavailable"}));
        }
    };

    if let Err(e) = verify_password(&body.password, &identity.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().json(json!({"error": "Invalid credentials"}));
    }

    match issue_pair(&identity.id, &identity.email, &config) {
        Ok(pair) => {
            info!(user_id = %identity.id, "Login successful");
            HttpResponse::Ok().json(pair)
        }
        Err(resp) => resp,
    }
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Auth",
    responses(
        (status = 200, description = "Rotated token pair", body = TokenPair),
        (status = 401, description = "Missing, invalid or already used refresh token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn refresh_token(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> impl Responder {
    let token = match bearer_token(&req) {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().json(json!({"error": "No token"})),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::Unauthorized().finish(),
    };

    // revoke the old refresh token; a second use is refused
    if !state.revoked.consume(&claims.jti).await {
        info!(user_id = %claims.sub, jti = %claims.jti, "Refresh token reused");
        return HttpResponse::Unauthorized().finish();
    }

    match issue_pair(&claims.sub, &claims.email, &config) {
        Ok(pair) => {
            debug!(user_id = %claims.sub, "Refresh token rotated");
            HttpResponse::Ok().json(pair)
        }
        Err(resp) => resp,
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 204, description = "Signed out")),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> impl Responder {
    let token = match bearer_token(&req) {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // only refresh tokens can sign out
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    if state.revoked.is_revoked(&claims.jti).await {
        debug!(user_id = %claims.sub, "Refresh token already revoked");
    } else {
        state.revoked.revoke(&claims.jti).await;
        info!(user_id = %claims.sub, "Signed out");
    }

    // success even if already revoked
    HttpResponse::NoContent().finish()
}
