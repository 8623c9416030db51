use crate::{
    api::{attendance, dashboard, payroll, tasks},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, Responder, get, middleware::from_fn, web};
use anyhow::{Context, Result};
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiters, built once and shared by every worker.
#[derive(Clone)]
pub struct RateLimits {
    login: Limiter,
    refresh: Limiter,
    protected: Limiter,
}

impl RateLimits {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: build_limiter(config.rate_login_per_min).context("RATE_LOGIN_PER_MIN")?,
            refresh: build_limiter(config.rate_refresh_per_min).context("RATE_REFRESH_PER_MIN")?,
            protected: build_limiter(config.rate_protected_per_min)
                .context("RATE_PROTECTED_PER_MIN")?,
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("invalid rate limit")?;
    Ok(Arc::new(Governor::new(&cfg)))
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("taskify is running")
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limits: &RateLimits) {
    // Public routes
    cfg.service(index).service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(limits.login.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(limits.refresh.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(limits.login.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limits.protected.clone()) // rate limiting
            .service(web::resource("/navigation").route(web::get().to(dashboard::navigation)))
            .service(web::resource("/dashboard").route(web::get().to(dashboard::dashboard)))
            .service(web::resource("/profile").route(web::get().to(dashboard::profile)))
            .service(
                web::scope("/tasks")
                    // /tasks
                    .service(web::resource("").route(web::get().to(tasks::list_tasks)))
                    // /tasks/{id}/status
                    .service(
                        web::resource("/{id}/status")
                            .route(web::patch().to(tasks::update_task_status)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::attendance_page)))
                    .service(web::resource("/check-in").route(web::post().to(attendance::check_in)))
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    ),
            )
            .service(web::scope("/payroll").service(
                web::resource("").route(web::get().to(payroll::list_payrolls)),
            )),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns a new pair, the old refresh token is spent

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::gateway::memory::MemoryGateway;
    use crate::models::TokenPair;
    use crate::state::AppState;
    use crate::views::testing::{seed_identity, seed_task, seed_user};
    use actix_web::{App, http::StatusCode, test, web::Data};
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};

    const PEER: &str = "127.0.0.1:40000";

    macro_rules! app {
        ($gateway:expr) => {{
            let config = Config::for_tests();
            let limits = RateLimits::from_config(&config).unwrap();
            let clock =
                Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap()));
            let state = AppState::new($gateway, clock, config.refresh_token_ttl as u64);
            test::init_service(
                App::new()
                    .app_data(Data::new(config.clone()))
                    .app_data(Data::new(state))
                    .configure(move |cfg| configure(cfg, &config, &limits)),
            )
            .await
        }};
    }

    macro_rules! sign_in {
        ($app:expr) => {{
            let req = post("/auth/login")
                .set_json(json!({"email": "Jane@Example.com", "password": "hunter2"}))
                .to_request();
            let resp = test::call_service(&$app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let pair: TokenPair = test::read_body_json(resp).await;
            pair
        }};
    }

    async fn seeded() -> Arc<MemoryGateway> {
        let gateway = Arc::new(MemoryGateway::new());
        seed_identity(&gateway, "u1", "jane@example.com", "hunter2").await;
        seed_user(&gateway, "u1", "Jane Doe", "employee").await;
        gateway
    }

    fn post(uri: &str) -> test::TestRequest {
        test::TestRequest::post().uri(uri).peer_addr(PEER.parse().unwrap())
    }

    fn get(uri: &str) -> test::TestRequest {
        test::TestRequest::get().uri(uri).peer_addr(PEER.parse().unwrap())
    }

    fn bearer(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn liveness_is_public() {
        let app = app!(seeded().await);
        let resp = test::call_service(&app, get("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn pages_require_a_session() {
        let app = app!(seeded().await);
        let resp = test::call_service(&app, get("/api/dashboard").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = post("/auth/login")
            .set_json(json!({"email": "jane@example.com", "password": "wrong"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn check_in_and_out_over_http() {
        let app = app!(seeded().await);
        let tokens = sign_in!(app);

        let req = get("/api/attendance")
            .insert_header(bearer(&tokens.access_token))
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["status"], "checked_out");
        assert_eq!(page["action"]["label"], "Check In");

        let req = post("/api/attendance/check-in")
            .insert_header(bearer(&tokens.access_token))
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["status"], "checked_in");
        assert_eq!(page["records"][0]["check_in"], "9:00:00 AM");
        assert_eq!(page["records"][0]["duration"], "-");

        let req = post("/api/attendance/check-in")
            .insert_header(bearer(&tokens.access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = post("/api/attendance/check-out")
            .insert_header(bearer(&tokens.access_token))
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["status"], "checked_out");
        assert_eq!(page["records"].as_array().unwrap().len(), 1);

        let req = post("/api/attendance/check-out")
            .insert_header(bearer(&tokens.access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn task_status_patch_and_validation() {
        let gateway = seeded().await;
        seed_task(&gateway, "t1", "u1", "todo", Some("2024-05-10")).await;
        seed_task(&gateway, "t2", "u2", "todo", None).await;
        let app = app!(gateway);
        let tokens = sign_in!(app);

        let req = test::TestRequest::patch()
            .uri("/api/tasks/t1/status")
            .peer_addr(PEER.parse().unwrap())
            .insert_header(bearer(&tokens.access_token))
            .set_json(json!({"status": "completed"}))
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["tasks"][0]["status"]["label"], "completed");

        let req = test::TestRequest::patch()
            .uri("/api/tasks/t2/status")
            .peer_addr(PEER.parse().unwrap())
            .insert_header(bearer(&tokens.access_token))
            .set_json(json!({"status": "completed"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::patch()
            .uri("/api/tasks/t1/status")
            .peer_addr(PEER.parse().unwrap())
            .insert_header(bearer(&tokens.access_token))
            .set_json(json!({"status": "blocked"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn profile_and_navigation() {
        let app = app!(seeded().await);
        let tokens = sign_in!(app);

        let req = get("/api/profile")
            .insert_header(bearer(&tokens.access_token))
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["profile"]["email"], "jane@example.com");
        assert_eq!(page["profile"]["full_name"], "Jane Doe");

        let req = get("/api/navigation")
            .insert_header(bearer(&tokens.access_token))
            .to_request();
        let menu: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(menu["entries"].as_array().unwrap().len(), 5);
        assert_eq!(menu["sign_out"]["path"], "/auth/logout");
    }

    #[actix_web::test]
    async fn refresh_rotates_and_logout_revokes() {
        let app = app!(seeded().await);
        let tokens = sign_in!(app);

        // access tokens cannot refresh
        let req = post("/auth/refresh")
            .insert_header(bearer(&tokens.access_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = post("/auth/refresh")
            .insert_header(bearer(&tokens.refresh_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let rotated: TokenPair = test::read_body_json(resp).await;

        let req = post("/auth/refresh")
            .insert_header(bearer(&tokens.refresh_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        for _ in 0..2 {
            let req = post("/auth/logout")
                .insert_header(bearer(&rotated.refresh_token))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
        }

        let req = post("/auth/refresh")
            .insert_header(bearer(&rotated.refresh_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
