use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::models::TokenType;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};
use serde_json::json;

/// The signed-in user, as carried by a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

impl FromRequest for Session {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // already validated by the auth middleware
        if let Some(session) = req.extensions().get::<Session>() {
            return ready(Ok(session.clone()));
        }

        let token = match bearer_token(req) {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized(json!({"error": "Missing token"})))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) if c.token_type == TokenType::Access => c,
            _ => return ready(Err(ErrorUnauthorized(json!({"error": "Invalid token"})))),
        };

        ready(Ok(Session {
            user_id: claims.sub,
            email: claims.email,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{generate_access_token, generate_refresh_token};
    use actix_web::test::TestRequest;

    async fn extract(req: TestRequest) -> Result<Session, actix_web::Error> {
        let (req, mut payload) = req
            .app_data(Data::new(Config::for_tests()))
            .to_http_parts();
        Session::from_request(&req, &mut payload).await
    }

    #[actix_web::test]
    async fn access_token_yields_session() {
        let token = generate_access_token("u1", "jane@example.com", "test-secret", 60).unwrap();
        let session = extract(
            TestRequest::default().insert_header(("Authorization", format!("Bearer {token}"))),
        )
        .await
        .unwrap();
        assert_eq!(
            session,
            Session {
                user_id: "u1".into(),
                email: "jane@example.com".into()
            }
        );
    }

    #[actix_web::test]
    async fn refresh_token_is_not_a_session() {
        let (token, _) =
            generate_refresh_token("u1", "jane@example.com", "test-secret", 60).unwrap();
        let req = TestRequest::default().insert_header(("Authorization", format!("Bearer {token}")));
        assert!(extract(req).await.is_err());
        assert!(extract(TestRequest::default()).await.is_err());
    }
}
