use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

fn issue(
    user_id: &str,
    email: &str,
    token_type: TokenType,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn generate_access_token(
    user_id: &str,
    email: &str,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    issue(user_id, email, TokenType::Access, secret, ttl).map(|(token, _)| token)
}

pub fn generate_refresh_token(
    user_id: &str,
    email: &str,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    issue(user_id, email, TokenType::Refresh, secret, ttl)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
