use serde::Deserialize;

/// Sign-in credentials kept beside the `users` table; `id` is the user id.
#[derive(Debug, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub password_hash: String,
}
